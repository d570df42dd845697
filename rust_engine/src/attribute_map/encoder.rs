//! 贴图编码

use glam::Vec4;

use crate::bones::BoneList;
use crate::hierarchy::Hierarchy;
use crate::texture::TextureSink;
use crate::Result;
use super::AttributeMaps;

/// 编码结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// 已写入并提交
    Written { bones: usize },
    /// 贴图宽度与骨骼数量不一致，未做任何修改
    Skipped { width: u32, bones: usize },
}

impl<T: TextureSink> AttributeMaps<T> {
    /// 从层级读取当前世界坐标，写入并提交三张贴图
    ///
    /// Position 宽度与骨骼数量不符时直接跳过。
    pub fn encode<H: Hierarchy>(&mut self, hierarchy: &H, bones: &BoneList<H::Node>) -> Result<EncodeOutcome> {
        let count = bones.len();
        if self.position.width() as usize != count {
            log::debug!(
                "跳过编码: 贴图宽度 {} != 骨骼数量 {}",
                self.position.width(),
                count
            );
            return Ok(EncodeOutcome::Skipped {
                width: self.position.width(),
                bones: count,
            });
        }

        let mut positions = Vec::with_capacity(count);
        let mut targets = Vec::with_capacity(count);
        let mut radii = Vec::with_capacity(count);

        for bone in bones {
            positions.push(hierarchy.world_position(bone.source).extend(1.0));
            targets.push(hierarchy.world_position(bone.target).extend(1.0));
            // 只写源半径
            radii.push(Vec4::new(bone.source_radius, 0.0, 0.0, 1.0));
        }

        self.position.write_row(0, &positions)?;
        self.target_position.write_row(0, &targets)?;
        self.radius.write_row(0, &radii)?;

        self.position.commit();
        self.target_position.commit();
        self.radius.commit();

        Ok(EncodeOutcome::Written { bones: count })
    }
}
