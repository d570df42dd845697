//! 骨骼属性贴图
//!
//! 三张单行贴图，宽度等于骨骼数量：
//! - Position：源节点世界坐标 (x, y, z, 1)，RGBA 半精度
//! - TargetPosition：目标节点世界坐标 (x, y, z, 1)，RGBA 半精度
//! - Radius：源半径 (r, 0, 0, 1)，单通道半精度

mod encoder;

pub use encoder::EncodeOutcome;

use crate::texture::{PixelFormat, TextureDesc, TextureSink};
use crate::Result;

pub const POSITION_FORMAT: PixelFormat = PixelFormat::RgbaHalf;
pub const RADIUS_FORMAT: PixelFormat = PixelFormat::RHalf;

/// 三张属性贴图，宽度始终一致
#[derive(Clone, Debug)]
pub struct AttributeMaps<T> {
    position: T,
    target_position: T,
    radius: T,
}

impl<T: TextureSink> AttributeMaps<T> {
    /// 按骨骼数量分配三张贴图
    pub fn allocate(bone_count: u32) -> Result<Self> {
        Ok(Self {
            position: T::create(&TextureDesc::row(bone_count, POSITION_FORMAT))?,
            target_position: T::create(&TextureDesc::row(bone_count, POSITION_FORMAT))?,
            radius: T::create(&TextureDesc::row(bone_count, RADIUS_FORMAT))?,
        })
    }

    pub fn width(&self) -> u32 {
        self.position.width()
    }
}

impl<T> AttributeMaps<T> {
    pub fn position(&self) -> &T {
        &self.position
    }

    pub fn target_position(&self) -> &T {
        &self.target_position
    }

    pub fn radius(&self) -> &T {
        &self.radius
    }
}
