//! 变换层级

mod transform_tree;

pub use transform_tree::{NodeId, TransformNode, TransformTree};

use std::fmt::Debug;
use std::hash::Hash;

use glam::{Mat4, Quat, Vec3};

/// 遍历和编码所需的层级接口
///
/// 宿主的节点树必须是严格的树：每个节点至多出现在一个父节点的子列表中。
pub trait Hierarchy {
    /// 节点句柄（轻量、可比较、可哈希）
    type Node: Copy + Eq + Hash + Debug;

    /// 节点是否属于该层级
    fn contains(&self, node: Self::Node) -> bool;

    /// 直接子节点，按兄弟顺序排列；未知节点返回空切片
    fn children(&self, node: Self::Node) -> &[Self::Node];

    /// 世界空间位置
    fn world_position(&self, node: Self::Node) -> Vec3;
}

/// 节点局部变换
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl NodeTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}
