//! Hierarchy Attribute Map - 变换层级到骨骼属性贴图的转换
//!
//! 将一棵变换层级（类似骨架的节点树）展开为父子"骨骼"对，
//! 并把每根骨骼的空间数据编码进三张单行像素贴图，供 GPU 粒子/特效系统读取：
//! - 层级遍历（深度受限、先序、带遍历预算）
//! - 贴图编码（Position / TargetPosition / Radius）
//! - 绑定器状态机（Stale / Fresh）
//! - 宿主绑定接口（四个命名参数槽）

pub mod attribute_map;
pub mod binder;
pub mod binding;
pub mod bones;
pub mod config;
pub mod hierarchy;
pub mod texture;

pub use attribute_map::{AttributeMaps, EncodeOutcome};
pub use binder::{BindingState, HierarchyMapBinder};
pub use binding::{BindingTarget, Channel, ExposedParameters, ParameterSheet, ResolvedSlots, SlotHandle, SlotType};
pub use bones::{Bone, BoneList, HierarchyWalker};
pub use config::{BinderConfig, RadiusMode};
pub use hierarchy::{Hierarchy, NodeId, NodeTransform, TransformTree};
pub use texture::{PixelBuffer, PixelFormat, TextureDesc, TextureSink};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Hierarchy root is not set")]
    MissingRoot,

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Node reached twice during traversal: {0}")]
    CyclicHierarchy(String),

    #[error("Bone budget exceeded: more than {limit} bones")]
    BoneBudgetExceeded { limit: u32 },

    #[error("Missing parameter slot '{name}' ({expected})")]
    MissingSlot { name: String, expected: SlotType },

    #[error("Parameter slot '{name}' has type {found}, expected {expected}")]
    SlotTypeMismatch {
        name: String,
        expected: SlotType,
        found: SlotType,
    },

    #[error("Texture error: {0}")]
    Texture(String),
}

pub type Result<T> = std::result::Result<T, MapError>;
