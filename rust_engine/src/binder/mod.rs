//! 层级属性贴图绑定器
//!
//! 状态机：
//! - Stale -> Fresh：`on_enable` / `on_validate` / `rebuild`，遍历层级、按需重新分配贴图、编码
//! - Fresh -> Fresh：`refresh` / `update_binding`，只重新编码
//! - Fresh -> Stale：仅 `invalidate` 或重建失败

mod state;

pub use state::BindingState;

use std::fmt;
use std::hash::Hash;

use crate::attribute_map::{AttributeMaps, EncodeOutcome};
use crate::binding::{BindingTarget, Channel, ResolvedSlots};
use crate::bones::{BoneList, HierarchyWalker};
use crate::config::{self, BinderConfig};
use crate::hierarchy::Hierarchy;
use crate::texture::{PixelBuffer, TextureSink};
use crate::{MapError, Result};

/// 层级属性贴图绑定器
///
/// `N` 是宿主层级的节点句柄，`T` 是贴图类型。一个绑定器只驱动一个特效目标；
/// 更换目标前调用 `unbind` 清除已解析的槽位。
pub struct HierarchyMapBinder<N, T = PixelBuffer> {
    config: BinderConfig,
    hierarchy_root: Option<N>,
    state: BindingState,
    bones: BoneList<N>,
    maps: Option<AttributeMaps<T>>,
    slots: Option<ResolvedSlots>,
}

impl<N, T> HierarchyMapBinder<N, T>
where
    N: Copy + Eq + Hash + fmt::Debug,
    T: TextureSink,
{
    /// 使用全局默认配置创建
    pub fn new() -> Self {
        Self::with_config(config::get_defaults())
    }

    pub fn with_config(config: BinderConfig) -> Self {
        Self {
            config,
            hierarchy_root: None,
            state: BindingState::Stale,
            bones: BoneList::default(),
            maps: None,
            slots: None,
        }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// 替换配置；新配置要等下一次 `on_validate` / `rebuild` 才影响骨骼列表
    pub fn set_config(&mut self, config: BinderConfig) -> Result<()> {
        config.validate()?;
        if config.parameters != self.config.parameters {
            self.slots = None;
        }
        self.config = config;
        Ok(())
    }

    pub fn root(&self) -> Option<N> {
        self.hierarchy_root
    }

    pub fn set_root(&mut self, root: Option<N>) {
        self.hierarchy_root = root;
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn bones(&self) -> &BoneList<N> {
        &self.bones
    }

    pub fn bone_count(&self) -> u32 {
        self.bones.len() as u32
    }

    pub fn maps(&self) -> Option<&AttributeMaps<T>> {
        self.maps.as_ref()
    }

    /// 启用时重建
    pub fn on_enable<H: Hierarchy<Node = N>>(&mut self, hierarchy: &H) -> Result<()> {
        self.rebuild(hierarchy)
    }

    /// 编辑器校验时重建；失败只记录日志
    pub fn on_validate<H: Hierarchy<Node = N>>(&mut self, hierarchy: &H) {
        if let Err(e) = self.rebuild(hierarchy) {
            log::warn!("层级重建失败: {}", e);
        }
    }

    /// 标记为 Stale，下一次更新时重建
    pub fn invalidate(&mut self) {
        self.state = BindingState::Stale;
    }

    /// 重新遍历层级；骨骼数量变化时重新分配贴图，然后编码
    ///
    /// 失败时保持 Stale，之前的骨骼列表和贴图保留不动。
    pub fn rebuild<H: Hierarchy<Node = N>>(&mut self, hierarchy: &H) -> Result<()> {
        self.state = BindingState::Stale;

        let root = self.hierarchy_root.ok_or(MapError::MissingRoot)?;
        let bones = HierarchyWalker::from_config(&self.config).walk(hierarchy, root)?;
        let count = bones.len() as u32;
        log::info!("骨骼数量: {}", count);

        let previous_width = self.maps.as_ref().map(|m| m.width());
        if previous_width != Some(count) {
            self.maps = Some(AttributeMaps::allocate(count)?);
            log::info!("属性贴图重新分配: {:?} -> {}", previous_width, count);
        }
        self.bones = bones;

        if let Some(maps) = self.maps.as_mut() {
            maps.encode(hierarchy, &self.bones)?;
        }
        self.state = BindingState::Fresh;
        Ok(())
    }

    /// 重新编码当前骨骼列表；Stale 时先重建
    pub fn refresh<H: Hierarchy<Node = N>>(&mut self, hierarchy: &H) -> Result<EncodeOutcome> {
        if !self.state.is_fresh() {
            self.rebuild(hierarchy)?;
            return Ok(EncodeOutcome::Written { bones: self.bones.len() });
        }

        match self.maps.as_mut() {
            Some(maps) => maps.encode(hierarchy, &self.bones),
            None => {
                self.rebuild(hierarchy)?;
                Ok(EncodeOutcome::Written { bones: self.bones.len() })
            }
        }
    }

    /// 根节点已设置且存在于层级中，目标声明了全部四个类型正确的槽位
    ///
    /// 已缓存的句柄仍然有效时不做名称查找。
    pub fn is_valid<H, B>(&self, hierarchy: &H, target: &B) -> bool
    where
        H: Hierarchy<Node = N>,
        B: BindingTarget<T> + ?Sized,
    {
        match self.hierarchy_root {
            Some(root) if hierarchy.contains(root) => match self.slots {
                Some(slots) if slots.is_valid_on(target) => true,
                _ => self.config.parameters.resolve(target).is_ok(),
            },
            _ => false,
        }
    }

    /// 每帧更新：刷新贴图内容，再把三张贴图和骨骼数写入目标
    pub fn update_binding<H, B>(&mut self, hierarchy: &H, target: &mut B) -> Result<()>
    where
        H: Hierarchy<Node = N>,
        B: BindingTarget<T> + ?Sized,
    {
        self.refresh(hierarchy)?;
        let slots = self.bind(target)?;

        if let Some(maps) = self.maps.as_ref() {
            target.set_texture(slots.handle(Channel::PositionMap), maps.position());
            target.set_texture(slots.handle(Channel::TargetPositionMap), maps.target_position());
            target.set_texture(slots.handle(Channel::RadiusPositionMap), maps.radius());
        }
        target.set_uint(slots.handle(Channel::BoneCount), self.bone_count());
        Ok(())
    }

    /// 清除已解析的槽位
    pub fn unbind(&mut self) {
        self.slots = None;
    }

    /// 缓存的句柄在目标上失效时按名称重新解析
    fn bind<B: BindingTarget<T> + ?Sized>(&mut self, target: &B) -> Result<ResolvedSlots> {
        if let Some(slots) = self.slots {
            if slots.is_valid_on(target) {
                return Ok(slots);
            }
            self.slots = None;
        }
        let slots = self.config.parameters.resolve(target)?;
        self.slots = Some(slots);
        Ok(slots)
    }
}

impl<N, T> Default for HierarchyMapBinder<N, T>
where
    N: Copy + Eq + Hash + fmt::Debug,
    T: TextureSink,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, T> fmt::Display for HierarchyMapBinder<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hierarchy to AttributeMaps")
    }
}
