//! 绑定器状态

/// 绑定器状态
///
/// 只有调用方显式触发（启用、校验、`rebuild`、`invalidate`）才会改变拓扑相关的状态，
/// 层级变化不会被被动检测。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BindingState {
    /// 拓扑可能已变化，贴图尺寸可能不对
    #[default]
    Stale,
    /// 贴图尺寸与内容对应当前骨骼列表
    Fresh,
}

impl BindingState {
    pub fn is_fresh(self) -> bool {
        self == BindingState::Fresh
    }
}
