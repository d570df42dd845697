//! 绑定器配置
//!
//! 扁平结构，支持 TOML 持久化；另有一份进程级默认模板，新建绑定器时从中复制。

use std::path::Path;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::binding::ExposedParameters;
use crate::{MapError, Result};

/// 贴图最大宽度，同时也是骨骼数量的硬上限
pub const MAX_TEXTURE_WIDTH: u32 = 16384;

/// 半径模式
///
/// `Interpolate` 目前只做声明，编码器始终写入源半径。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadiusMode {
    #[default]
    Fixed,
    Interpolate,
}

/// 绑定器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// 每根骨骼两端的默认半径，默认 0.1
    pub default_radius: f32,
    /// 最大递归深度，0 表示只取根节点的直接子节点，默认 3
    pub maximum_depth: u32,
    /// 半径模式，默认 Fixed
    pub radius_mode: RadiusMode,
    /// 单次遍历最多产生的骨骼数，默认 MAX_TEXTURE_WIDTH
    pub max_bones: u32,
    /// 宿主参数槽名称
    pub parameters: ExposedParameters,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            default_radius: 0.1,
            maximum_depth: 3,
            radius_mode: RadiusMode::Fixed,
            max_bones: MAX_TEXTURE_WIDTH,
            parameters: ExposedParameters::default(),
        }
    }
}

impl BinderConfig {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| MapError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| MapError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_toml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.default_radius.is_finite() || self.default_radius < 0.0 {
            return Err(MapError::Config(format!(
                "default_radius must be finite and non-negative, got {}",
                self.default_radius
            )));
        }
        if self.max_bones == 0 || self.max_bones > MAX_TEXTURE_WIDTH {
            return Err(MapError::Config(format!(
                "max_bones must be in 1..={}, got {}",
                MAX_TEXTURE_WIDTH, self.max_bones
            )));
        }
        self.parameters.validate()
    }
}

/// 全局默认配置
static DEFAULT_CONFIG: Lazy<RwLock<BinderConfig>> = Lazy::new(|| RwLock::new(BinderConfig::default()));

/// 获取当前默认配置
pub fn get_defaults() -> BinderConfig {
    DEFAULT_CONFIG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// 替换默认配置（校验失败时保持原值）
pub fn set_defaults(config: BinderConfig) -> Result<()> {
    config.validate()?;
    *DEFAULT_CONFIG.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
    Ok(())
}

/// 重置为内置默认值
pub fn reset_defaults() {
    *DEFAULT_CONFIG.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = BinderConfig::default();
}
