//! 宿主绑定接口
//!
//! 四个逻辑通道在首次绑定时按名称解析为槽位句柄，之后直接按句柄读写。

mod parameter_sheet;

pub use parameter_sheet::{ParameterSheet, SlotValue};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MapError, Result};

/// 参数槽类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotType {
    UInt,
    Texture2D,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotType::UInt => write!(f, "System.UInt32"),
            SlotType::Texture2D => write!(f, "Texture2D"),
        }
    }
}

/// 宿主分配的槽位句柄
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotHandle(pub u32);

/// 逻辑通道
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    BoneCount,
    PositionMap,
    TargetPositionMap,
    RadiusPositionMap,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::BoneCount,
        Channel::PositionMap,
        Channel::TargetPositionMap,
        Channel::RadiusPositionMap,
    ];

    pub fn slot_type(self) -> SlotType {
        match self {
            Channel::BoneCount => SlotType::UInt,
            _ => SlotType::Texture2D,
        }
    }

    /// 默认暴露名称
    pub fn default_name(self) -> &'static str {
        match self {
            Channel::BoneCount => "BoneCount",
            Channel::PositionMap => "PositionMap",
            Channel::TargetPositionMap => "TargetPositionMap",
            Channel::RadiusPositionMap => "RadiusPositionMap",
        }
    }

    fn index(self) -> usize {
        match self {
            Channel::BoneCount => 0,
            Channel::PositionMap => 1,
            Channel::TargetPositionMap => 2,
            Channel::RadiusPositionMap => 3,
        }
    }
}

/// 特效对象（宿主侧）
///
/// `T` 是绑定到贴图槽的贴图类型。
///
/// 句柄在槽位存在期间必须保持不变。绑定器缓存首次解析出的句柄，之后只按句柄校验类型；
/// 换用另一个目标对象时，宿主需要先调用绑定器的 `unbind`。
pub trait BindingTarget<T> {
    /// 按名称查找槽位及其声明类型
    fn find_slot(&self, name: &str) -> Option<(SlotHandle, SlotType)>;

    /// 按句柄查询槽位类型；句柄失效时返回 `None`
    fn slot_type(&self, slot: SlotHandle) -> Option<SlotType>;

    fn set_uint(&mut self, slot: SlotHandle, value: u32);

    fn set_texture(&mut self, slot: SlotHandle, texture: &T);
}

/// 四个通道在宿主上暴露的参数名
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposedParameters {
    pub bone_count: String,
    pub position_map: String,
    pub target_position_map: String,
    pub radius_map: String,
}

impl Default for ExposedParameters {
    fn default() -> Self {
        Self {
            bone_count: Channel::BoneCount.default_name().to_string(),
            position_map: Channel::PositionMap.default_name().to_string(),
            target_position_map: Channel::TargetPositionMap.default_name().to_string(),
            radius_map: Channel::RadiusPositionMap.default_name().to_string(),
        }
    }
}

impl ExposedParameters {
    pub fn name(&self, channel: Channel) -> &str {
        match channel {
            Channel::BoneCount => &self.bone_count,
            Channel::PositionMap => &self.position_map,
            Channel::TargetPositionMap => &self.target_position_map,
            Channel::RadiusPositionMap => &self.radius_map,
        }
    }

    pub fn set_name(&mut self, channel: Channel, name: impl Into<String>) {
        let name = name.into();
        match channel {
            Channel::BoneCount => self.bone_count = name,
            Channel::PositionMap => self.position_map = name,
            Channel::TargetPositionMap => self.target_position_map = name,
            Channel::RadiusPositionMap => self.radius_map = name,
        }
    }

    /// 名称不能为空
    pub fn validate(&self) -> Result<()> {
        for channel in Channel::ALL {
            if self.name(channel).trim().is_empty() {
                return Err(MapError::Config(format!("parameter name for {:?} is empty", channel)));
            }
        }
        Ok(())
    }

    /// 在目标上解析全部四个槽位，缺失或类型不符即失败
    pub fn resolve<T, B: BindingTarget<T> + ?Sized>(&self, target: &B) -> Result<ResolvedSlots> {
        let mut handles = [SlotHandle(0); 4];
        for channel in Channel::ALL {
            let name = self.name(channel);
            let expected = channel.slot_type();
            match target.find_slot(name) {
                Some((handle, found)) if found == expected => handles[channel.index()] = handle,
                Some((_, found)) => {
                    return Err(MapError::SlotTypeMismatch {
                        name: name.to_string(),
                        expected,
                        found,
                    })
                }
                None => {
                    return Err(MapError::MissingSlot {
                        name: name.to_string(),
                        expected,
                    })
                }
            }
        }
        Ok(ResolvedSlots { handles })
    }
}

/// 已解析的槽位句柄
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedSlots {
    handles: [SlotHandle; 4],
}

impl ResolvedSlots {
    pub fn handle(&self, channel: Channel) -> SlotHandle {
        self.handles[channel.index()]
    }

    /// 按句柄检查四个槽位在目标上仍然存在且类型正确（不做名称查找）
    pub fn is_valid_on<T, B: BindingTarget<T> + ?Sized>(&self, target: &B) -> bool {
        Channel::ALL
            .iter()
            .all(|&channel| target.slot_type(self.handle(channel)) == Some(channel.slot_type()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::PixelBuffer;

    fn full_sheet() -> ParameterSheet<PixelBuffer> {
        let mut sheet = ParameterSheet::new();
        sheet.declare("BoneCount", SlotType::UInt);
        sheet.declare("PositionMap", SlotType::Texture2D);
        sheet.declare("TargetPositionMap", SlotType::Texture2D);
        sheet.declare("RadiusPositionMap", SlotType::Texture2D);
        sheet
    }

    #[test]
    fn test_resolve_all_channels() {
        let sheet = full_sheet();
        let slots = ExposedParameters::default().resolve(&sheet).unwrap();
        for channel in Channel::ALL {
            assert_eq!(Some((slots.handle(channel), channel.slot_type())), sheet.find_slot(channel.default_name()));
        }
    }

    #[test]
    fn test_resolve_missing_slot() {
        let mut sheet: ParameterSheet<PixelBuffer> = ParameterSheet::new();
        sheet.declare("BoneCount", SlotType::UInt);
        sheet.declare("PositionMap", SlotType::Texture2D);
        sheet.declare("TargetPositionMap", SlotType::Texture2D);

        match ExposedParameters::default().resolve(&sheet) {
            Err(MapError::MissingSlot { name, expected }) => {
                assert_eq!(name, "RadiusPositionMap");
                assert_eq!(expected, SlotType::Texture2D);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_type_mismatch() {
        let mut sheet: ParameterSheet<PixelBuffer> = ParameterSheet::new();
        sheet.declare("BoneCount", SlotType::Texture2D);
        assert!(matches!(
            ExposedParameters::default().resolve(&sheet),
            Err(MapError::SlotTypeMismatch { expected: SlotType::UInt, found: SlotType::Texture2D, .. })
        ));
    }

    #[test]
    fn test_cached_handles_check_types() {
        let mut sheet = full_sheet();
        let slots = ExposedParameters::default().resolve(&sheet).unwrap();
        assert!(slots.is_valid_on(&sheet));

        sheet.declare("PositionMap", SlotType::UInt);
        assert!(!slots.is_valid_on(&sheet));
        assert!(!slots.is_valid_on(&ParameterSheet::<PixelBuffer>::new()));
    }

    #[test]
    fn test_renamed_parameters() {
        let mut sheet = full_sheet();
        sheet.declare("Joints", SlotType::UInt);

        let mut params = ExposedParameters::default();
        params.set_name(Channel::BoneCount, "Joints");
        let slots = params.resolve(&sheet).unwrap();
        assert_eq!(Some((slots.handle(Channel::BoneCount), SlotType::UInt)), sheet.find_slot("Joints"));

        params.set_name(Channel::RadiusPositionMap, " ");
        assert!(params.validate().is_err());
    }
}
