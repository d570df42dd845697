//! 内存中的参数表，用于无宿主运行和测试

use std::collections::HashMap;

use super::{BindingTarget, Channel, ExposedParameters, SlotHandle, SlotType};

/// 槽位当前值
#[derive(Clone, Debug)]
pub enum SlotValue<T> {
    UInt(u32),
    Texture(Option<T>),
}

#[derive(Clone, Debug)]
struct Slot<T> {
    name: String,
    slot_type: SlotType,
    value: SlotValue<T>,
}

/// 参数表
///
/// 贴图槽保存绑定时贴图的副本。
#[derive(Clone, Debug)]
pub struct ParameterSheet<T> {
    slots: Vec<Slot<T>>,
    name_to_index: HashMap<String, usize>,
}

impl<T> ParameterSheet<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            name_to_index: HashMap::new(),
        }
    }

    /// 声明槽位；同名槽位会被替换
    pub fn declare(&mut self, name: impl Into<String>, slot_type: SlotType) -> SlotHandle {
        let name = name.into();
        let value = match slot_type {
            SlotType::UInt => SlotValue::UInt(0),
            SlotType::Texture2D => SlotValue::Texture(None),
        };

        if let Some(&index) = self.name_to_index.get(&name) {
            self.slots[index] = Slot { name, slot_type, value };
            return SlotHandle(index as u32);
        }

        let index = self.slots.len();
        self.name_to_index.insert(name.clone(), index);
        self.slots.push(Slot { name, slot_type, value });
        SlotHandle(index as u32)
    }

    /// 按默认名称声明全部四个通道
    pub fn with_default_slots() -> Self {
        Self::with_slots(&ExposedParameters::default())
    }

    pub fn with_slots(parameters: &ExposedParameters) -> Self {
        let mut sheet = Self::new();
        for channel in Channel::ALL {
            sheet.declare(parameters.name(channel), channel.slot_type());
        }
        sheet
    }

    pub fn uint(&self, name: &str) -> Option<u32> {
        match self.value(name)? {
            SlotValue::UInt(v) => Some(*v),
            SlotValue::Texture(_) => None,
        }
    }

    pub fn texture(&self, name: &str) -> Option<&T> {
        match self.value(name)? {
            SlotValue::Texture(t) => t.as_ref(),
            SlotValue::UInt(_) => None,
        }
    }

    /// 按通道读取 BoneCount
    pub fn bone_count(&self, parameters: &ExposedParameters) -> Option<u32> {
        self.uint(parameters.name(Channel::BoneCount))
    }

    /// 按通道读取贴图
    pub fn channel_texture(&self, parameters: &ExposedParameters, channel: Channel) -> Option<&T> {
        self.texture(parameters.name(channel))
    }

    fn value(&self, name: &str) -> Option<&SlotValue<T>> {
        self.name_to_index.get(name).map(|&i| &self.slots[i].value)
    }

    fn slot_mut(&mut self, slot: SlotHandle) -> Option<&mut Slot<T>> {
        self.slots.get_mut(slot.0 as usize)
    }
}

impl<T> Default for ParameterSheet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> BindingTarget<T> for ParameterSheet<T> {
    fn find_slot(&self, name: &str) -> Option<(SlotHandle, SlotType)> {
        self.name_to_index
            .get(name)
            .map(|&i| (SlotHandle(i as u32), self.slots[i].slot_type))
    }

    fn slot_type(&self, slot: SlotHandle) -> Option<SlotType> {
        self.slots.get(slot.0 as usize).map(|s| s.slot_type)
    }

    fn set_uint(&mut self, slot: SlotHandle, value: u32) {
        if let Some(slot) = self.slot_mut(slot) {
            if slot.slot_type == SlotType::UInt {
                slot.value = SlotValue::UInt(value);
            } else {
                log::warn!("贴图槽 '{}' 不接受 uint，已忽略", slot.name);
            }
        }
    }

    fn set_texture(&mut self, slot: SlotHandle, texture: &T) {
        if let Some(slot) = self.slot_mut(slot) {
            if slot.slot_type == SlotType::Texture2D {
                slot.value = SlotValue::Texture(Some(texture.clone()));
            } else {
                log::warn!("uint 槽 '{}' 不接受贴图，已忽略", slot.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_get_set() {
        let mut sheet: ParameterSheet<String> = ParameterSheet::new();
        let count = sheet.declare("Count", SlotType::UInt);
        let map = sheet.declare("Map", SlotType::Texture2D);

        assert_eq!(sheet.uint("Count"), Some(0));
        assert_eq!(sheet.texture("Map"), None);

        sheet.set_uint(count, 12);
        sheet.set_texture(map, &"tex".to_string());
        assert_eq!(sheet.uint("Count"), Some(12));
        assert_eq!(sheet.texture("Map").map(String::as_str), Some("tex"));

        // 类型不符的写入被忽略
        sheet.set_uint(map, 3);
        sheet.set_texture(count, &"other".to_string());
        assert_eq!(sheet.uint("Count"), Some(12));
        assert_eq!(sheet.texture("Map").map(String::as_str), Some("tex"));
    }

    #[test]
    fn test_redeclare_keeps_handle() {
        let mut sheet: ParameterSheet<String> = ParameterSheet::new();
        let first = sheet.declare("Slot", SlotType::UInt);
        let second = sheet.declare("Slot", SlotType::Texture2D);
        assert_eq!(first, second);
        assert_eq!(sheet.find_slot("Slot"), Some((first, SlotType::Texture2D)));
    }

    #[test]
    fn test_default_slots() {
        let sheet: ParameterSheet<String> = ParameterSheet::with_default_slots();
        let params = ExposedParameters::default();
        assert!(params.resolve(&sheet).is_ok());
        assert_eq!(sheet.bone_count(&params), Some(0));
        assert_eq!(sheet.channel_texture(&params, Channel::PositionMap), None);
    }
}
