//! 调试导出
//!
//! 导出的是已提交的数据；单通道格式展开为 (r, 0, 0, 1)。

use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgba32FImage};

use crate::{MapError, Result};
use super::{PixelBuffer, TextureSink};

/// 转换为 32 位浮点 RGBA 图像
pub fn to_rgba32f_image(buffer: &PixelBuffer) -> Result<Rgba32FImage> {
    let desc = buffer.desc();
    let single_channel = desc.format.channel_count() == 1;

    let mut data = Vec::with_capacity(desc.pixel_count() * 4);
    for y in 0..desc.height {
        for x in 0..desc.width {
            let mut texel = buffer.published_pixel(x, y).unwrap_or_default();
            if single_channel {
                texel.w = 1.0;
            }
            data.extend_from_slice(&texel.to_array());
        }
    }

    Rgba32FImage::from_raw(desc.width, desc.height, data)
        .ok_or_else(|| MapError::Texture("Failed to build image from pixel data".to_string()))
}

/// 保存 8 位 PNG 预览（数值被截断到 [0, 1]）
pub fn save_preview<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> Result<()> {
    if buffer.width() == 0 {
        return Err(MapError::Texture("Cannot save an empty texture".to_string()));
    }

    let preview = DynamicImage::ImageRgba32F(to_rgba32f_image(buffer)?).to_rgba8();
    preview
        .save_with_format(path.as_ref(), ImageFormat::Png)
        .map_err(|e| MapError::Texture(format!("Failed to save preview: {}", e)))
}
