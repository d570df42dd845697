//! 内存像素贴图
//!
//! 暂存区按 RGBA 保存写入的像素；提交时按格式通道数打包成 `f32` 数组，
//! 单通道格式只保留 R 分量。

use glam::Vec4;

use crate::config::MAX_TEXTURE_WIDTH;
use crate::{MapError, Result};
use super::{TextureDesc, TextureSink};

/// 内存像素贴图
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    desc: TextureDesc,
    staged: Vec<Vec4>,
    published: Vec<f32>,
    revision: u64,
}

impl PixelBuffer {
    /// 暂存区像素
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.desc.width || y >= self.desc.height {
            return None;
        }
        self.staged.get((y * self.desc.width + x) as usize).copied()
    }

    /// 暂存区全部像素（行优先）
    pub fn pixels(&self) -> &[Vec4] {
        &self.staged
    }

    /// 最近一次提交的数据，每像素 `channel_count` 个分量
    pub fn published(&self) -> &[f32] {
        &self.published
    }

    pub fn published_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.published.as_slice())
    }

    /// 最近一次提交的某个像素（未用到的通道补 0）
    pub fn published_pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.desc.width || y >= self.desc.height {
            return None;
        }
        let channels = self.desc.format.channel_count();
        let start = (y * self.desc.width + x) as usize * channels;
        let texel = self.published.get(start..start + channels)?;
        let mut out = [0.0; 4];
        out[..channels].copy_from_slice(texel);
        Some(Vec4::from_array(out))
    }

    /// 提交次数
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl TextureSink for PixelBuffer {
    fn create(desc: &TextureDesc) -> Result<Self> {
        if desc.width > MAX_TEXTURE_WIDTH || desc.height > MAX_TEXTURE_WIDTH {
            return Err(MapError::Texture(format!(
                "Texture size {}x{} exceeds limit {}",
                desc.width, desc.height, MAX_TEXTURE_WIDTH
            )));
        }
        if desc.height == 0 {
            return Err(MapError::Texture("Texture height must be at least 1".to_string()));
        }

        let pixel_count = desc.pixel_count();
        Ok(Self {
            desc: *desc,
            staged: vec![Vec4::ZERO; pixel_count],
            published: vec![0.0; pixel_count * desc.format.channel_count()],
            revision: 0,
        })
    }

    fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    fn write_row(&mut self, y: u32, pixels: &[Vec4]) -> Result<()> {
        if y >= self.desc.height {
            return Err(MapError::Texture(format!("Row {} out of range (height {})", y, self.desc.height)));
        }
        if pixels.len() != self.desc.width as usize {
            return Err(MapError::Texture(format!(
                "Row length {} does not match texture width {}",
                pixels.len(),
                self.desc.width
            )));
        }

        let start = (y * self.desc.width) as usize;
        self.staged[start..start + pixels.len()].copy_from_slice(pixels);
        Ok(())
    }

    fn commit(&mut self) {
        let channels = self.desc.format.channel_count();
        for (texel, pixel) in self.published.chunks_exact_mut(channels).zip(&self.staged) {
            texel.copy_from_slice(&pixel.to_array()[..channels]);
        }
        self.revision += 1;
    }
}
