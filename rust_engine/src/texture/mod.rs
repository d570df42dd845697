//! 像素贴图

mod export;
mod pixel_buffer;

pub use export::{save_preview, to_rgba32f_image};
pub use pixel_buffer::PixelBuffer;

use glam::Vec4;

use crate::Result;

/// 像素格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 通道半精度
    RgbaHalf,
    /// 单通道半精度
    RHalf,
    /// 4 通道单精度
    RgbaFloat,
    /// 单通道单精度
    RFloat,
}

impl PixelFormat {
    pub fn channel_count(self) -> usize {
        match self {
            PixelFormat::RgbaHalf | PixelFormat::RgbaFloat => 4,
            PixelFormat::RHalf | PixelFormat::RFloat => 1,
        }
    }
}

/// 贴图创建参数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub mip_chain: bool,
    pub linear: bool,
}

impl TextureDesc {
    /// 单行、无 mip、线性空间
    pub fn row(width: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height: 1,
            format,
            mip_chain: false,
            linear: true,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// 贴图接收端
///
/// 写入只修改暂存数据，`commit` 之后才对下游可见。
pub trait TextureSink: Sized {
    fn create(desc: &TextureDesc) -> Result<Self>;

    fn desc(&self) -> &TextureDesc;

    fn width(&self) -> u32 {
        self.desc().width
    }

    /// 写入一整行像素，长度必须等于宽度
    fn write_row(&mut self, y: u32, pixels: &[Vec4]) -> Result<()>;

    fn commit(&mut self);
}
