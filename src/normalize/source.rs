//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦，每个阶段独占上一阶段的输出：
//! - `RawImageData` 表示已加载但未解码的字节
//! - `DecodedBitmap` 表示解码后的任意色彩位图
//! - `CropBox` 表示裁边阶段得到的矩形区域 `[x0, y0, x1, y1)`
//! - `NormalizedImage` 表示可直接入库的编码结果

use image::DynamicImage;

use super::ImageError;

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 解码阶段输出：宽高均不为 0 的位图。
pub struct DecodedBitmap(pub(crate) DynamicImage);

impl DecodedBitmap {
    /// 包装位图，零尺寸视为前置条件被破坏。
    pub fn new(image: DynamicImage) -> Result<Self, ImageError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ImageError::EmptyBitmap(format!(
                "位图尺寸为 {}x{}",
                image.width(),
                image.height()
            )));
        }
        Ok(Self(image))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn into_inner(self) -> DynamicImage {
        self.0
    }
}

/// 裁边区域，半开区间 `[x0, x1) x [y0, y1)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropBox {
    /// 覆盖整幅图像的区域。
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }
}

/// 最终输出：编码后的单通道位图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// 图像宽度（像素）。
    pub width: u32,
    /// 图像高度（像素）。
    pub height: u32,
    /// PNG 编码字节。
    pub bytes: Vec<u8>,
}

impl NormalizedImage {
    /// 响应头中声明的内容类型。
    pub const CONTENT_TYPE: &'static str = "image/png";
}
