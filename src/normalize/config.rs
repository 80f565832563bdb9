//! # 配置模块
//!
//! ## 设计思路
//!
//! 将规范化流水线的所有“可调参数”集中到 `PipelineConfig`，保证行为可观测、可测试。
//! 目标尺寸默认 90x90：下游渲染端（手表 SDK）只接受固定尺寸，超出会直接卡死。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用配置。
//! - `ResampleFilter` 负责滤镜字符串解析与反向输出（供 JSON 配置覆盖）。
//! - `validate` 在启动阶段拒绝无意义的参数组合。

use image::imageops::FilterType;

use super::ImageError;

/// 边框判定容差（灰度差的绝对值）。
///
/// 足够吸收 JPEG 压缩噪声，又远小于二维码模块边缘的抗锯齿过渡。
pub const BORDER_TOLERANCE: u8 = 16;

/// 默认输出宽度（像素）。
pub const DEFAULT_TARGET_WIDTH: u32 = 90;
/// 默认输出高度（像素）。
pub const DEFAULT_TARGET_HEIGHT: u32 = 90;

const MAX_TARGET_DIMENSION: u32 = 4096;

/// 重采样滤镜。
///
/// - `Nearest`：最快，但缩放后模块边缘会出现锯齿（保真度折中，仅作兜底）
/// - `Bilinear`：默认值，放大与缩小都较平滑
/// - `CatmullRom` / `Lanczos3`：更锐利，代价更高
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleFilter {
    Nearest,
    Bilinear,
    CatmullRom,
    Lanczos3,
}

impl ResampleFilter {
    /// 从外部字符串解析滤镜。
    ///
    /// # 示例
    /// ```rust
    /// use qrcode_store::normalize::ResampleFilter;
    ///
    /// let f = ResampleFilter::from_str("bilinear")?;
    /// assert_eq!(f.as_str(), "bilinear");
    /// # Ok::<(), qrcode_store::normalize::ImageError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Result<Self, ImageError> {
        match name.trim().to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" | "triangle" => Ok(Self::Bilinear),
            "catmullrom" | "catmull-rom" => Ok(Self::CatmullRom),
            "lanczos3" => Ok(Self::Lanczos3),
            other => Err(ImageError::InvalidFormat(format!(
                "未知重采样滤镜：{}（可选：nearest / bilinear / catmullrom / lanczos3）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::CatmullRom => "catmullrom",
            Self::Lanczos3 => "lanczos3",
        }
    }

    /// 映射到 `image` crate 的滤镜（兜底缩放路径使用）。
    pub(crate) fn to_image_filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Bilinear => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// 规范化流水线配置。
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 输出宽度（像素）。
    pub target_width: u32,
    /// 输出高度（像素）。
    pub target_height: u32,
    /// 边框判定容差。
    pub border_tolerance: u8,
    /// 重采样滤镜。
    pub resize_filter: ResampleFilter,
    /// 原始编码字节的体积上限。
    pub max_input_bytes: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            border_tolerance: BORDER_TOLERANCE,
            resize_filter: ResampleFilter::Bilinear,
            max_input_bytes: 10 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
        }
    }
}

impl PipelineConfig {
    /// 校验参数组合。
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ImageError::InvalidFormat("目标尺寸不能为 0".to_string()));
        }
        if self.target_width > MAX_TARGET_DIMENSION || self.target_height > MAX_TARGET_DIMENSION {
            return Err(ImageError::InvalidFormat(format!(
                "目标尺寸过大：{}x{}（限制：{}）",
                self.target_width, self.target_height, MAX_TARGET_DIMENSION
            )));
        }
        if self.max_input_bytes == 0 {
            return Err(ImageError::InvalidFormat("max_input_bytes 不能为 0".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ImageError::InvalidFormat("max_decoded_pixels 不能为 0".to_string()));
        }
        Ok(())
    }
}
