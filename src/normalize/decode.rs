//! # 解码模块
//!
//! ## 设计思路
//!
//! 将“字节 → 位图”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码
//! 4. 零尺寸位图视为前置条件被破坏，立即上报

use image::{GenericImageView, ImageReader};
use std::io::Cursor;

use super::source::{DecodedBitmap, RawImageData};
use super::{ImageError, NormalizationPipeline, PipelineConfig};

impl NormalizationPipeline {
    /// 将原始字节解码为位图。
    pub(crate) fn decode(
        raw: RawImageData,
        config: &PipelineConfig,
    ) -> Result<DecodedBitmap, ImageError> {
        let (header_width, header_height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(config, width, height)?;

        log::debug!(
            "图片解码成功 - 来源: {} 尺寸: {}x{} 色彩: {:?}",
            raw.source_hint,
            width,
            height,
            decoded.color()
        );

        DecodedBitmap::new(decoded)
    }

    /// 仅通过内存中的图片头信息读取宽高。
    fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| ImageError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    fn validate_pixel_limits(
        config: &PipelineConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ImageError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }
}
