//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（Base64 / 原始字节 / 本地文件）的原始字节加载，并在“尽可能早”的阶段执行输入校验。
//! 目标是尽快失败，减少不必要内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - Base64：格式解析（纯 Base64 或 Data URL）+ 解码前体积预估 + 解码后体积限制。
//! - 字节：空内容 + 体积限制 + 文件签名校验。
//! - 文件：metadata 体积限制 + 读取。

use base64::{Engine as _, engine::general_purpose};
use std::path::Path;

use super::source::RawImageData;
use super::{ImageError, NormalizationPipeline, PipelineConfig};

impl NormalizationPipeline {
    /// 从 Base64 字符串加载图片原始字节。
    pub(crate) fn load_from_base64(
        data: &str,
        config: &PipelineConfig,
    ) -> Result<RawImageData, ImageError> {
        log::debug!("📝 开始处理 base64 图片");

        let bytes = Self::parse_base64_with_limit(data, config.max_input_bytes)?;
        Self::validate_loaded_bytes(&bytes, config)?;

        Ok(RawImageData {
            bytes,
            source_hint: "base64",
        })
    }

    /// 直接接收已解码的原始字节。
    pub(crate) fn load_from_bytes(
        bytes: Vec<u8>,
        config: &PipelineConfig,
    ) -> Result<RawImageData, ImageError> {
        Self::validate_loaded_bytes(&bytes, config)?;

        Ok(RawImageData {
            bytes,
            source_hint: "bytes",
        })
    }

    /// 从本地路径加载图片原始字节。
    pub(crate) fn load_from_file(
        path: &Path,
        config: &PipelineConfig,
    ) -> Result<RawImageData, ImageError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

        let metadata = std::fs::metadata(path)
            .map_err(|e| ImageError::InvalidFormat(format!("无法读取文件信息：{}", e)))?;

        if metadata.len() > config.max_input_bytes {
            return Err(Self::too_large(metadata.len(), config.max_input_bytes));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| ImageError::InvalidFormat(format!("无法读取图片文件：{}", e)))?;
        Self::validate_loaded_bytes(&bytes, config)?;

        Ok(RawImageData {
            bytes,
            source_hint: "file",
        })
    }

    fn validate_loaded_bytes(bytes: &[u8], config: &PipelineConfig) -> Result<(), ImageError> {
        if bytes.len() as u64 > config.max_input_bytes {
            return Err(Self::too_large(bytes.len() as u64, config.max_input_bytes));
        }
        Self::validate_image_signature(bytes)
    }

    fn too_large(len: u64, limit: u64) -> ImageError {
        ImageError::ResourceLimit(format!(
            "图片体积过大：{:.2} MB（限制：{:.2} MB）",
            len as f64 / 1024.0 / 1024.0,
            limit as f64 / 1024.0 / 1024.0
        ))
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, ImageError> {
        let len = base64_data.trim().len() as u64;
        let groups = len
            .checked_add(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 输入长度溢出".to_string()))?
            / 4;

        groups
            .checked_mul(3)
            .ok_or_else(|| ImageError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
    }

    pub(crate) fn parse_base64_with_limit(data: &str, max_size: u64) -> Result<Vec<u8>, ImageError> {
        let normalized = data.trim();

        let base64_data = if normalized.starts_with("data:image/") {
            let base64_start = normalized
                .find(";base64,")
                .ok_or_else(|| ImageError::InvalidFormat("缺少 base64 标记".to_string()))?;
            &normalized[base64_start + 8..]
        } else {
            normalized
        };

        // 按行折断的 base64（如 76 列换行）先去掉空白再估算与解码
        let compact: String = base64_data
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(&compact)?;
        if estimated_len > max_size {
            return Err(ImageError::ResourceLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))
    }

    fn validate_image_signature(bytes: &[u8]) -> Result<(), ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::InvalidFormat("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| ImageError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(ImageError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        Ok(())
    }
}
