//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `NormalizationPipeline` 只负责流程编排，不持有存储或网络句柄。
//! 处理链路固定为线性五段：
//! 1. 解码（Decoded）
//! 2. 灰度（Grayscaled）
//! 3. 裁边（Cropped）
//! 4. 缩放（Resized）
//! 5. 编码（Encoded）
//!
//! ## 实现思路
//!
//! - 每个阶段返回 `Result`，通过 `?` 在第一个失败处中止，绝不把未定义数据传给下一段。
//! - 位图所有权逐段转移，阶段之间没有共享可变状态，可在任意线程并发调用。
//! - 记录 `decode/gray/crop/resize/encode/total` 阶段耗时，便于性能诊断。

use std::path::Path;
use std::time::Instant;

use super::source::{NormalizedImage, RawImageData};
use super::{BorderCropper, GrayscaleConverter, ImageError, PipelineConfig, Resizer};

/// 图片规范化流水线。
#[derive(Debug, Clone)]
pub struct NormalizationPipeline {
    config: PipelineConfig,
    grayscale: GrayscaleConverter,
    cropper: BorderCropper,
    resizer: Resizer,
}

impl NormalizationPipeline {
    /// 根据配置创建流水线。
    ///
    /// # 示例
    /// ```rust
    /// use qrcode_store::normalize::{NormalizationPipeline, PipelineConfig};
    ///
    /// let pipeline = NormalizationPipeline::new(PipelineConfig::default())?;
    /// assert_eq!(pipeline.config().target_width, 90);
    /// # Ok::<(), qrcode_store::normalize::ImageError>(())
    /// ```
    pub fn new(config: PipelineConfig) -> Result<Self, ImageError> {
        config.validate()?;

        Ok(Self {
            grayscale: GrayscaleConverter,
            cropper: BorderCropper::new(config.border_tolerance),
            resizer: Resizer::new(
                config.target_width,
                config.target_height,
                config.resize_filter,
            ),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 规范化原始编码字节。
    pub fn normalize_bytes(&self, bytes: Vec<u8>) -> Result<NormalizedImage, ImageError> {
        let raw = Self::load_from_bytes(bytes, &self.config)?;
        self.run(raw)
    }

    /// 规范化 Base64（纯字符串或 Data URL）。
    pub fn normalize_base64(&self, data: &str) -> Result<NormalizedImage, ImageError> {
        let raw = Self::load_from_base64(data, &self.config)?;
        self.run(raw)
    }

    /// 规范化本地文件。
    pub fn normalize_file(&self, path: &Path) -> Result<NormalizedImage, ImageError> {
        let raw = Self::load_from_file(path, &self.config)?;
        self.run(raw)
    }

    fn run(&self, raw: RawImageData) -> Result<NormalizedImage, ImageError> {
        let source_hint = raw.source_hint;
        let input_len = raw.bytes.len();
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let decoded = Self::decode(raw, &self.config)?;
        let (src_width, src_height) = (decoded.width(), decoded.height());
        let decode_elapsed = decode_start.elapsed();

        let gray_start = Instant::now();
        let gray = self.grayscale.convert(decoded);
        let gray_elapsed = gray_start.elapsed();

        let crop_start = Instant::now();
        let cropped = self.cropper.crop(gray);
        let (crop_width, crop_height) = cropped.dimensions();
        let crop_elapsed = crop_start.elapsed();

        let resize_start = Instant::now();
        let resized = self.resizer.resize(cropped)?;
        let resize_elapsed = resize_start.elapsed();

        let encode_start = Instant::now();
        let encoded = Self::encode(resized)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 图片规范化完成 - 来源: {} 输入={}B {}x{} -> 裁边 {}x{} -> 输出 {}x{} ({}B) decode={}ms gray={}ms crop={}ms resize={}ms encode={}ms total={}ms",
            source_hint,
            input_len,
            src_width,
            src_height,
            crop_width,
            crop_height,
            encoded.width,
            encoded.height,
            encoded.bytes.len(),
            decode_elapsed.as_millis(),
            gray_elapsed.as_millis(),
            crop_elapsed.as_millis(),
            resize_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(encoded)
    }
}
