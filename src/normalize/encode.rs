//! 编码阶段：单通道位图 → PNG 字节。

use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;

use super::source::NormalizedImage;
use super::{ImageError, NormalizationPipeline};

impl NormalizationPipeline {
    pub(crate) fn encode(image: GrayImage) -> Result<NormalizedImage, ImageError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyBitmap(format!(
                "待编码位图尺寸为 {}x{}",
                width, height
            )));
        }

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image)
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ImageError::Encode(format!("PNG 编码失败：{}", e)))?;

        Ok(NormalizedImage {
            width,
            height,
            bytes: cursor.into_inner(),
        })
    }
}
