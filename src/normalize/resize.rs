//! # 缩放模块
//!
//! ## 设计思路
//!
//! 输出尺寸固定（默认 90x90），不论源图宽高比，不做留白补齐：下游渲染端只认固定尺寸。
//! 放大（裁边后很小）与缩小（原图很大）都走卷积重采样，避免最近邻把二维码模块挤成锯齿。
//!
//! ## 实现思路
//!
//! - 主路径：`fast_image_resize` 单通道 `U8` 卷积。
//! - 兜底：`fast_image_resize` 拒绝缓冲区时回退 `image::imageops::resize`，滤镜一致。
//! - 源尺寸与目标一致时直接返回，保证幂等。

use fast_image_resize as fr;
use image::{GrayImage, imageops};

use super::{ImageError, ResampleFilter};

/// 固定尺寸缩放器。
#[derive(Debug, Clone, Copy)]
pub struct Resizer {
    width: u32,
    height: u32,
    filter: ResampleFilter,
}

impl Resizer {
    pub fn new(width: u32, height: u32, filter: ResampleFilter) -> Self {
        Self {
            width,
            height,
            filter,
        }
    }

    pub fn target(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 缩放到目标尺寸。
    ///
    /// 空位图或零目标尺寸属于前置条件被破坏，直接返回 `EmptyBitmap`。
    pub fn resize(&self, image: GrayImage) -> Result<GrayImage, ImageError> {
        let (src_width, src_height) = image.dimensions();
        if src_width == 0 || src_height == 0 {
            return Err(ImageError::EmptyBitmap(format!(
                "待缩放位图尺寸为 {}x{}",
                src_width, src_height
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ImageError::EmptyBitmap(format!(
                "目标尺寸为 {}x{}",
                self.width, self.height
            )));
        }

        if (src_width, src_height) == (self.width, self.height) {
            return Ok(image);
        }

        match self.resize_with_fast_image_resize(&image) {
            Ok(resized) => Ok(resized),
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}",
                    err
                );
                Ok(imageops::resize(
                    &image,
                    self.width,
                    self.height,
                    self.filter.to_image_filter(),
                ))
            }
        }
    }

    fn resize_with_fast_image_resize(&self, image: &GrayImage) -> Result<GrayImage, ImageError> {
        let (src_width, src_height) = image.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            image.as_raw().clone(),
            fr::PixelType::U8,
        )
        .map_err(|e| ImageError::Encode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(self.width, self.height, fr::PixelType::U8);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(self.to_fast_alg());

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| ImageError::Encode(format!("fast_image_resize 执行失败：{}", e)))?;

        GrayImage::from_raw(self.width, self.height, dst_image.into_vec())
            .ok_or_else(|| ImageError::Encode("fast_image_resize 输出缓冲长度异常".to_string()))
    }

    fn to_fast_alg(&self) -> fr::ResizeAlg {
        match self.filter {
            ResampleFilter::Nearest => fr::ResizeAlg::Nearest,
            ResampleFilter::Bilinear => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            ResampleFilter::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            ResampleFilter::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use proptest::prelude::*;

    fn bilinear(width: u32, height: u32) -> Resizer {
        Resizer::new(width, height, ResampleFilter::Bilinear)
    }

    #[test]
    fn upscales_small_crop_to_target() {
        let image = GrayImage::from_fn(7, 7, |x, y| Luma([if (x + y) % 2 == 0 { 0 } else { 255 }]));
        let resized = bilinear(90, 90).resize(image).unwrap();
        assert_eq!(resized.dimensions(), (90, 90));
    }

    #[test]
    fn downscales_large_crop_to_target() {
        let image = GrayImage::from_fn(640, 480, |x, _| Luma([(x % 256) as u8]));
        let resized = bilinear(90, 90).resize(image).unwrap();
        assert_eq!(resized.dimensions(), (90, 90));
    }

    #[test]
    fn non_square_source_is_stretched() {
        let image = GrayImage::from_pixel(300, 40, Luma([10]));
        let resized = bilinear(90, 90).resize(image).unwrap();
        assert_eq!(resized.dimensions(), (90, 90));
    }

    #[test]
    fn uniform_input_stays_uniform() {
        let image = GrayImage::from_pixel(50, 50, Luma([128]));
        let resized = bilinear(90, 90).resize(image).unwrap();
        assert!(resized.pixels().all(|p| p.0[0].abs_diff(128) <= 1));
    }

    #[test]
    fn same_size_is_identity() {
        let image = GrayImage::from_fn(90, 90, |x, y| Luma([((x * 7) ^ (y * 3)) as u8]));
        let resized = bilinear(90, 90).resize(image.clone()).unwrap();
        assert_eq!(resized, image);
    }

    #[test]
    fn nearest_keeps_hard_edges() {
        let image = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        let resized = Resizer::new(4, 1, ResampleFilter::Nearest).resize(image).unwrap();
        assert!(resized.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn zero_target_is_rejected() {
        let image = GrayImage::from_pixel(4, 4, Luma([0]));
        let result = Resizer::new(0, 90, ResampleFilter::Bilinear).resize(image);
        assert!(matches!(result, Err(ImageError::EmptyBitmap(_))));
    }

    #[test]
    fn empty_source_is_rejected() {
        let result = bilinear(90, 90).resize(GrayImage::new(0, 0));
        assert!(matches!(result, Err(ImageError::EmptyBitmap(_))));
    }

    proptest! {
        #[test]
        fn output_always_matches_target(
            src_w in 1u32..120,
            src_h in 1u32..120,
            dst_w in 1u32..100,
            dst_h in 1u32..100,
        ) {
            let image = GrayImage::from_fn(src_w, src_h, |x, y| Luma([((x ^ y) % 256) as u8]));
            let resizer = bilinear(dst_w, dst_h);
            let once = resizer.resize(image).unwrap();
            prop_assert_eq!(once.dimensions(), (dst_w, dst_h));

            let twice = resizer.resize(once.clone()).unwrap();
            prop_assert_eq!(twice, once);
        }
    }
}
