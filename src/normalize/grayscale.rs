//! 灰度转换：任意色彩位图 → 单通道亮度位图。
//!
//! 权重固定为 ITU-R BT.601（0.299 / 0.587 / 0.114），以 16 位定点整数计算，
//! 通道顺序固定为 R、G、B，透明通道直接忽略。

use image::{DynamicImage, GrayImage, Luma};

use super::source::DecodedBitmap;

const WEIGHT_R: u32 = 19_595;
const WEIGHT_G: u32 = 38_470;
const WEIGHT_B: u32 = 7_471;

/// 灰度转换器，无状态纯函数。
#[derive(Debug, Default, Clone, Copy)]
pub struct GrayscaleConverter;

impl GrayscaleConverter {
    /// 单个像素的亮度。
    #[inline]
    pub fn luma(r: u8, g: u8, b: u8) -> u8 {
        let y = WEIGHT_R * r as u32 + WEIGHT_G * g as u32 + WEIGHT_B * b as u32 + (1 << 15);
        (y >> 16) as u8
    }

    /// 转换整幅位图，输出尺寸与输入一致。
    ///
    /// 输入已是 8 位单通道时原样返回。
    pub fn convert(&self, bitmap: DecodedBitmap) -> GrayImage {
        match bitmap.into_inner() {
            DynamicImage::ImageLuma8(gray) => gray,
            DynamicImage::ImageLumaA8(gray_alpha) => {
                GrayImage::from_fn(gray_alpha.width(), gray_alpha.height(), |x, y| {
                    Luma([gray_alpha.get_pixel(x, y).0[0]])
                })
            }
            // 16 位单通道只需降位深
            other @ (DynamicImage::ImageLuma16(_) | DynamicImage::ImageLumaA16(_)) => {
                other.to_luma8()
            }
            other => {
                let rgb = other.to_rgb8();
                GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                    let [r, g, b] = rgb.get_pixel(x, y).0;
                    Luma([Self::luma(r, g, b)])
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn luma_hits_extremes_exactly() {
        assert_eq!(GrayscaleConverter::luma(0, 0, 0), 0);
        assert_eq!(GrayscaleConverter::luma(255, 255, 255), 255);
        assert_eq!(GrayscaleConverter::luma(128, 128, 128), 128);
    }

    #[test]
    fn luma_weights_green_heaviest() {
        let r = GrayscaleConverter::luma(255, 0, 0);
        let g = GrayscaleConverter::luma(0, 255, 0);
        let b = GrayscaleConverter::luma(0, 0, 255);
        assert_eq!(r, 76);
        assert_eq!(g, 150);
        assert_eq!(b, 29);
    }

    #[test]
    fn convert_keeps_dimensions() {
        let img = RgbImage::from_pixel(13, 7, Rgb([10, 200, 30]));
        let gray = GrayscaleConverter.convert(DecodedBitmap(DynamicImage::ImageRgb8(img)));
        assert_eq!(gray.dimensions(), (13, 7));
        assert!(gray.pixels().all(|p| p.0[0] == GrayscaleConverter::luma(10, 200, 30)));
    }

    #[test]
    fn convert_ignores_alpha() {
        let opaque = RgbaImage::from_pixel(3, 3, Rgba([200, 100, 50, 255]));
        let transparent = RgbaImage::from_pixel(3, 3, Rgba([200, 100, 50, 0]));

        let a = GrayscaleConverter.convert(DecodedBitmap(DynamicImage::ImageRgba8(opaque)));
        let b = GrayscaleConverter.convert(DecodedBitmap(DynamicImage::ImageRgba8(transparent)));
        assert_eq!(a, b);
    }

    #[test]
    fn convert_is_identity_on_grayscale() {
        let gray = GrayImage::from_fn(9, 5, |x, y| Luma([(x * 20 + y) as u8]));
        let once = GrayscaleConverter.convert(DecodedBitmap(DynamicImage::ImageLuma8(gray.clone())));
        assert_eq!(once, gray);

        let twice = GrayscaleConverter.convert(DecodedBitmap(DynamicImage::ImageLuma8(once.clone())));
        assert_eq!(twice, once);
    }

    #[test]
    fn convert_drops_alpha_of_luma_alpha() {
        let img = image::ImageBuffer::from_pixel(4, 2, LumaA([77u8, 3]));
        let gray = GrayscaleConverter.convert(DecodedBitmap(DynamicImage::ImageLumaA8(img)));
        assert!(gray.pixels().all(|p| p.0[0] == 77));
    }
}
