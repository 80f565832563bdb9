//! # 裁边模块
//!
//! ## 设计思路
//!
//! 二维码截图通常带有大片纯色留白，直接缩放会让模块被“稀释”。
//! 这里先找到包围主体的最小矩形，再交给缩放阶段。
//!
//! ## 实现思路
//!
//! 1. 背景值取左上角像素；四角不一致时仍以左上角为准（记录 debug 日志）
//! 2. 从四条边分别向内扫描：整行/整列都落在容差内即视为边框，边界前移
//! 3. 四个边界相互独立，任一方向扫穿（整幅图都是背景）时返回原图
//! 4. 否则返回 `[x0, x1) x [y0, y1)` 区域

use image::{GrayImage, imageops};

use super::config::BORDER_TOLERANCE;
use super::source::CropBox;

/// 边框裁剪器，无状态纯函数。
#[derive(Debug, Clone, Copy)]
pub struct BorderCropper {
    tolerance: u8,
}

impl Default for BorderCropper {
    fn default() -> Self {
        Self::new(BORDER_TOLERANCE)
    }
}

impl BorderCropper {
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    /// 背景亮度：左上角像素值。
    pub fn background(&self, image: &GrayImage) -> u8 {
        let (width, height) = image.dimensions();
        let top_left = image.get_pixel(0, 0).0[0];
        let corners = [
            image.get_pixel(width - 1, 0).0[0],
            image.get_pixel(0, height - 1).0[0],
            image.get_pixel(width - 1, height - 1).0[0],
        ];

        if corners.iter().any(|&c| !self.is_background(c, top_left)) {
            log::debug!(
                "四角背景不一致：左上={} 其余={:?}，以左上角为准",
                top_left,
                corners
            );
        }

        top_left
    }

    #[inline]
    fn is_background(&self, value: u8, background: u8) -> bool {
        value.abs_diff(background) <= self.tolerance
    }

    fn row_is_border(&self, image: &GrayImage, y: u32, background: u8) -> bool {
        (0..image.width()).all(|x| self.is_background(image.get_pixel(x, y).0[0], background))
    }

    fn column_is_border(&self, image: &GrayImage, x: u32, background: u8) -> bool {
        (0..image.height()).all(|y| self.is_background(image.get_pixel(x, y).0[0], background))
    }

    /// 计算裁边区域。
    ///
    /// 整幅图都是背景时返回覆盖全图的区域，而不是空区域。
    pub fn find_crop_box(&self, image: &GrayImage) -> CropBox {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return CropBox::full(width, height);
        }

        let background = self.background(image);

        let mut y0 = 0;
        while y0 < height && self.row_is_border(image, y0, background) {
            y0 += 1;
        }

        let mut y1 = height;
        while y1 > 0 && self.row_is_border(image, y1 - 1, background) {
            y1 -= 1;
        }

        let mut x0 = 0;
        while x0 < width && self.column_is_border(image, x0, background) {
            x0 += 1;
        }

        let mut x1 = width;
        while x1 > 0 && self.column_is_border(image, x1 - 1, background) {
            x1 -= 1;
        }

        if x0 >= x1 || y0 >= y1 {
            return CropBox::full(width, height);
        }

        CropBox { x0, y0, x1, y1 }
    }

    /// 裁掉均匀边框。
    pub fn crop(&self, image: GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let crop_box = self.find_crop_box(&image);

        if crop_box.is_full(width, height) {
            log::debug!("未检测到边框，保持 {}x{}", width, height);
            return image;
        }

        log::debug!(
            "裁边：{}x{} -> [{}, {}, {}, {})",
            width,
            height,
            crop_box.x0,
            crop_box.y0,
            crop_box.x1,
            crop_box.y1
        );

        imageops::crop_imm(
            &image,
            crop_box.x0,
            crop_box.y0,
            crop_box.width(),
            crop_box.height(),
        )
        .to_image()
    }
}
