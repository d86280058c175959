//! Image utility functions

use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Proportionally downscale to the display width, preserving aspect
/// ratio. Images already narrower than the display are left alone.
pub fn resize_for_display(image: &DynamicImage, display_width: u32) -> DynamicImage {
    let (w, h) = image.dimensions();
    if w <= display_width {
        return image.clone();
    }

    let ratio = display_width as f32 / w as f32;
    let new_height = (h as f32 * ratio) as u32;
    image.resize_exact(display_width, new_height.max(1), FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([128, 128, 128])))
    }

    #[test]
    fn test_wide_image_downscaled_proportionally() {
        let resized = resize_for_display(&solid(800, 600), 400);
        assert_eq!(resized.dimensions(), (400, 300));
    }

    #[test]
    fn test_narrow_image_untouched() {
        let resized = resize_for_display(&solid(300, 200), 400);
        assert_eq!(resized.dimensions(), (300, 200));
    }
}
