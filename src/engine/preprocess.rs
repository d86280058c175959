//! Image preprocessing for the detection and classification networks

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;
use anyhow::Result;

use super::detector::DetectionCandidate;

/// Input size of the SSD face detection network.
pub const DETECTOR_INPUT_SIZE: (u32, u32) = (300, 300);

/// Input size of the age and gender classification networks.
pub const CLASSIFIER_INPUT_SIZE: (u32, u32) = (227, 227);

/// Per-channel means in BGR order, subtracted during blob construction.
/// All three Caffe networks were trained with these constants.
pub const MEAN_BGR: [f32; 3] = [104.0, 117.0, 123.0];

/// Build a normalized NCHW blob from an image.
///
/// The image is resized exactly to `size` (no aspect preservation, no
/// letterboxing), channels are laid out in BGR order to match the
/// BGR-trained networks, and the fixed per-channel means are subtracted.
/// There is no scale factor.
pub fn blob_from_image(image: &DynamicImage, size: (u32, u32)) -> Array4<f32> {
    let (target_w, target_h) = size;
    let resized = image.resize_exact(target_w, target_h, FilterType::Lanczos3);
    let rgb = resized.to_rgb8();

    let mut blob = Array4::<f32>::zeros((1, 3, target_h as usize, target_w as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (r, g, b) = (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32);
        blob[[0, 0, y as usize, x as usize]] = b - MEAN_BGR[0];
        blob[[0, 1, y as usize, x as usize]] = g - MEAN_BGR[1];
        blob[[0, 2, y as usize, x as usize]] = r - MEAN_BGR[2];
    }

    blob
}

/// Crop a face region out of the image, clamped to image bounds.
///
/// Returns `None` when the clamped region has no area; callers skip such
/// detections without reporting an error.
pub fn crop_face(image: &DynamicImage, candidate: &DetectionCandidate) -> Option<DynamicImage> {
    let (img_w, img_h) = image.dimensions();

    let x1 = candidate.x1.clamp(0, img_w as i32) as u32;
    let y1 = candidate.y1.clamp(0, img_h as i32) as u32;
    let x2 = candidate.x2.clamp(0, img_w as i32) as u32;
    let y2 = candidate.y2.clamp(0, img_h as i32) as u32;

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    Some(image.crop_imm(x1, y1, x2 - x1, y2 - y1))
}

/// Decode image bytes with EXIF orientation handling.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(data)?;
    Ok(apply_exif_orientation(data, image))
}

/// Apply EXIF orientation to correct image rotation.
/// Phone cameras often store the orientation as a tag instead of
/// rotating the pixels.
fn apply_exif_orientation(data: &[u8], image: DynamicImage) -> DynamicImage {
    use std::io::Cursor;

    let orientation = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif_data) => exif_data
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(1) as u8,
        Err(_) => 1,
    };

    match orientation {
        1 => image,
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid_image(w: u32, h: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(color)))
    }

    #[test]
    fn test_blob_shape() {
        let image = solid_image(640, 480, [0, 0, 0]);
        let blob = blob_from_image(&image, DETECTOR_INPUT_SIZE);
        assert_eq!(blob.dim(), (1, 3, 300, 300));

        let blob = blob_from_image(&image, CLASSIFIER_INPUT_SIZE);
        assert_eq!(blob.dim(), (1, 3, 227, 227));
    }

    #[test]
    fn test_blob_mean_subtraction_bgr_order() {
        // RGB (10, 20, 30) => channel 0 holds B - 104, channel 1 G - 117,
        // channel 2 R - 123.
        let image = solid_image(8, 8, [10, 20, 30]);
        let blob = blob_from_image(&image, (8, 8));

        assert!((blob[[0, 0, 4, 4]] - (30.0 - 104.0)).abs() < 1e-6);
        assert!((blob[[0, 1, 4, 4]] - (20.0 - 117.0)).abs() < 1e-6);
        assert!((blob[[0, 2, 4, 4]] - (10.0 - 123.0)).abs() < 1e-6);
    }

    #[test]
    fn test_crop_face_clamps_to_bounds() {
        let image = solid_image(100, 100, [0, 0, 0]);
        let candidate = DetectionCandidate {
            x1: -20,
            y1: 50,
            x2: 150,
            y2: 120,
            confidence: 0.9,
        };

        let crop = crop_face(&image, &candidate).unwrap();
        assert_eq!(crop.dimensions(), (100, 50));
    }

    #[test]
    fn test_crop_face_empty_region_is_skipped() {
        let image = solid_image(100, 100, [0, 0, 0]);

        let degenerate = DetectionCandidate {
            x1: 40,
            y1: 40,
            x2: 40,
            y2: 80,
            confidence: 0.9,
        };
        assert!(crop_face(&image, &degenerate).is_none());

        // Entirely outside the image: clamps to zero area.
        let outside = DetectionCandidate {
            x1: 200,
            y1: 200,
            x2: 300,
            y2: 300,
            confidence: 0.9,
        };
        assert!(crop_face(&image, &outside).is_none());
    }
}
