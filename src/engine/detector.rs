//! SSD Face Detector
//!
//! Runs the ResNet-10 SSD face detection network over a 300x300 blob and
//! filters the detection tensor by confidence.

use anyhow::Result;
use image::{DynamicImage, GenericImageView};
use tracing::info;

use super::context::{InferenceContext, ModelKind};
use super::preprocess::{blob_from_image, DETECTOR_INPUT_SIZE};

/// Width of one row in the SSD detection tensor:
/// `[image_id, label, confidence, x1, y1, x2, y2]` with box coordinates
/// relative to the input image.
const DETECTION_ROW_LEN: usize = 7;

/// One accepted face detection, in pixel coordinates of the original
/// image. Coordinates are truncated to integers and clamped to the image.
#[derive(Debug, Clone)]
pub struct DetectionCandidate {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub confidence: f32,
}

impl DetectionCandidate {
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}

pub struct FaceDetector {
    confidence_threshold: f32,
}

impl FaceDetector {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
        }
    }

    /// Detect faces in an image of arbitrary size.
    pub fn detect(
        &self,
        context: &mut InferenceContext,
        image: &DynamicImage,
    ) -> Result<Vec<DetectionCandidate>> {
        let (orig_w, orig_h) = image.dimensions();

        let blob = blob_from_image(image, DETECTOR_INPUT_SIZE);
        let output = context.infer(ModelKind::FaceDetector, &blob)?;

        let candidates = parse_detections(&output, orig_w, orig_h, self.confidence_threshold);

        info!("Detected {} faces above threshold", candidates.len());

        Ok(candidates)
    }
}

/// Parse the flattened SSD detection tensor.
///
/// Rows with confidence at or below `threshold` are rejected (kept rows
/// satisfy a strict `confidence > threshold`). Relative coordinates in
/// [0, 1] are scaled by the original image size, truncated toward zero
/// and clamped to the image bounds.
pub fn parse_detections(
    output: &[f32],
    image_w: u32,
    image_h: u32,
    threshold: f32,
) -> Vec<DetectionCandidate> {
    let (w, h) = (image_w as f32, image_h as f32);
    let mut candidates = Vec::new();

    for row in output.chunks_exact(DETECTION_ROW_LEN) {
        let confidence = row[2];
        // Strict: a detection at exactly the threshold is rejected, and
        // a NaN score never passes.
        if !(confidence > threshold) {
            continue;
        }

        let x1 = (row[3] * w) as i32;
        let y1 = (row[4] * h) as i32;
        let x2 = (row[5] * w) as i32;
        let y2 = (row[6] * h) as i32;

        candidates.push(DetectionCandidate {
            x1: x1.clamp(0, image_w as i32),
            y1: y1.clamp(0, image_h as i32),
            x2: x2.clamp(0, image_w as i32),
            y2: y2.clamp(0, image_h as i32),
            confidence,
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(confidence: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> [f32; 7] {
        [0.0, 1.0, confidence, x1, y1, x2, y2]
    }

    #[test]
    fn test_relative_box_scaled_to_pixels() {
        let output = row(0.9, 0.1, 0.1, 0.5, 0.5);
        let candidates = parse_detections(&output, 1000, 800, 0.6);

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!((c.x1, c.y1, c.x2, c.y2), (100, 80, 500, 400));
        assert!((c.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut output = Vec::new();
        output.extend_from_slice(&row(0.6, 0.1, 0.1, 0.5, 0.5));
        output.extend_from_slice(&row(0.61, 0.1, 0.1, 0.5, 0.5));
        output.extend_from_slice(&row(0.59, 0.1, 0.1, 0.5, 0.5));

        let candidates = parse_detections(&output, 100, 100, 0.6);
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].confidence - 0.61).abs() < 1e-6);
    }

    #[test]
    fn test_no_detections_above_threshold() {
        let mut output = Vec::new();
        output.extend_from_slice(&row(0.2, 0.1, 0.1, 0.5, 0.5));
        output.extend_from_slice(&row(0.5, 0.3, 0.3, 0.6, 0.6));

        let candidates = parse_detections(&output, 640, 480, 0.6);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_coordinates_clamped_to_image() {
        let output = row(0.95, -0.1, -0.1, 1.2, 1.2);
        let candidates = parse_detections(&output, 640, 480, 0.6);

        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!((c.x1, c.y1, c.x2, c.y2), (0, 0, 640, 480));
    }

    #[test]
    fn test_nan_confidence_rejected() {
        let output = row(f32::NAN, 0.1, 0.1, 0.5, 0.5);
        let candidates = parse_detections(&output, 100, 100, 0.6);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_trailing_partial_row_ignored() {
        let mut output = row(0.9, 0.1, 0.1, 0.5, 0.5).to_vec();
        output.extend_from_slice(&[0.0, 0.0, 0.99]);

        let candidates = parse_detections(&output, 100, 100, 0.6);
        assert_eq!(candidates.len(), 1);
    }
}
