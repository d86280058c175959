//! Annotator
//!
//! Draws the face bounding boxes and the "{gender}, {age}" label chips
//! onto the original image.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::debug;

use crate::engine::detector::DetectionCandidate;

/// Lavender, used for box strokes and label text.
pub const BOX_COLOR: Rgb<u8> = Rgb([147, 112, 219]);

/// Pale pink, used for the label chip fill.
pub const CHIP_COLOR: Rgb<u8> = Rgb([255, 228, 250]);

/// Padding added around the rendered text inside the chip.
const CHIP_PADDING: i32 = 10;

/// Inset of the text from the chip's top-left corner.
const TEXT_INSET: i32 = 5;

/// Vertical distance between the face box and the chip.
const CHIP_OFFSET: i32 = 30;

/// Minimum clearance from the top edge for an above-the-box chip.
const CHIP_TOP_MARGIN: i32 = 10;

/// One face to draw: the accepted detection plus its label text.
#[derive(Debug, Clone)]
pub struct FaceAnnotation {
    pub candidate: DetectionCandidate,
    pub label: String,
}

/// Placement of one label chip and its text, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    pub chip_x1: i32,
    pub chip_y1: i32,
    pub chip_x2: i32,
    pub chip_y2: i32,
    pub text_x: i32,
    pub text_y: i32,
}

/// Compute where the label chip goes for a face box.
///
/// The chip sits above the box unless the box is too close to the top
/// edge, in which case it drops below the box's top at a fixed offset.
/// The chip is sized to the rendered text plus padding; the text is drawn
/// inset from the chip's corner. Measurement and drawing must use the
/// same font parameters or the chip will not fit the text.
pub fn label_layout(box_x1: i32, box_y1: i32, text_w: i32, text_h: i32) -> LabelLayout {
    let chip_y1 = if box_y1 - CHIP_OFFSET >= CHIP_TOP_MARGIN {
        box_y1 - CHIP_OFFSET
    } else {
        box_y1 + CHIP_OFFSET
    };

    LabelLayout {
        chip_x1: box_x1,
        chip_y1,
        chip_x2: box_x1 + text_w + CHIP_PADDING,
        chip_y2: chip_y1 + text_h + CHIP_PADDING,
        text_x: box_x1 + TEXT_INSET,
        text_y: chip_y1 + TEXT_INSET,
    }
}

/// Draw a hollow rectangle with the given stroke width, expanding
/// outward from the base box.
pub fn draw_bounding_box(image: &mut RgbImage, candidate: &DetectionCandidate, stroke: u32) {
    if candidate.width() <= 0 || candidate.height() <= 0 {
        return;
    }

    let base = Rect::at(candidate.x1, candidate.y1)
        .of_size(candidate.width() as u32, candidate.height() as u32);
    for i in 0..stroke {
        let offset = Rect::at(base.left() - i as i32, base.top() - i as i32)
            .of_size(base.width() + 2 * i, base.height() + 2 * i);
        draw_hollow_rect_mut(image, offset, BOX_COLOR);
    }
}

pub struct Annotator {
    font: FontVec,
    font_scale: f32,
    stroke_width: u32,
}

impl Annotator {
    /// Load the label font from disk. A missing or invalid font file is a
    /// startup failure, same as a missing model artifact.
    pub fn new(font_path: &Path, font_scale: f32, stroke_width: u32) -> Result<Self> {
        let font_data = std::fs::read(font_path)
            .with_context(|| format!("reading label font {}", font_path.display()))?;
        let font = FontVec::try_from_vec(font_data)
            .with_context(|| format!("parsing label font {}", font_path.display()))?;

        Ok(Self::with_font(font, font_scale, stroke_width))
    }

    pub fn with_font(font: FontVec, font_scale: f32, stroke_width: u32) -> Self {
        Self {
            font,
            font_scale,
            stroke_width,
        }
    }

    /// Draw every annotation onto the image. An empty slice leaves the
    /// image untouched.
    pub fn annotate(&self, image: &mut RgbImage, faces: &[FaceAnnotation]) {
        let scale = PxScale::from(self.font_scale);

        for face in faces {
            draw_bounding_box(image, &face.candidate, self.stroke_width);

            let (text_w, text_h) = text_size(scale, &self.font, &face.label);
            let layout = label_layout(
                face.candidate.x1,
                face.candidate.y1,
                text_w as i32,
                text_h as i32,
            );

            let chip_w = (layout.chip_x2 - layout.chip_x1) as u32;
            let chip_h = (layout.chip_y2 - layout.chip_y1) as u32;
            let chip = Rect::at(layout.chip_x1, layout.chip_y1).of_size(chip_w, chip_h);
            draw_filled_rect_mut(image, chip, CHIP_COLOR);

            draw_text_mut(
                image,
                BOX_COLOR,
                layout.text_x,
                layout.text_y,
                scale,
                &self.font,
                &face.label,
            );

            debug!(
                "Annotated \"{}\" at ({}, {})",
                face.label, face.candidate.x1, face.candidate.y1
            );
        }
    }
}
