//! Detection pipeline
//!
//! Orchestrates one run: decode the chosen image, detect faces, classify
//! each accepted region, annotate, and write the fixed output file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::annotate::{Annotator, FaceAnnotation};
use crate::config::Config;
use crate::engine::preprocess::{crop_face, decode_image};
use crate::engine::{AgeGenderClassifier, FaceDetector, InferenceContext};

/// Summary of one pipeline run, for the status line.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub labels: Vec<String>,
    pub output_path: PathBuf,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn face_count(&self) -> usize {
        self.labels.len()
    }
}

pub struct Pipeline {
    context: InferenceContext,
    detector: FaceDetector,
    classifier: AgeGenderClassifier,
    annotator: Annotator,
    output_path: PathBuf,
}

impl Pipeline {
    pub fn new(context: InferenceContext, config: &Config) -> Result<Self> {
        let detector = FaceDetector::new(config.detection.confidence_threshold);
        let classifier = AgeGenderClassifier::new();
        let annotator = Annotator::new(
            &config.annotate.font_path,
            config.annotate.font_scale,
            config.annotate.stroke_width,
        )?;

        Ok(Self {
            context,
            detector,
            classifier,
            annotator,
            output_path: config.output.path.clone(),
        })
    }

    /// Run the full pipeline on one image file.
    ///
    /// Zero detected faces is not an error; the output is then an
    /// unannotated copy of the input. An empty crop skips that one face
    /// region and nothing else.
    pub fn process(&mut self, input: &Path) -> Result<RunReport> {
        let start = Instant::now();

        let data = std::fs::read(input)
            .with_context(|| format!("reading image {}", input.display()))?;
        let image = decode_image(&data).context("decoding input image")?;
        let mut canvas = image.to_rgb8();

        let candidates = self.detector.detect(&mut self.context, &image)?;

        let mut faces = Vec::new();
        for candidate in candidates {
            let Some(crop) = crop_face(&image, &candidate) else {
                debug!(
                    "Skipping empty crop at ({}, {})-({}, {})",
                    candidate.x1, candidate.y1, candidate.x2, candidate.y2
                );
                continue;
            };

            let prediction = self.classifier.classify(&mut self.context, &crop)?;
            faces.push(FaceAnnotation {
                label: prediction.label(),
                candidate,
            });
        }

        self.annotator.annotate(&mut canvas, &faces);

        canvas
            .save(&self.output_path)
            .with_context(|| format!("writing output {}", self.output_path.display()))?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "Processed {} in {}ms: {} face(s) annotated",
            input.display(),
            elapsed_ms,
            faces.len()
        );

        Ok(RunReport {
            labels: faces.into_iter().map(|f| f.label).collect(),
            output_path: self.output_path.clone(),
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_report_face_count() {
        let report = RunReport {
            labels: vec!["Male, (25-32)".to_string(), "Female, (4-6)".to_string()],
            output_path: PathBuf::from("output_pastel.jpg"),
            elapsed_ms: 12,
        };
        assert_eq!(report.face_count(), 2);
    }
}
