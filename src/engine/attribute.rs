//! Age & gender classification
//!
//! Runs the two attribute networks over one cropped face region and maps
//! the arg-max class index through the fixed label tables. The index
//! order of the tables is a contract with the model files; the bindings
//! below are pinned by tests.

use anyhow::Result;
use image::DynamicImage;
use tracing::debug;

use super::context::{InferenceContext, ModelKind};
use super::preprocess::{blob_from_image, CLASSIFIER_INPUT_SIZE};
use crate::utils::math::{argmax, softmax};

/// Gender classification result.
///
/// Gender network output order: 0 = male, 1 = female.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Gender::Male,
            _ => Gender::Female,
        }
    }
}

/// Age bracket classification result.
///
/// Age network output order (8 classes, non-contiguous brackets):
/// 0: (0-2), 1: (4-6), 2: (8-12), 3: (15-20),
/// 4: (25-32), 5: (38-43), 6: (48-53), 7: (60-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    Age0To2,
    Age4To6,
    Age8To12,
    Age15To20,
    Age25To32,
    Age38To43,
    Age48To53,
    Age60To100,
}

impl AgeBracket {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBracket::Age0To2 => "(0-2)",
            AgeBracket::Age4To6 => "(4-6)",
            AgeBracket::Age8To12 => "(8-12)",
            AgeBracket::Age15To20 => "(15-20)",
            AgeBracket::Age25To32 => "(25-32)",
            AgeBracket::Age38To43 => "(38-43)",
            AgeBracket::Age48To53 => "(48-53)",
            AgeBracket::Age60To100 => "(60-100)",
        }
    }

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => AgeBracket::Age0To2,
            1 => AgeBracket::Age4To6,
            2 => AgeBracket::Age8To12,
            3 => AgeBracket::Age15To20,
            4 => AgeBracket::Age25To32,
            5 => AgeBracket::Age38To43,
            6 => AgeBracket::Age48To53,
            _ => AgeBracket::Age60To100,
        }
    }
}

/// Combined prediction for one face region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub gender: Gender,
    pub age: AgeBracket,
}

impl Prediction {
    /// Label drawn inside the chip, e.g. `"Female, (25-32)"`.
    pub fn label(&self) -> String {
        format!("{}, {}", self.gender.as_str(), self.age.as_str())
    }
}

pub struct AgeGenderClassifier;

impl AgeGenderClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one cropped face region.
    ///
    /// The top class of each network is always accepted; there is no
    /// confidence thresholding on attribute predictions.
    pub fn classify(
        &self,
        context: &mut InferenceContext,
        face: &DynamicImage,
    ) -> Result<Prediction> {
        // One blob serves both networks.
        let blob = blob_from_image(face, CLASSIFIER_INPUT_SIZE);

        let gender_out = context.infer(ModelKind::GenderClassifier, &blob)?;
        let gender_idx = argmax(&gender_out);
        let gender = Gender::from_index(gender_idx);

        let age_out = context.infer(ModelKind::AgeClassifier, &blob)?;
        let age_idx = argmax(&age_out);
        let age = AgeBracket::from_index(age_idx);

        debug!(
            "Attributes: {} (p={:.3}), {} (p={:.3})",
            gender.as_str(),
            softmax(&gender_out)[gender_idx],
            age.as_str(),
            softmax(&age_out)[age_idx],
        );

        Ok(Prediction { gender, age })
    }
}

impl Default for AgeGenderClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_index_binding() {
        assert_eq!(Gender::from_index(0), Gender::Male);
        assert_eq!(Gender::from_index(1), Gender::Female);
        assert_eq!(Gender::Male.as_str(), "Male");
        assert_eq!(Gender::Female.as_str(), "Female");
    }

    #[test]
    fn test_age_index_binding() {
        assert_eq!(AgeBracket::from_index(0).as_str(), "(0-2)");
        assert_eq!(AgeBracket::from_index(1).as_str(), "(4-6)");
        assert_eq!(AgeBracket::from_index(2).as_str(), "(8-12)");
        assert_eq!(AgeBracket::from_index(3).as_str(), "(15-20)");
        assert_eq!(AgeBracket::from_index(4).as_str(), "(25-32)");
        assert_eq!(AgeBracket::from_index(5).as_str(), "(38-43)");
        assert_eq!(AgeBracket::from_index(6).as_str(), "(48-53)");
        assert_eq!(AgeBracket::from_index(7).as_str(), "(60-100)");
    }

    #[test]
    fn test_prediction_label_format() {
        let prediction = Prediction {
            gender: Gender::Female,
            age: AgeBracket::Age25To32,
        };
        assert_eq!(prediction.label(), "Female, (25-32)");
    }
}
