//! Inference engine module
//!
//! OpenVINO-backed forward passes for the face detection and attribute
//! classification networks, plus the blob preprocessing they share.

pub mod attribute;
pub mod context;
pub mod detector;
pub mod preprocess;

pub use attribute::AgeGenderClassifier;
pub use context::InferenceContext;
pub use detector::FaceDetector;
