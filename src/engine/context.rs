//! Inference context
//!
//! Owns the three compiled OpenVINO networks for the lifetime of the
//! application. All models are loaded eagerly at startup; a missing or
//! malformed artifact aborts startup, there is no recovery path.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use ndarray::Array4;
use openvino::{CompiledModel, Core, ElementType, Shape, Tensor};
use tracing::info;

use crate::config::{InferenceConfig, ModelsConfig};

/// The three networks the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    FaceDetector,
    AgeClassifier,
    GenderClassifier,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::FaceDetector => "face_detector",
            ModelKind::AgeClassifier => "age_classifier",
            ModelKind::GenderClassifier => "gender_classifier",
        }
    }
}

/// Holds the compiled models. Single owner, constructed once at startup
/// and passed by mutable reference into each inference call; the GUI is
/// single-threaded so calls are never concurrent.
pub struct InferenceContext {
    face: CompiledModel,
    age: CompiledModel,
    gender: CompiledModel,
}

impl InferenceContext {
    /// Load and compile all three networks from their topology/weights
    /// artifact pairs. Fatal on any failure.
    pub fn load(models: &ModelsConfig, inference: &InferenceConfig) -> Result<Self> {
        let mut core = Core::new().context("initializing OpenVINO core")?;

        let face = compile(
            &mut core,
            &inference.device,
            &models.face_topology,
            &models.face_weights,
        )
        .context("loading face detection model")?;
        let age = compile(
            &mut core,
            &inference.device,
            &models.age_topology,
            &models.age_weights,
        )
        .context("loading age classification model")?;
        let gender = compile(
            &mut core,
            &inference.device,
            &models.gender_topology,
            &models.gender_weights,
        )
        .context("loading gender classification model")?;

        Ok(Self { face, age, gender })
    }

    /// Run one synchronous forward pass through the given network.
    ///
    /// The blob is a NCHW f32 tensor; the output tensor is returned
    /// flattened in row-major order.
    pub fn infer(&mut self, kind: ModelKind, blob: &Array4<f32>) -> Result<Vec<f32>> {
        let model = match kind {
            ModelKind::FaceDetector => &mut self.face,
            ModelKind::AgeClassifier => &mut self.age,
            ModelKind::GenderClassifier => &mut self.gender,
        };

        let mut request = model.create_infer_request()?;

        let (n, c, h, w) = blob.dim();
        let input_shape = Shape::new(&[n as i64, c as i64, h as i64, w as i64])?;
        let mut input = Tensor::new(ElementType::F32, &input_shape)?;

        let input_data = blob.as_slice().unwrap();
        unsafe {
            let tensor_data = input.get_raw_data_mut()?.as_mut_ptr() as *mut f32;
            std::ptr::copy_nonoverlapping(input_data.as_ptr(), tensor_data, input_data.len());
        }

        request.set_input_tensor(&input)?;
        request.infer()?;

        let output = request.get_output_tensor()?;
        let output_shape = output.get_shape()?;
        let output_len = output_shape.get_dimensions().iter().product::<i64>() as usize;

        let output_data: Vec<f32> = unsafe {
            let ptr = output.get_raw_data()?.as_ptr() as *const f32;
            std::slice::from_raw_parts(ptr, output_len).to_vec()
        };

        Ok(output_data)
    }
}

fn compile(
    core: &mut Core,
    device: &str,
    topology: &Path,
    weights: &Path,
) -> Result<CompiledModel> {
    let start = Instant::now();

    let topology_str = topology
        .to_str()
        .context("model topology path is not valid UTF-8")?;
    let weights_str = weights
        .to_str()
        .context("model weights path is not valid UTF-8")?;

    let model = core
        .read_model_from_file(topology_str, weights_str)
        .with_context(|| format!("reading model {}", topology.display()))?;
    let compiled = core
        .compile_model(&model, device.into())
        .with_context(|| format!("compiling model {}", topology.display()))?;

    info!("Loaded {} in {:?}", topology.display(), start.elapsed());

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_as_str() {
        assert_eq!(ModelKind::FaceDetector.as_str(), "face_detector");
        assert_eq!(ModelKind::AgeClassifier.as_str(), "age_classifier");
        assert_eq!(ModelKind::GenderClassifier.as_str(), "gender_classifier");
    }
}
