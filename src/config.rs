//! Application configuration

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub models: ModelsConfig,
    pub inference: InferenceConfig,
    pub detection: DetectionConfig,
    pub annotate: AnnotateConfig,
    pub output: OutputConfig,
    pub ui: UiConfig,
}

/// Topology/weights artifact pairs for the three networks.
///
/// All six files must exist at startup; a missing or unreadable artifact
/// is fatal.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub face_topology: PathBuf,
    pub face_weights: PathBuf,
    pub age_topology: PathBuf,
    pub age_weights: PathBuf,
    pub gender_topology: PathBuf,
    pub gender_weights: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    pub device: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Detections at or below this confidence are discarded (strict `>`).
    pub confidence_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotateConfig {
    pub font_path: PathBuf,
    pub font_scale: f32,
    pub stroke_width: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Fixed output path, overwritten on every run.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    /// Preview pane width; the annotated image is downscaled to fit.
    pub display_width: u32,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelsConfig {
                face_topology: PathBuf::from("models/res10_300x300_ssd.xml"),
                face_weights: PathBuf::from("models/res10_300x300_ssd.bin"),
                age_topology: PathBuf::from("models/age_net.xml"),
                age_weights: PathBuf::from("models/age_net.bin"),
                gender_topology: PathBuf::from("models/gender_net.xml"),
                gender_weights: PathBuf::from("models/gender_net.bin"),
            },
            inference: InferenceConfig {
                device: "CPU".to_string(),
            },
            detection: DetectionConfig {
                confidence_threshold: 0.6,
            },
            annotate: AnnotateConfig {
                font_path: PathBuf::from("assets/DejaVuSans.ttf"),
                font_scale: 28.0,
                stroke_width: 2,
            },
            output: OutputConfig {
                path: PathBuf::from("output_pastel.jpg"),
            },
            ui: UiConfig { display_width: 400 },
        }
    }
}
