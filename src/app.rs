//! Interactive shell
//!
//! One window, one "Choose Image" button, one status label, one preview
//! pane. The pipeline runs synchronously on the interaction thread; the
//! window blocks for the duration of one inference pass.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use eframe::egui;
use tracing::warn;

use crate::config::UiConfig;
use crate::pipeline::{Pipeline, RunReport};
use crate::utils::image::resize_for_display;

const STATUS_COLOR: egui::Color32 = egui::Color32::from_rgb(209, 126, 165);
const IDLE_PROMPT: &str = "Upload a photo to bloom predictions";

/// Shell states. Processing is entered when the user picks a file and
/// left implicitly once the run completes.
enum ShellState {
    Idle,
    Processing(PathBuf),
}

pub struct PastelApp {
    pipeline: Pipeline,
    display_width: u32,
    state: ShellState,
    status: String,
    preview: Option<egui::TextureHandle>,
}

impl PastelApp {
    pub fn new(pipeline: Pipeline, ui_config: &UiConfig) -> Self {
        Self {
            pipeline,
            display_width: ui_config.display_width,
            state: ShellState::Idle,
            status: IDLE_PROMPT.to_string(),
            preview: None,
        }
    }

    fn choose_image(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .add_filter("Image Files", &["jpg", "jpeg", "png"])
            .pick_file();

        if let Some(path) = picked {
            self.state = ShellState::Processing(path);
            self.status = "Processing...".to_string();
            // Schedule the run for the top of the next frame.
            ctx.request_repaint();
        }
    }

    fn run_pipeline(&mut self, ctx: &egui::Context, input: PathBuf) {
        match self.pipeline.process(&input) {
            Ok(report) => {
                self.status = status_line(&report);
                if let Err(e) = self.refresh_preview(ctx, &report) {
                    warn!("Preview failed: {e:#}");
                    self.status = format!("Saved {}, but preview failed", report.output_path.display());
                }
            }
            Err(e) => {
                warn!("Pipeline failed for {}: {e:#}", input.display());
                self.status = format!("Could not process image: {e}");
            }
        }
        self.state = ShellState::Idle;
    }

    /// Reload the saved output, downscale it for the preview pane and
    /// resize the window to fit.
    fn refresh_preview(&mut self, ctx: &egui::Context, report: &RunReport) -> Result<()> {
        let output = image::open(&report.output_path)
            .with_context(|| format!("reloading {}", report.output_path.display()))?;
        let display = resize_for_display(&output, self.display_width);

        let rgb = display.to_rgb8();
        let size = [rgb.width() as usize, rgb.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, rgb.as_raw());
        let texture = ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR);

        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
            rgb.width() as f32 + 50.0,
            rgb.height() as f32 + 150.0,
        )));

        self.preview = Some(texture);
        Ok(())
    }
}

impl eframe::App for PastelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // A pending run from last frame's pick executes here, before any
        // widgets are laid out. It blocks the interaction thread for the
        // duration of one inference pass; there is no progress indicator.
        if let ShellState::Processing(path) = std::mem::replace(&mut self.state, ShellState::Idle) {
            self.run_pipeline(ctx, path);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new(&self.status)
                        .color(STATUS_COLOR)
                        .strong(),
                );
                ui.add_space(10.0);

                if ui.button("Choose Image").clicked() {
                    self.choose_image(ctx);
                }
                ui.add_space(10.0);

                if let Some(texture) = &self.preview {
                    ui.image(texture);
                }
            });
        });
    }
}

fn status_line(report: &RunReport) -> String {
    if report.labels.is_empty() {
        format!(
            "No faces found, saved unannotated copy to {}",
            report.output_path.display()
        )
    } else {
        format!(
            "{} face(s) in {}ms: {}",
            report.face_count(),
            report.elapsed_ms,
            report.labels.join(" | ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_with_faces() {
        let report = RunReport {
            labels: vec!["Male, (25-32)".to_string()],
            output_path: PathBuf::from("output_pastel.jpg"),
            elapsed_ms: 42,
        };
        assert_eq!(status_line(&report), "1 face(s) in 42ms: Male, (25-32)");
    }

    #[test]
    fn test_status_line_without_faces() {
        let report = RunReport {
            labels: vec![],
            output_path: PathBuf::from("output_pastel.jpg"),
            elapsed_ms: 42,
        };
        assert!(status_line(&report).starts_with("No faces found"));
    }
}
