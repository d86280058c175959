//! Pastel Age & Gender Detector
//!
//! Desktop demo: pick an image, detect faces with an SSD network, classify
//! age and gender per face, and show the annotated result.

use anyhow::Result;
use eframe::egui;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pastelface::app::PastelApp;
use pastelface::config::Config;
use pastelface::engine::InferenceContext;
use pastelface::pipeline::Pipeline;

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!(
        "Starting Pastel Age & Gender Detector v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::load(Config::default_path()).unwrap_or_else(|e| {
        info!("Using default config ({})", e);
        Config::default()
    });

    info!("Configuration loaded:");
    info!("  Device: {}", config.inference.device);
    info!(
        "  Confidence threshold: {}",
        config.detection.confidence_threshold
    );
    info!("  Output: {}", config.output.path.display());

    // All three models load up front; any missing artifact is fatal.
    let context = InferenceContext::load(&config.models, &config.inference)?;
    let pipeline = Pipeline::new(context, &config)?;

    info!("Models loaded, opening window");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([460.0, 260.0]),
        ..Default::default()
    };

    let ui_config = config.ui.clone();
    eframe::run_native(
        "Pastel Age & Gender Detector",
        options,
        Box::new(move |_cc| Ok(Box::new(PastelApp::new(pipeline, &ui_config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))?;

    info!("Goodbye!");
    Ok(())
}
