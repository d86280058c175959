//! Pastel age & gender detection demo library

pub mod annotate;
pub mod app;
pub mod config;
pub mod engine;
pub mod pipeline;
pub mod utils;

pub use config::Config;
