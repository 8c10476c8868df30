//! Headless training for flappy-bird agents
//!
//! This module runs neuroevolution offline without a window:
//! - Pixel buffer rendering for GIF capture
//! - Per-generation GIF recording
//! - The training loop writing champion and statistics

mod gif_capture;
mod pixel_renderer;
mod recorder;
mod training_env;

pub use gif_capture::GifCapture;
pub use pixel_renderer::PixelRenderer;
pub use recorder::GenerationRecorder;
pub use training_env::{
    CHAMPION_FILE, GIF_DIR, REPORT_FILE, TrainingEnv, TrainingReport, load_champion,
};
