//! Aviary - headless neuroevolution trainer for flappy-bird agents
//!
//! Ties the simulation core (`aviary-sim`) and the neural policies
//! (`aviary-neuro`) to configuration, sprite assets and GIF output.

pub mod assets;
pub mod config;
pub mod headless;

pub use assets::SpriteSheet;
pub use config::{AppConfig, AssetConfig, TrainingConfig};
pub use headless::{TrainingEnv, TrainingReport};
