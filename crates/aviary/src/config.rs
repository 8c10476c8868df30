//! Trainer configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `aviary.ron` in the working directory, or the file given with `--config`
//! 3. Environment variables prefixed with `AVIARY_`
//!
//! Example environment variable: `AVIARY_SIM__PIPE_GAP=180`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aviary_neuro::EvolutionConfig;
use aviary_sim::SimConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Main trainer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub sim: SimConfig,

    #[serde(default)]
    pub evolution: EvolutionConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub assets: AssetConfig,
}

/// Training run settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of generations to run
    pub generations: usize,
    /// Tick limit per generation (a policy that never dies ends the run)
    pub max_ticks: u64,
    /// Master seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Output directory for GIFs, champion and statistics
    pub output_dir: PathBuf,
    /// Record generation 1 and every Nth generation (0 = never)
    pub gif_interval: usize,
    /// Record every Nth tick
    pub gif_frame_stride: u64,
    /// Stop recording a generation after this many frames
    pub gif_max_frames: usize,
    /// Integer downscale applied to recorded frames
    pub gif_downscale: u32,
    /// Draw decision lines from each bird to the reference pipe
    pub draw_lines: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            generations: 50,
            max_ticks: 20_000,
            seed: None,
            output_dir: PathBuf::from("training_output"),
            gif_interval: 10,
            gif_frame_stride: 2,
            gif_max_frames: 300,
            gif_downscale: 2,
            draw_lines: true,
        }
    }
}

impl TrainingConfig {
    /// GIF playback rate that keeps recorded frames in real time
    pub fn gif_fps(&self, tick_rate: u32) -> u16 {
        let stride = self.gif_frame_stride.max(1) as u32;
        (tick_rate / stride).clamp(1, 100) as u16
    }
}

/// Sprite sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding bird1-3.png, pipe.png, base.png and optionally
    /// bg.png; procedural sprites are used when absent
    pub sprite_dir: Option<PathBuf>,
    /// Nearest-neighbour 2x upscale of loaded sprites
    pub scale2x: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            sprite_dir: None,
            scale2x: true,
        }
    }
}

impl AppConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `path` if given (must exist), otherwise `aviary.ron` (if exists)
    /// 3. Environment variables prefixed with `AVIARY_` (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to encode default configuration")?;

        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("aviary").format(FileFormat::Ron).required(false),
        };

        let config = Config::builder()
            // Layer 1: Compiled defaults
            .add_source(defaults)
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (AVIARY_SIM__PIPE_GAP, etc.)
            .add_source(Environment::with_prefix("AVIARY").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.sim.validate().context("Invalid simulation configuration")?;
        self.evolution
            .validate()
            .context("Invalid evolution configuration")?;
        if self.training.gif_downscale == 0 {
            anyhow::bail!("training.gif_downscale must be at least 1");
        }
        Ok(())
    }
}
