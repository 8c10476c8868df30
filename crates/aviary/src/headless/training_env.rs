//! Training environment for flappy-bird neuroevolution
//!
//! Wires the population, the generation driver and the GIF recorder
//! together, then writes the champion and the run statistics.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aviary_neuro::{Champion, GenerationStats, Genome, Population};
use aviary_sim::{RunSummary, SpriteSet, TickBudget, run_generations_with};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use super::GenerationRecorder;
use crate::assets::SpriteSheet;
use crate::config::AppConfig;

pub const CHAMPION_FILE: &str = "champion.ron";
pub const REPORT_FILE: &str = "report.ron";
pub const GIF_DIR: &str = "gifs";

/// Everything a finished run leaves behind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Master seed; rerunning with it reproduces the run
    pub seed: u64,
    pub summary: RunSummary,
    pub champion: Option<Champion>,
    pub history: Vec<GenerationStats>,
    pub gifs: Vec<PathBuf>,
}

pub struct TrainingEnv {
    config: AppConfig,
    ancestor: Option<Genome>,
}

impl TrainingEnv {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ancestor: None,
        }
    }

    /// Seed the first generation from a saved genome instead of at random
    pub fn with_ancestor(mut self, genome: Genome) -> Self {
        self.ancestor = Some(genome);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn progress_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    /// Run the training loop
    pub fn run(&self) -> Result<TrainingReport> {
        let config = &self.config;
        config.validate()?;

        let output_dir = &config.training.output_dir;
        let gif_dir = output_dir.join(GIF_DIR);
        fs::create_dir_all(&gif_dir)
            .with_context(|| format!("Failed to create {}", gif_dir.display()))?;

        let sheet = match &config.assets.sprite_dir {
            Some(dir) => SpriteSheet::load(dir, config.assets.scale2x)?,
            None => SpriteSheet::procedural(&SpriteSet::procedural()),
        };
        let masks = sheet.masks()?;

        let seed = config.training.seed.unwrap_or_else(rand::random);
        let mut master = Xoshiro256StarStar::seed_from_u64(seed);
        let population_rng = Xoshiro256StarStar::seed_from_u64(master.next_u64());
        let mut population = match &self.ancestor {
            Some(ancestor) => {
                Population::from_ancestor(config.evolution.clone(), ancestor.clone(), population_rng)
            }
            None => Population::new(config.evolution.clone(), population_rng),
        }
        .context("Failed to create population")?;

        let viewport = (
            config.sim.field_width as usize,
            config.sim.field_height as usize,
        );
        let recorder = GenerationRecorder::new(
            sheet,
            viewport,
            &config.training,
            config.sim.tick_rate,
            &gif_dir,
        );
        let mut renderer = TickBudget::new(recorder, config.training.max_ticks);

        let pb = ProgressBar::new(config.training.generations as u64);
        pb.set_style(Self::progress_style());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.println(format!(
            "Starting training: {} generations, {} population, seed {}",
            config.training.generations,
            population.len(),
            seed
        ));

        let summary = run_generations_with(
            &mut population,
            &mut renderer,
            &config.sim,
            &masks,
            &mut master,
            config.training.generations,
            |outcome| {
                pb.println(format!(
                    "Gen {}: score={}, ticks={}, best={:.2}, avg={:.2}",
                    outcome.generation,
                    outcome.score,
                    outcome.ticks,
                    outcome.best().map_or(0.0, |r| r.fitness),
                    outcome.mean_fitness()
                ));
                pb.set_message(format!("score {}", outcome.score));
                pb.inc(1);
            },
        );

        let gifs = renderer.into_inner().finish()?;
        let summary = summary.context("Training run failed")?;
        pb.finish_with_message(format!(
            "done after {} generations ({:?})",
            summary.generations, summary.stop_reason
        ));

        let report = TrainingReport {
            seed,
            summary,
            champion: population.champion().cloned(),
            history: population.history().to_vec(),
            gifs,
        };

        if let Some(champion) = &report.champion {
            let path = output_dir.join(CHAMPION_FILE);
            write_ron(&path, champion)?;
            log::info!(
                "Champion from generation {} (fitness {:.2}) saved to {}",
                champion.generation,
                champion.fitness,
                path.display()
            );
        }
        write_ron(&output_dir.join(REPORT_FILE), &report)?;

        Ok(report)
    }
}

/// Load a champion written by a previous run
pub fn load_champion(path: &Path) -> Result<Champion> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    ron::from_str(&text).with_context(|| format!("Failed to parse champion {}", path.display()))
}

fn write_ron<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .context("Failed to serialize RON")?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aviary_sim::StopReason;

    fn quick_config(dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.evolution.population_size = 6;
        config.evolution.fitness_threshold = None;
        config.training.generations = 2;
        config.training.max_ticks = 400;
        config.training.seed = Some(5);
        config.training.output_dir = dir.to_path_buf();
        config.training.gif_interval = 0;
        config
    }

    #[test]
    fn test_run_writes_champion_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = TrainingEnv::new(quick_config(dir.path())).run().unwrap();

        assert_eq!(report.seed, 5);
        assert_eq!(report.history.len(), report.summary.generations);
        assert!(report.gifs.is_empty());

        let champion = load_champion(&dir.path().join(CHAMPION_FILE)).unwrap();
        assert_eq!(Some(&champion), report.champion.as_ref());
        assert!(dir.path().join(REPORT_FILE).exists());
    }

    #[test]
    fn test_tick_budget_stops_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quick_config(dir.path());
        config.training.max_ticks = 3;
        let report = TrainingEnv::new(config).run().unwrap();

        assert_eq!(report.summary.stop_reason, StopReason::Aborted);
        assert_eq!(report.summary.generations, 1);
        assert_eq!(report.history[0].ticks, 3);
    }

    #[test]
    fn test_resume_from_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let ancestor = Genome::from_weights(0, vec![0.0, 0.0, 0.0, -1.0]).unwrap();
        let report = TrainingEnv::new(quick_config(dir.path()))
            .with_ancestor(ancestor)
            .run()
            .unwrap();
        assert!(report.champion.is_some());
    }
}
