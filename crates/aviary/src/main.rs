use std::path::PathBuf;

use aviary::headless::{TrainingEnv, load_champion};
use aviary::AppConfig;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON configuration file (default: aviary.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations to train
    #[arg(long)]
    generations: Option<usize>,

    /// Population size per generation
    #[arg(long)]
    population: Option<usize>,

    /// Master seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for GIFs, champion and statistics
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory with bird1-3.png, pipe.png, base.png (and optional bg.png)
    #[arg(long)]
    sprites: Option<PathBuf>,

    /// Start from a champion.ron written by an earlier run
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Tick limit per generation
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Do not record any GIFs
    #[arg(long)]
    no_gif: bool,
}

impl Args {
    /// Command-line flags take priority over every configuration layer
    fn apply(&self, config: &mut AppConfig) {
        if let Some(generations) = self.generations {
            config.training.generations = generations;
        }
        if let Some(population) = self.population {
            config.evolution.population_size = population;
        }
        if let Some(seed) = self.seed {
            config.training.seed = Some(seed);
        }
        if let Some(output) = &self.output {
            config.training.output_dir = output.clone();
        }
        if let Some(sprites) = &self.sprites {
            config.assets.sprite_dir = Some(sprites.clone());
        }
        if let Some(max_ticks) = self.max_ticks {
            config.training.max_ticks = max_ticks;
        }
        if self.no_gif {
            config.training.gif_interval = 0;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    log::info!("Starting headless training");
    log::info!("  Generations: {}", config.training.generations);
    log::info!("  Population: {}", config.evolution.population_size);
    log::info!("  Output: {}", config.training.output_dir.display());

    let mut env = TrainingEnv::new(config);
    if let Some(path) = &args.resume {
        let champion = load_champion(path)?;
        log::info!(
            "Resuming from champion of generation {} (fitness {:.2})",
            champion.generation,
            champion.fitness
        );
        env = env.with_ancestor(champion.genome);
    }

    let report = env.run()?;
    log::info!(
        "Finished: {} generations, best score {}, stop reason {:?}",
        report.summary.generations,
        report.summary.best_score,
        report.summary.stop_reason
    );
    Ok(())
}
