//! Multi-generation training loop
//!
//! Pulls a population from the provider, runs the generation to completion
//! and feeds the outcome back, until the generation limit, convergence or an
//! abort.

use rand::RngCore;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::evaluator::{EndReason, GenerationEvaluator, GenerationOutcome};
use crate::mask::SpriteSet;
use crate::policy::PolicyProvider;
use crate::render::Renderer;

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    GenerationLimit,
    Converged,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Generations evaluated (including an aborted one)
    pub generations: usize,
    pub best_fitness: Option<f32>,
    pub best_score: u32,
    pub stop_reason: StopReason,
}

impl RunSummary {
    fn record(&mut self, outcome: &GenerationOutcome) {
        self.generations += 1;
        self.best_score = self.best_score.max(outcome.score);
        if let Some(best) = outcome.best() {
            self.best_fitness = Some(match self.best_fitness {
                Some(current) => current.max(best.fitness),
                None => best.fitness,
            });
        }
    }
}

/// Run up to `max_generations` generations.
///
/// Generations are numbered from 1. Every generation gets its own gap
/// sequence drawn from a generator seeded by `rng`.
pub fn run_generations<P, R>(
    provider: &mut P,
    renderer: &mut R,
    config: &SimConfig,
    sprites: &SpriteSet,
    rng: &mut dyn RngCore,
    max_generations: usize,
) -> Result<RunSummary, SimError>
where
    P: PolicyProvider,
    R: Renderer,
{
    run_generations_with(
        provider,
        renderer,
        config,
        sprites,
        rng,
        max_generations,
        |_| {},
    )
}

/// Like [`run_generations`], calling `on_outcome` after every generation
pub fn run_generations_with<P, R>(
    provider: &mut P,
    renderer: &mut R,
    config: &SimConfig,
    sprites: &SpriteSet,
    rng: &mut dyn RngCore,
    max_generations: usize,
    mut on_outcome: impl FnMut(&GenerationOutcome),
) -> Result<RunSummary, SimError>
where
    P: PolicyProvider,
    R: Renderer,
{
    config.validate()?;

    let mut summary = RunSummary {
        generations: 0,
        best_fitness: None,
        best_score: 0,
        stop_reason: StopReason::GenerationLimit,
    };

    for generation in 1..=max_generations {
        let candidates = provider.spawn_population(generation);
        if candidates.is_empty() {
            return Err(SimError::EmptyPopulation { generation });
        }
        log::info!(
            "generation {} started with {} agents",
            generation,
            candidates.len()
        );

        let field_rng = Box::new(Xoshiro256StarStar::seed_from_u64(rng.next_u64()));
        let mut evaluator =
            GenerationEvaluator::new(config, sprites, generation, candidates, field_rng);
        let end = evaluator.run(renderer)?;
        let outcome = evaluator.finish();

        log::info!(
            "generation {} finished: score {}, {} ticks, best fitness {:.2}, mean {:.2}",
            generation,
            outcome.score,
            outcome.ticks,
            outcome.best().map_or(0.0, |r| r.fitness),
            outcome.mean_fitness()
        );

        provider.report_outcome(&outcome);
        summary.record(&outcome);
        on_outcome(&outcome);

        if end == EndReason::Aborted {
            log::info!("run aborted during generation {}", generation);
            summary.stop_reason = StopReason::Aborted;
            break;
        }
        if provider.has_converged() {
            log::info!("provider converged after generation {}", generation);
            summary.stop_reason = StopReason::Converged;
            break;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Candidate, INPUT_SIZE, PolicyId};
    use crate::render::{NullRenderer, TickBudget};

    type FixedPolicy = fn(&[f32; INPUT_SIZE]) -> Vec<f32>;

    fn never_jump(_: &[f32; INPUT_SIZE]) -> Vec<f32> {
        vec![0.0]
    }

    /// Provider handing out the same fixed policies every generation
    struct Fixed {
        size: usize,
        reports: Vec<usize>,
        converge_after: Option<usize>,
    }

    impl PolicyProvider for Fixed {
        type Policy = FixedPolicy;

        fn spawn_population(&mut self, _generation: usize) -> Vec<Candidate<FixedPolicy>> {
            (0..self.size)
                .map(|i| Candidate::new(PolicyId(i as u64), never_jump as FixedPolicy))
                .collect()
        }

        fn report_outcome(&mut self, outcome: &GenerationOutcome) {
            self.reports.push(outcome.generation);
        }

        fn has_converged(&self) -> bool {
            self.converge_after
                .is_some_and(|n| self.reports.len() >= n)
        }
    }

    fn run(provider: &mut Fixed, max: usize) -> Result<RunSummary, SimError> {
        let config = SimConfig::default();
        let sprites = SpriteSet::procedural();
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        run_generations(provider, &mut NullRenderer, &config, &sprites, &mut rng, max)
    }

    #[test]
    fn test_runs_to_generation_limit() {
        let mut provider = Fixed {
            size: 4,
            reports: Vec::new(),
            converge_after: None,
        };
        let summary = run(&mut provider, 3).unwrap();
        assert_eq!(summary.generations, 3);
        assert_eq!(summary.stop_reason, StopReason::GenerationLimit);
        assert_eq!(provider.reports, vec![1, 2, 3]);
        assert!(summary.best_fitness.is_some_and(|f| f > 0.0));
    }

    #[test]
    fn test_stops_on_convergence() {
        let mut provider = Fixed {
            size: 2,
            reports: Vec::new(),
            converge_after: Some(2),
        };
        let summary = run(&mut provider, 10).unwrap();
        assert_eq!(summary.generations, 2);
        assert_eq!(summary.stop_reason, StopReason::Converged);
    }

    #[test]
    fn test_empty_population_is_error() {
        let mut provider = Fixed {
            size: 0,
            reports: Vec::new(),
            converge_after: None,
        };
        assert_eq!(
            run(&mut provider, 1).unwrap_err(),
            SimError::EmptyPopulation { generation: 1 }
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut provider = Fixed {
            size: 1,
            reports: Vec::new(),
            converge_after: None,
        };
        let config = SimConfig {
            pipe_gap: 0.0,
            ..SimConfig::default()
        };
        let sprites = SpriteSet::procedural();
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let result = run_generations(&mut provider, &mut NullRenderer, &config, &sprites, &mut rng, 1);
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
        assert!(provider.reports.is_empty());
    }

    #[test]
    fn test_tick_budget_aborts_run() {
        let mut provider = Fixed {
            size: 1,
            reports: Vec::new(),
            converge_after: None,
        };
        let config = SimConfig::default();
        let sprites = SpriteSet::procedural();
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        // The never-jump agent needs about 22 ticks to hit the floor
        let mut renderer = TickBudget::new(NullRenderer, 5);

        let mut seen = Vec::new();
        let summary = run_generations_with(
            &mut provider,
            &mut renderer,
            &config,
            &sprites,
            &mut rng,
            10,
            |outcome| seen.push(outcome.ticks),
        )
        .unwrap();
        assert_eq!(summary.stop_reason, StopReason::Aborted);
        assert_eq!(summary.generations, 1);
        assert_eq!(seen, vec![5]);
    }

    #[test]
    fn test_budget_equal_to_death_tick_does_not_abort() {
        let mut provider = Fixed {
            size: 1,
            reports: Vec::new(),
            converge_after: None,
        };
        let config = SimConfig::default();
        let sprites = SpriteSet::procedural();
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        // The never-jump agent hits the floor on tick 22
        let mut renderer = TickBudget::new(NullRenderer, 22);

        let mut seen = Vec::new();
        let summary = run_generations_with(
            &mut provider,
            &mut renderer,
            &config,
            &sprites,
            &mut rng,
            3,
            |outcome| seen.push((outcome.ticks, outcome.end_reason)),
        )
        .unwrap();
        assert_eq!(summary.stop_reason, StopReason::GenerationLimit);
        assert_eq!(summary.generations, 3);
        assert_eq!(seen, vec![(22, EndReason::Extinct); 3]);
    }
}
