//! Generational population of controller genomes
//!
//! Each generation keeps the best `elitism` genomes unchanged and fills the
//! rest with offspring of tournament-selected parents (crossover, then
//! mutation). The best genome ever seen is kept as the champion; once its
//! fitness reaches the configured threshold the population reports
//! convergence.

use std::collections::HashMap;

use aviary_sim::{Candidate, GenerationOutcome, PolicyId, PolicyProvider};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::error::NeuroError;
use crate::genome::{Genome, crossover};
use crate::network::FeedForward;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Genomes per generation
    pub population_size: usize,
    /// Hidden nodes per controller (0 wires inputs straight to the output)
    pub hidden_dim: usize,
    /// Top genomes copied unchanged into the next generation
    pub elitism: usize,
    /// Candidates compared per parent selection
    pub tournament_size: usize,
    /// Probability that an offspring has two parents
    pub crossover_rate: f32,
    /// Probability per weight
    pub mutation_rate: f32,
    /// Max perturbation magnitude
    pub mutation_power: f32,
    /// Stop once the champion reaches this fitness
    pub fitness_threshold: Option<f32>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            hidden_dim: 0,
            elitism: 2,
            tournament_size: 3,
            crossover_rate: 0.75,
            mutation_rate: 0.3,
            mutation_power: 0.5,
            fitness_threshold: Some(100.0),
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), NeuroError> {
        if self.population_size == 0 {
            return Err(NeuroError::InvalidConfig("population_size must be positive"));
        }
        if self.elitism > self.population_size {
            return Err(NeuroError::InvalidConfig(
                "elitism cannot exceed population_size",
            ));
        }
        if self.tournament_size == 0 {
            return Err(NeuroError::InvalidConfig("tournament_size must be positive"));
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.crossover_rate) || !unit.contains(&self.mutation_rate) {
            return Err(NeuroError::InvalidConfig(
                "crossover_rate and mutation_rate must lie in [0, 1]",
            ));
        }
        if self.mutation_power <= 0.0 {
            return Err(NeuroError::InvalidConfig("mutation_power must be positive"));
        }
        Ok(())
    }
}

/// Best genome found so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub genome: Genome,
    pub fitness: f32,
    /// Generation in which it was evaluated
    pub generation: usize,
}

/// Per-generation fitness statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub std_dev: f32,
    pub worst_fitness: f32,
    /// Pipes passed
    pub score: u32,
    pub ticks: u64,
}

impl GenerationStats {
    fn from_fitness(outcome: &GenerationOutcome, fitness: &[f32]) -> Self {
        let n = fitness.len().max(1) as f32;
        let mean = fitness.iter().sum::<f32>() / n;
        let variance = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f32>() / n;

        Self {
            generation: outcome.generation,
            best_fitness: fitness.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            mean_fitness: mean,
            std_dev: variance.sqrt(),
            worst_fitness: fitness.iter().copied().fold(f32::INFINITY, f32::min),
            score: outcome.score,
            ticks: outcome.ticks,
        }
    }
}

#[derive(Debug, Clone)]
struct Member {
    id: PolicyId,
    genome: Genome,
}

#[derive(Debug, Clone)]
pub struct Population {
    config: EvolutionConfig,
    members: Vec<Member>,
    next_id: u64,
    rng: Xoshiro256StarStar,
    champion: Option<Champion>,
    history: Vec<GenerationStats>,
}

impl Population {
    /// Random initial population
    pub fn new(config: EvolutionConfig, mut rng: Xoshiro256StarStar) -> Result<Self, NeuroError> {
        config.validate()?;
        let genomes = (0..config.population_size)
            .map(|_| Genome::random(config.hidden_dim, &mut rng))
            .collect();
        Ok(Self::from_genomes(config, genomes, rng))
    }

    pub fn from_seed(config: EvolutionConfig, seed: u64) -> Result<Self, NeuroError> {
        Self::new(config, Xoshiro256StarStar::seed_from_u64(seed))
    }

    /// Population descended from one ancestor: the ancestor itself plus
    /// mutated copies
    pub fn from_ancestor(
        config: EvolutionConfig,
        ancestor: Genome,
        mut rng: Xoshiro256StarStar,
    ) -> Result<Self, NeuroError> {
        config.validate()?;
        ancestor.validate()?;

        let mut genomes = vec![ancestor.clone()];
        while genomes.len() < config.population_size {
            let mut child = ancestor.clone();
            child.mutate(config.mutation_rate, config.mutation_power, &mut rng);
            genomes.push(child);
        }
        Ok(Self::from_genomes(config, genomes, rng))
    }

    fn from_genomes(config: EvolutionConfig, genomes: Vec<Genome>, rng: Xoshiro256StarStar) -> Self {
        let mut population = Self {
            config,
            members: Vec::with_capacity(genomes.len()),
            next_id: 0,
            rng,
            champion: None,
            history: Vec::new(),
        };
        for genome in genomes {
            let id = population.issue_id();
            population.members.push(Member { id, genome });
        }
        population
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Genomes of the generation about to be evaluated
    pub fn genomes(&self) -> impl Iterator<Item = &Genome> {
        self.members.iter().map(|m| &m.genome)
    }

    pub fn champion(&self) -> Option<&Champion> {
        self.champion.as_ref()
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    fn issue_id(&mut self) -> PolicyId {
        let id = PolicyId(self.next_id);
        self.next_id += 1;
        id
    }

    fn update_champion(&mut self, generation: usize, ranked: &[(f32, usize)]) {
        let Some(&(fitness, index)) = ranked.first() else {
            return;
        };
        if self.champion.as_ref().is_some_and(|c| c.fitness >= fitness) {
            return;
        }
        log::info!(
            "new champion in generation {} with fitness {:.2}",
            generation,
            fitness
        );
        self.champion = Some(Champion {
            genome: self.members[index].genome.clone(),
            fitness,
            generation,
        });
    }

    /// Best of `tournament_size` random picks
    fn tournament(&mut self, ranked: &[(f32, usize)]) -> (f32, usize) {
        let mut best = ranked[self.rng.gen_range(0..ranked.len())];
        for _ in 1..self.config.tournament_size {
            let pick = ranked[self.rng.gen_range(0..ranked.len())];
            if pick.0 > best.0 {
                best = pick;
            }
        }
        best
    }

    fn breed(&mut self, ranked: &[(f32, usize)]) -> Vec<Genome> {
        let size = self.config.population_size;
        let mut next: Vec<Genome> = ranked
            .iter()
            .take(self.config.elitism)
            .map(|&(_, i)| self.members[i].genome.clone())
            .collect();

        while next.len() < size {
            let (fitness1, parent1) = self.tournament(ranked);
            let mut child = if self.rng.r#gen::<f32>() < self.config.crossover_rate {
                let (fitness2, parent2) = self.tournament(ranked);
                crossover(
                    &self.members[parent1].genome,
                    fitness1,
                    &self.members[parent2].genome,
                    fitness2,
                    &mut self.rng,
                )
            } else {
                self.members[parent1].genome.clone()
            };
            child.mutate(
                self.config.mutation_rate,
                self.config.mutation_power,
                &mut self.rng,
            );
            next.push(child);
        }
        next
    }
}

impl PolicyProvider for Population {
    type Policy = FeedForward;

    fn spawn_population(&mut self, _generation: usize) -> Vec<Candidate<FeedForward>> {
        self.members
            .iter()
            .map(|m| Candidate::new(m.id, FeedForward::from_genome(&m.genome)))
            .collect()
    }

    fn report_outcome(&mut self, outcome: &GenerationOutcome) {
        let by_id: HashMap<PolicyId, f32> =
            outcome.results.iter().map(|r| (r.id, r.fitness)).collect();

        let fitness: Vec<f32> = self
            .members
            .iter()
            .map(|m| match by_id.get(&m.id) {
                Some(&f) => f,
                None => {
                    log::warn!("no result for {} in generation {}", m.id, outcome.generation);
                    0.0
                }
            })
            .collect();

        let stats = GenerationStats::from_fitness(outcome, &fitness);
        log::debug!(
            "generation {}: best {:.2} mean {:.2} stdev {:.2}",
            stats.generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.std_dev
        );
        self.history.push(stats);

        let mut ranked: Vec<(f32, usize)> = fitness.into_iter().zip(0..).collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        self.update_champion(outcome.generation, &ranked);

        let genomes = self.breed(&ranked);
        self.members.clear();
        for genome in genomes {
            let id = self.issue_id();
            self.members.push(Member { id, genome });
        }
    }

    fn has_converged(&self) -> bool {
        match (self.config.fitness_threshold, &self.champion) {
            (Some(threshold), Some(champion)) => champion.fitness >= threshold,
            _ => false,
        }
    }
}
