//! Flat weight genomes for the fixed-topology controller
//!
//! Layout with hidden nodes: input->hidden weights, hidden biases,
//! hidden->output weights, output biases. Without hidden nodes the inputs
//! feed the output directly: input->output weights, output biases.

use aviary_sim::{INPUT_SIZE, OUTPUT_SIZE};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::NeuroError;

/// Weights are clamped to this magnitude after perturbation
pub const WEIGHT_LIMIT: f32 = 4.0;

/// Range of freshly drawn weights
const INIT_RANGE: f32 = 0.5;

/// Range of replacement weights
const REPLACE_RANGE: f32 = 2.0;

/// Share of weight mutations that perturb rather than replace
const PERTURB_PROBABILITY: f32 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    hidden_dim: usize,
    weights: Vec<f32>,
}

impl Genome {
    /// Number of weights (including biases) for a topology
    pub fn weight_count(hidden_dim: usize) -> usize {
        if hidden_dim == 0 {
            INPUT_SIZE * OUTPUT_SIZE + OUTPUT_SIZE
        } else {
            INPUT_SIZE * hidden_dim + hidden_dim + hidden_dim * OUTPUT_SIZE + OUTPUT_SIZE
        }
    }

    pub fn random(hidden_dim: usize, rng: &mut impl Rng) -> Self {
        let weights = (0..Self::weight_count(hidden_dim))
            .map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
            .collect();
        Self {
            hidden_dim,
            weights,
        }
    }

    pub fn from_weights(hidden_dim: usize, weights: Vec<f32>) -> Result<Self, NeuroError> {
        let genome = Self {
            hidden_dim,
            weights,
        };
        genome.validate()?;
        Ok(genome)
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Check the weight vector against the topology (deserialized genomes)
    pub fn validate(&self) -> Result<(), NeuroError> {
        let expected = Self::weight_count(self.hidden_dim);
        if self.weights.len() != expected {
            return Err(NeuroError::WeightCount {
                hidden: self.hidden_dim,
                expected,
                actual: self.weights.len(),
            });
        }
        Ok(())
    }

    /// Mutate each weight with probability `rate`; returns the number changed
    pub fn mutate(&mut self, rate: f32, power: f32, rng: &mut impl Rng) -> usize {
        let mut mutated = 0;
        for weight in &mut self.weights {
            if rng.r#gen::<f32>() < rate {
                if rng.r#gen::<f32>() < PERTURB_PROBABILITY {
                    *weight += rng.gen_range(-power..power);
                    *weight = weight.clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
                } else {
                    *weight = rng.gen_range(-REPLACE_RANGE..REPLACE_RANGE);
                }
                mutated += 1;
            }
        }
        mutated
    }
}

/// Uniform crossover biased toward the fitter parent.
///
/// Parents with different topologies produce a copy of the fitter one.
pub fn crossover(
    parent1: &Genome,
    parent1_fitness: f32,
    parent2: &Genome,
    parent2_fitness: f32,
    rng: &mut impl Rng,
) -> Genome {
    let (fitter, other) = if parent1_fitness >= parent2_fitness {
        (parent1, parent2)
    } else {
        (parent2, parent1)
    };
    if fitter.hidden_dim != other.hidden_dim {
        return fitter.clone();
    }

    let bias = if parent1_fitness == parent2_fitness {
        0.5
    } else {
        0.7
    };
    let weights = fitter
        .weights
        .iter()
        .zip(&other.weights)
        .map(|(&a, &b)| if rng.r#gen::<f32>() < bias { a } else { b })
        .collect();

    Genome {
        hidden_dim: fitter.hidden_dim,
        weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn rng() -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(3)
    }

    #[test]
    fn test_weight_count() {
        // 3 inputs straight to 1 output plus bias
        assert_eq!(Genome::weight_count(0), 4);
        // 3*4 + 4 + 4*1 + 1
        assert_eq!(Genome::weight_count(4), 21);
    }

    #[test]
    fn test_random_genome_in_init_range() {
        let genome = Genome::random(6, &mut rng());
        assert_eq!(genome.weights().len(), Genome::weight_count(6));
        assert!(genome.weights().iter().all(|w| w.abs() <= INIT_RANGE));
    }

    #[test]
    fn test_from_weights_rejects_wrong_length() {
        let err = Genome::from_weights(2, vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            NeuroError::WeightCount {
                hidden: 2,
                expected: 11,
                actual: 3
            }
        );
        assert!(Genome::from_weights(0, vec![0.0; 4]).is_ok());
    }

    #[test]
    fn test_mutation_keeps_weights_clamped() {
        let mut rng = rng();
        let mut genome = Genome::random(8, &mut rng);
        for _ in 0..200 {
            genome.mutate(0.8, 3.0, &mut rng);
        }
        assert!(genome.weights().iter().all(|w| w.abs() <= WEIGHT_LIMIT));
    }

    #[test]
    fn test_zero_rate_mutates_nothing() {
        let mut rng = rng();
        let mut genome = Genome::random(4, &mut rng);
        let before = genome.clone();
        assert_eq!(genome.mutate(0.0, 1.0, &mut rng), 0);
        assert_eq!(genome, before);
    }

    #[test]
    fn test_full_rate_mutates_everything() {
        let mut rng = rng();
        let mut genome = Genome::random(4, &mut rng);
        assert_eq!(genome.mutate(1.0, 0.5, &mut rng), Genome::weight_count(4));
    }

    #[test]
    fn test_crossover_draws_genes_from_parents() {
        let mut rng = rng();
        let a = Genome::from_weights(0, vec![1.0; 4]).unwrap();
        let b = Genome::from_weights(0, vec![-1.0; 4]).unwrap();

        let child = crossover(&a, 10.0, &b, 1.0, &mut rng);
        assert_eq!(child.hidden_dim(), 0);
        assert!(child.weights().iter().all(|&w| w == 1.0 || w == -1.0));
    }

    #[test]
    fn test_crossover_fitness_bias() {
        let mut rng = rng();
        let a = Genome::from_weights(4, vec![1.0; 21]).unwrap();
        let b = Genome::from_weights(4, vec![-1.0; 21]).unwrap();

        let mut from_fitter = 0;
        let mut total = 0;
        for _ in 0..200 {
            let child = crossover(&a, 1.0, &b, 50.0, &mut rng);
            from_fitter += child.weights().iter().filter(|&&w| w == -1.0).count();
            total += child.weights().len();
        }
        let share = from_fitter as f32 / total as f32;
        assert!(share > 0.6 && share < 0.8, "share was {share}");
    }

    #[test]
    fn test_crossover_mismatched_topology_copies_fitter() {
        let mut rng = rng();
        let a = Genome::random(2, &mut rng);
        let b = Genome::random(5, &mut rng);
        assert_eq!(crossover(&a, 1.0, &b, 2.0, &mut rng), b);
    }

    #[test]
    fn test_genome_ron_round_trip() {
        let genome = Genome::random(3, &mut rng());
        let text = ron::to_string(&genome).unwrap();
        let back: Genome = ron::from_str(&text).unwrap();
        assert_eq!(back, genome);
        assert!(back.validate().is_ok());
    }
}
