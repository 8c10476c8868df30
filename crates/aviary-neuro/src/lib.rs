//! Reference policy provider for aviary
//!
//! This crate implements:
//! - A fixed-topology tanh feed-forward controller
//! - Flat weight genomes with perturbation/replacement mutation and
//!   fitness-biased crossover
//! - A generational population with elitism, tournament selection and a
//!   convergence threshold

pub mod error;
pub mod genome;
pub mod network;
pub mod population;

pub use error::NeuroError;
pub use genome::{Genome, WEIGHT_LIMIT, crossover};
pub use network::FeedForward;
pub use population::{Champion, EvolutionConfig, GenerationStats, Population};
