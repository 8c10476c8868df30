//! Capability traits for decision policies and the optimizer that supplies them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluator::GenerationOutcome;

/// Number of observation values fed to a policy
pub const INPUT_SIZE: usize = 3;

/// Number of action values a policy must return
pub const OUTPUT_SIZE: usize = 1;

/// Stable handle correlating a policy with its fitness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyId(pub u64);

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque decision function: observation in, action out
///
/// Inputs are `(y, |y - gap_top|, |y - gap_bottom|)` of the reference pipe.
/// Implementations must return exactly [`OUTPUT_SIZE`] finite values.
pub trait Policy {
    fn evaluate(&mut self, inputs: &[f32; INPUT_SIZE]) -> Vec<f32>;
}

impl<F> Policy for F
where
    F: FnMut(&[f32; INPUT_SIZE]) -> Vec<f32>,
{
    fn evaluate(&mut self, inputs: &[f32; INPUT_SIZE]) -> Vec<f32> {
        self(inputs)
    }
}

/// A policy paired with its handle for one generation
pub struct Candidate<P> {
    pub id: PolicyId,
    pub policy: P,
}

impl<P> Candidate<P> {
    pub fn new(id: PolicyId, policy: P) -> Self {
        Self { id, policy }
    }
}

/// External optimizer: hands out a population per generation and learns from
/// the resulting fitness
pub trait PolicyProvider {
    type Policy: Policy;

    /// Candidates to evaluate in `generation`
    fn spawn_population(&mut self, generation: usize) -> Vec<Candidate<Self::Policy>>;

    /// Fitness of every candidate once the generation has ended
    fn report_outcome(&mut self, outcome: &GenerationOutcome);

    /// Whether the optimizer considers the search finished
    fn has_converged(&self) -> bool {
        false
    }
}
