use thiserror::Error;

use crate::policy::PolicyId;

/// Fatal conditions raised by the generation evaluator and driver
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A policy returned an output vector of the wrong size
    #[error("policy {policy} returned {len} outputs, expected exactly 1")]
    MalformedOutput { policy: PolicyId, len: usize },
    /// A policy returned NaN or infinity
    #[error("policy {policy} returned a non-finite output")]
    NonFiniteOutput { policy: PolicyId },
    /// The provider handed out no candidates
    #[error("policy provider supplied no candidates for generation {generation}")]
    EmptyPopulation { generation: usize },
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
