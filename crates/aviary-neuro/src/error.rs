use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NeuroError {
    /// A genome's weight vector does not fit its declared topology
    #[error("genome has {actual} weights, topology with {hidden} hidden nodes needs {expected}")]
    WeightCount {
        hidden: usize,
        expected: usize,
        actual: usize,
    },
    #[error("invalid evolution config: {0}")]
    InvalidConfig(&'static str),
}
