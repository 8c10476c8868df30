//! Flappy-bird generation evaluator
//!
//! This crate implements:
//! - The bird motion model and the scrolling pipe/ground world
//! - Pixel-mask collision between birds and pipes
//! - A fixed-timestep evaluator scoring one generation of policies
//! - A driver looping generations against an external policy provider
//!
//! Rendering and learning live behind the [`Renderer`] and [`PolicyProvider`]
//! traits.

pub mod agent;
pub mod collision;
pub mod config;
pub mod driver;
pub mod error;
pub mod evaluator;
pub mod field;
pub mod ground;
pub mod mask;
pub mod obstacle;
pub mod policy;
pub mod render;

// Re-export main types for convenience
pub use agent::Agent;
pub use collision::CollisionIndex;
pub use config::SimConfig;
pub use driver::{RunSummary, StopReason, run_generations, run_generations_with};
pub use error::SimError;
pub use evaluator::{
    EndReason, EvaluatorState, Fate, GenerationEvaluator, GenerationOutcome, PolicyResult,
};
pub use field::ObstacleField;
pub use ground::Ground;
pub use mask::{Mask, SpriteSet};
pub use obstacle::Obstacle;
pub use policy::{Candidate, INPUT_SIZE, OUTPUT_SIZE, Policy, PolicyId, PolicyProvider};
pub use render::{AgentView, GroundView, NullRenderer, ObstacleView, Renderer, Snapshot, TickBudget};
