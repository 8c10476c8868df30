//! Per-generation tick loop
//!
//! A [`GenerationEvaluator`] owns every live agent together with its policy
//! and running fitness. Each call to [`GenerationEvaluator::step`] runs one
//! fixed-timestep tick: agents fall and decide, the world scrolls, collisions
//! and pass events are scored, and a [`Snapshot`] is handed to the renderer.
//! Removed agents are retired into [`PolicyResult`]s with their fitness frozen.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::collision::CollisionIndex;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::field::ObstacleField;
use crate::ground::Ground;
use crate::mask::SpriteSet;
use crate::policy::{Candidate, INPUT_SIZE, OUTPUT_SIZE, Policy, PolicyId};
use crate::render::{AgentView, GroundView, ObstacleView, Renderer, Snapshot};

/// Why a generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Every agent was removed
    Extinct,
    /// The renderer raised its abort signal
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorState {
    Running,
    Ended(EndReason),
}

impl EvaluatorState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// How an agent's generation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fate {
    /// Still flying when the generation stopped
    Alive,
    /// Hit a pipe
    Collided,
    /// Touched the floor or left through the top
    OutOfBounds,
}

/// Final score of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyResult {
    pub id: PolicyId,
    pub fitness: f32,
    pub ticks_alive: u64,
    pub fate: Fate,
}

/// Everything the optimizer learns about a finished generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub generation: usize,
    /// Pipes passed
    pub score: u32,
    pub ticks: u64,
    pub end_reason: EndReason,
    /// One entry per candidate, ordered by id
    pub results: Vec<PolicyResult>,
}

impl GenerationOutcome {
    pub fn best(&self) -> Option<&PolicyResult> {
        self.results
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    pub fn mean_fitness(&self) -> f32 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.results.iter().map(|r| r.fitness).sum::<f32>() / self.results.len() as f32
    }

    pub fn fitness_of(&self, id: PolicyId) -> Option<f32> {
        self.results.iter().find(|r| r.id == id).map(|r| r.fitness)
    }
}

/// A live agent and the policy steering it
struct Entry<P> {
    id: PolicyId,
    agent: Agent,
    policy: P,
    fitness: f32,
    ticks_alive: u64,
}

impl<P> Entry<P> {
    fn retire(self, fate: Fate) -> PolicyResult {
        PolicyResult {
            id: self.id,
            fitness: self.fitness,
            ticks_alive: self.ticks_alive,
            fate,
        }
    }
}

pub struct GenerationEvaluator<'a, P> {
    config: &'a SimConfig,
    sprites: &'a SpriteSet,
    generation: usize,
    live: Vec<Entry<P>>,
    retired: Vec<PolicyResult>,
    field: ObstacleField,
    ground: Ground,
    score: u32,
    tick: u64,
    state: EvaluatorState,
}

impl<'a, P: Policy> GenerationEvaluator<'a, P> {
    /// Spawn one agent per candidate and the first obstacle.
    ///
    /// `rng` drives gap placement for this generation only.
    pub fn new(
        config: &'a SimConfig,
        sprites: &'a SpriteSet,
        generation: usize,
        candidates: Vec<Candidate<P>>,
        rng: Box<dyn RngCore>,
    ) -> Self {
        let live = candidates
            .into_iter()
            .map(|c| Entry {
                id: c.id,
                agent: Agent::spawn(config),
                policy: c.policy,
                fitness: 0.0,
                ticks_alive: 0,
            })
            .collect();

        let mut field = ObstacleField::new(config, sprites.pipe_width(), rng);
        field.spawn_initial();

        Self {
            config,
            sprites,
            generation,
            live,
            retired: Vec::new(),
            field,
            ground: Ground::new(config.floor_y, sprites.ground_width(), config.ground_velocity),
            score: 0,
            tick: 0,
            state: EvaluatorState::Running,
        }
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of agents still flying
    pub fn alive(&self) -> usize {
        self.live.len()
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    /// Live agents in spawn order
    pub fn agents(&self) -> impl Iterator<Item = (PolicyId, &Agent)> {
        self.live.iter().map(|e| (e.id, &e.agent))
    }

    /// Running fitness of a live agent
    pub fn fitness(&self, id: PolicyId) -> Option<f32> {
        self.live
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.fitness)
            .or_else(|| self.retired.iter().find(|r| r.id == id).map(|r| r.fitness))
    }

    /// Run one tick.
    ///
    /// Once the generation has ended this is a no-op returning the final state.
    pub fn step(&mut self, renderer: &mut impl Renderer) -> Result<EvaluatorState, SimError> {
        if !self.state.is_running() {
            return Ok(self.state);
        }
        if self.live.is_empty() {
            return Ok(self.end(EndReason::Extinct));
        }
        if renderer.poll_abort() {
            return Ok(self.end(EndReason::Aborted));
        }

        self.tick += 1;
        if self.field.is_empty() {
            self.field.spawn_initial();
        }

        // One reference pipe for everybody, picked from the leading agent
        let reference = self.field.closest_obstacle_index(self.live[0].agent.x());
        let (gap_top, gap_bottom) = self
            .field
            .get(reference)
            .map(|o| (o.gap_top(), o.gap_bottom()))
            .unwrap_or((0.0, 0.0));

        for entry in &mut self.live {
            entry.fitness += self.config.survival_reward;
            entry.ticks_alive += 1;
            entry.agent.advance(self.config);

            let y = entry.agent.y;
            let inputs: [f32; INPUT_SIZE] = [y, (y - gap_top).abs(), (y - gap_bottom).abs()];
            let output = entry.policy.evaluate(&inputs);
            let action = decode_output(entry.id, &output)?;
            if action > self.config.jump_threshold {
                entry.agent.apply_impulse(self.config);
            }
        }

        self.ground.advance();
        self.field.advance(self.live.iter().map(|e| e.agent.x()));
        self.remove_collided();

        if self.field.resolve_spawns_and_removals() {
            self.score += 1;
            for entry in &mut self.live {
                entry.fitness += self.config.pass_reward;
            }
            log::debug!(
                "generation {} tick {}: score {} with {} alive",
                self.generation,
                self.tick,
                self.score,
                self.live.len()
            );
        }

        self.remove_out_of_bounds();

        for entry in &mut self.live {
            entry.agent.animate(self.config);
        }
        renderer.render(&self.snapshot(reference));

        if self.live.is_empty() {
            return Ok(self.end(EndReason::Extinct));
        }
        Ok(self.state)
    }

    /// Step until the generation ends
    pub fn run(&mut self, renderer: &mut impl Renderer) -> Result<EndReason, SimError> {
        loop {
            if let EvaluatorState::Ended(reason) = self.step(renderer)? {
                return Ok(reason);
            }
        }
    }

    /// Collect results for every candidate, alive or not.
    ///
    /// An evaluator finished while still running reports `Aborted`.
    pub fn finish(self) -> GenerationOutcome {
        let end_reason = match self.state {
            EvaluatorState::Ended(reason) => reason,
            EvaluatorState::Running => EndReason::Aborted,
        };

        let mut results = self.retired;
        results.extend(self.live.into_iter().map(|e| e.retire(Fate::Alive)));
        results.sort_by_key(|r| r.id);

        GenerationOutcome {
            generation: self.generation,
            score: self.score,
            ticks: self.tick,
            end_reason,
            results,
        }
    }

    fn end(&mut self, reason: EndReason) -> EvaluatorState {
        self.state = EvaluatorState::Ended(reason);
        log::debug!(
            "generation {} ended after {} ticks: {:?}",
            self.generation,
            self.tick,
            reason
        );
        self.state
    }

    fn remove_collided(&mut self) {
        let index = CollisionIndex::new(self.sprites);
        let obstacles = self.field.obstacles();
        let (collided, survivors): (Vec<_>, Vec<_>) = std::mem::take(&mut self.live)
            .into_iter()
            .partition(|e| obstacles.iter().any(|o| index.overlaps(&e.agent, o)));
        self.live = survivors;

        for mut entry in collided {
            entry.fitness -= self.config.collision_penalty;
            log::trace!("{} collided at tick {}", entry.id, self.tick);
            self.retired.push(entry.retire(Fate::Collided));
        }
    }

    fn remove_out_of_bounds(&mut self) {
        let index = CollisionIndex::new(self.sprites);
        let (floor_y, margin) = (self.ground.y(), self.config.floor_margin);
        let (gone, survivors): (Vec<_>, Vec<_>) = std::mem::take(&mut self.live)
            .into_iter()
            .partition(|e| index.out_of_bounds(&e.agent, floor_y, margin));
        self.live = survivors;

        for entry in gone {
            log::trace!("{} left the field at tick {}", entry.id, self.tick);
            self.retired.push(entry.retire(Fate::OutOfBounds));
        }
    }

    fn snapshot(&self, reference: usize) -> Snapshot {
        let reference = match self.live.first() {
            Some(first) => self.field.closest_obstacle_index(first.agent.x()),
            None => reference.min(self.field.len().saturating_sub(1)),
        };

        Snapshot {
            generation: self.generation,
            tick: self.tick,
            score: self.score,
            alive: self.live.len(),
            agents: self
                .live
                .iter()
                .map(|e| AgentView {
                    x: e.agent.x(),
                    y: e.agent.y,
                    tilt: e.agent.tilt,
                    frame: e.agent.frame(),
                })
                .collect(),
            obstacles: self
                .field
                .obstacles()
                .iter()
                .map(|o| ObstacleView {
                    x: o.x,
                    gap_top: o.gap_top(),
                    gap_bottom: o.gap_bottom(),
                })
                .collect(),
            ground: GroundView {
                y: self.ground.y(),
                x1: self.ground.x1,
                x2: self.ground.x2,
            },
            reference_obstacle: reference,
        }
    }
}

/// Validate a policy's raw output and return the jump activation
fn decode_output(id: PolicyId, output: &[f32]) -> Result<f32, SimError> {
    if output.len() != OUTPUT_SIZE {
        return Err(SimError::MalformedOutput {
            policy: id,
            len: output.len(),
        });
    }
    let value = output[0];
    if !value.is_finite() {
        return Err(SimError::NonFiniteOutput { policy: id });
    }
    Ok(value)
}
