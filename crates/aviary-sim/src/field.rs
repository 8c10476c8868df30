//! The scrolling sequence of pipe-pairs
//!
//! Obstacles are kept ordered by x. A new pipe is spawned at the field's
//! right boundary whenever the earliest unpassed pipe falls behind an agent;
//! pipes that scroll fully off the left edge are retired. Spawns and removals
//! are buffered during [`ObstacleField::advance`] and applied together in
//! [`ObstacleField::resolve_spawns_and_removals`] so that at most one pipe is
//! added per tick.

use rand::{Rng, RngCore};

use crate::config::SimConfig;
use crate::obstacle::Obstacle;

pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    rng: Box<dyn RngCore>,
    spawn_x: f32,
    gap: f32,
    gap_center_range: (f32, f32),
    velocity: f32,
    pipe_width: u32,
    /// Set by a pass event, consumed by the next resolve
    spawn_due: bool,
    /// Obstacles found off-screen during the last advance
    pending_removals: usize,
}

impl ObstacleField {
    /// Create an empty field; call [`spawn_initial`](Self::spawn_initial)
    /// before the first tick
    pub fn new(config: &SimConfig, pipe_width: u32, rng: Box<dyn RngCore>) -> Self {
        Self {
            obstacles: Vec::new(),
            rng,
            spawn_x: config.field_width,
            gap: config.pipe_gap,
            gap_center_range: (config.gap_center_min, config.gap_center_max),
            velocity: config.pipe_velocity,
            pipe_width,
            spawn_due: false,
            pending_removals: 0,
        }
    }

    /// Reset to a single obstacle at the right boundary
    pub fn spawn_initial(&mut self) {
        self.obstacles.clear();
        self.spawn_due = false;
        self.pending_removals = 0;
        self.spawn();
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Obstacle> {
        self.obstacles.get(index)
    }

    pub fn pipe_width(&self) -> u32 {
        self.pipe_width
    }

    /// Scroll every obstacle, detect the pass event and queue removals.
    ///
    /// `agent_xs` are the x positions of all live agents.
    pub fn advance(&mut self, agent_xs: impl IntoIterator<Item = f32>) {
        for obstacle in &mut self.obstacles {
            obstacle.advance(self.velocity);
        }

        if let Some(next) = self.obstacles.iter_mut().find(|o| !o.passed)
            && agent_xs.into_iter().any(|x| next.x < x)
        {
            next.passed = true;
            self.spawn_due = true;
            log::trace!("obstacle passed at x={:.1}", next.x);
        }

        let width = self.pipe_width;
        self.pending_removals = self
            .obstacles
            .iter()
            .filter(|o| o.is_off_screen(width))
            .count();
    }

    /// Apply this tick's buffered spawn and removals.
    ///
    /// Returns true if a new obstacle was appended.
    pub fn resolve_spawns_and_removals(&mut self) -> bool {
        let spawned = std::mem::take(&mut self.spawn_due);
        if spawned {
            self.spawn();
        }

        if std::mem::take(&mut self.pending_removals) > 0 {
            let width = self.pipe_width;
            self.obstacles.retain(|o| !o.is_off_screen(width));
        }

        spawned
    }

    /// Index of the obstacle whose geometry feeds the policy inputs
    pub fn closest_obstacle_index(&self, agent_x: f32) -> usize {
        match self.obstacles.first() {
            Some(first)
                if self.obstacles.len() > 1 && agent_x > first.x + self.pipe_width as f32 =>
            {
                1
            }
            _ => 0,
        }
    }

    fn spawn(&mut self) {
        let (min, max) = self.gap_center_range;
        let t: f32 = self.rng.r#gen();
        // Whole pixels, like the sprite blits
        let center = (min + (max - min) * t).floor();
        self.obstacles
            .push(Obstacle::new(self.spawn_x, center, self.gap));
        log::trace!("spawned obstacle with gap center {:.1}", center);
    }
}
