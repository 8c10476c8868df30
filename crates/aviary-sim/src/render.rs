//! Render-state snapshots and the renderer capability
//!
//! The evaluator pushes one [`Snapshot`] per tick; whatever draws it (a
//! window, a GIF recorder, nothing at all) lives outside the core. The
//! renderer is also the channel through which a user abort reaches the loop.

use serde::{Deserialize, Serialize};

/// Drawable state of one live agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub x: f32,
    pub y: f32,
    pub tilt: f32,
    pub frame: usize,
}

/// Drawable state of one pipe-pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub x: f32,
    pub gap_top: f32,
    pub gap_bottom: f32,
}

/// Ground scroll state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundView {
    pub y: f32,
    pub x1: f32,
    pub x2: f32,
}

/// Everything a renderer needs to draw one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub generation: usize,
    pub tick: u64,
    pub score: u32,
    pub alive: usize,
    pub agents: Vec<AgentView>,
    pub obstacles: Vec<ObstacleView>,
    pub ground: GroundView,
    /// Index into `obstacles` of the pipe feeding policy inputs this tick
    pub reference_obstacle: usize,
}

/// Consumer of per-tick snapshots
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot);

    /// Polled at the start of every tick; returning true ends the generation
    fn poll_abort(&mut self) -> bool {
        false
    }
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render(&mut self, snapshot: &Snapshot) {
        (**self).render(snapshot);
    }

    fn poll_abort(&mut self) -> bool {
        (**self).poll_abort()
    }
}

/// Renderer for headless evaluation: draws nothing, never aborts
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _snapshot: &Snapshot) {}
}

/// Wraps a renderer and raises the abort signal once a generation has run
/// for `max_ticks` ticks with agents still alive
#[derive(Debug)]
pub struct TickBudget<R> {
    inner: R,
    max_ticks: u64,
    /// Set by the last rendered tick, consumed by the next poll
    exhausted: bool,
}

impl<R: Renderer> TickBudget<R> {
    pub fn new(inner: R, max_ticks: u64) -> Self {
        Self {
            inner,
            max_ticks,
            exhausted: false,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Renderer> Renderer for TickBudget<R> {
    fn render(&mut self, snapshot: &Snapshot) {
        // An empty snapshot is the last tick of a generation that ends anyway
        self.exhausted = snapshot.alive > 0 && snapshot.tick >= self.max_ticks;
        self.inner.render(snapshot);
    }

    fn poll_abort(&mut self) -> bool {
        let exhausted = std::mem::take(&mut self.exhausted);
        exhausted || self.inner.poll_abort()
    }
}
