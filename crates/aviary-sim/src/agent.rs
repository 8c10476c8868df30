//! Bird motion model
//!
//! Agents never move horizontally; the world scrolls past them. Vertical
//! motion is integrated from the number of ticks since the last impulse
//! rather than from a stored velocity, which gives the characteristic
//! snappy flap followed by an accelerating fall.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// Frame order of the wing flap cycle
const FLAP_SEQUENCE: [usize; 4] = [0, 1, 2, 1];

/// Tilt at which the bird stops flapping and dives
const DIVE_TILT: f32 = -80.0;

/// Wing frame held while diving
const DIVE_FRAME: usize = 1;

/// Physical and cosmetic state of one bird
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    x: f32,
    pub y: f32,
    /// Cosmetic nose angle in degrees (positive is nose-up)
    pub tilt: f32,
    /// Ticks since the last impulse
    ticks_since_impulse: u32,
    /// Velocity set by the last impulse
    velocity: f32,
    /// y at the moment of the last impulse
    impulse_height: f32,
    /// Animation clock driving the wing frames
    frame_clock: u32,
    /// Current wing frame (index into the bird sprite frames)
    frame: usize,
}

impl Agent {
    /// Spawn an agent at rest
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            tilt: 0.0,
            ticks_since_impulse: 0,
            velocity: 0.0,
            impulse_height: y,
            frame_clock: 0,
            frame: 0,
        }
    }

    /// Spawn an agent at the configured spawn point
    pub fn spawn(config: &SimConfig) -> Self {
        Self::new(config.spawn_x, config.spawn_y)
    }

    /// Horizontal position (constant after spawn)
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Current wing frame
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Flap: set a strong upward velocity and restart the displacement curve
    pub fn apply_impulse(&mut self, config: &SimConfig) {
        self.velocity = config.jump_velocity;
        self.ticks_since_impulse = 0;
        self.impulse_height = self.y;
    }

    /// Advance one tick and return the applied displacement
    pub fn advance(&mut self, config: &SimConfig) -> f32 {
        self.ticks_since_impulse += 1;
        let t = self.ticks_since_impulse as f32;

        // d = v*t + 1/2*a*t^2
        let raw = self.velocity * t + 0.5 * config.gravity * t * t;
        let d = raw.clamp(-config.max_rise, config.terminal_velocity);
        self.y += d;

        if d < 0.0 || self.y < self.impulse_height + config.tilt_band {
            self.tilt = self.tilt.max(config.max_tilt);
        } else {
            self.tilt = (self.tilt - config.tilt_rate).max(config.min_tilt);
        }

        d
    }

    /// Advance the wing animation by one tick
    pub fn animate(&mut self, config: &SimConfig) {
        if self.tilt <= DIVE_TILT {
            // Gliding: freeze the wings mid-stroke and resume from there
            self.frame = DIVE_FRAME;
            self.frame_clock = config.animation_ticks * 2;
            return;
        }

        let period = config.animation_ticks * FLAP_SEQUENCE.len() as u32;
        self.frame_clock = (self.frame_clock + 1) % period;
        let step = (self.frame_clock / config.animation_ticks) as usize;
        self.frame = FLAP_SEQUENCE[step];
    }
}
