//! Tunable simulation constants
//!
//! Every number the tick loop depends on lives here so that the evaluator has
//! no hidden globals. Defaults reproduce the classic 500x800 flappy-bird
//! playfield running at 30 ticks per second.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Simulation-wide constants for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Playfield width in pixels (obstacles spawn at this x)
    pub field_width: f32,
    /// Playfield height in pixels (renderer viewport only)
    pub field_height: f32,
    /// Fixed tick rate; pacing is the driver's concern
    pub tick_rate: u32,

    /// Spawn x shared by every agent
    pub spawn_x: f32,
    /// Spawn y shared by every agent
    pub spawn_y: f32,
    /// Vertical velocity set by an impulse (negative is up)
    pub jump_velocity: f32,
    /// Downward acceleration used by the displacement formula
    pub gravity: f32,
    /// Maximum downward displacement per tick
    pub terminal_velocity: f32,
    /// Maximum upward displacement per tick
    pub max_rise: f32,
    /// Nose-up tilt in degrees
    pub max_tilt: f32,
    /// Nose-down tilt limit in degrees
    pub min_tilt: f32,
    /// Tilt decay per tick in degrees
    pub tilt_rate: f32,
    /// Distance below the impulse height that still counts as climbing
    pub tilt_band: f32,
    /// Ticks each wing animation frame is held
    pub animation_ticks: u32,

    /// Vertical gap between the two pieces of a pipe-pair
    pub pipe_gap: f32,
    /// Horizontal scroll speed of pipes
    pub pipe_velocity: f32,
    /// Lowest allowed gap center
    pub gap_center_min: f32,
    /// Highest allowed gap center (exclusive)
    pub gap_center_max: f32,

    /// Floor line y
    pub floor_y: f32,
    /// Horizontal scroll speed of the ground tiles
    pub ground_velocity: f32,
    /// Forgiveness margin when testing the floor line
    pub floor_margin: f32,

    /// Fitness awarded for each survived tick
    pub survival_reward: f32,
    /// Fitness awarded to every survivor when a pipe is passed
    pub pass_reward: f32,
    /// Fitness removed on collision with a pipe
    pub collision_penalty: f32,
    /// Output value above which the policy jumps
    pub jump_threshold: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            field_width: 500.0,
            field_height: 800.0,
            tick_rate: 30,

            spawn_x: 230.0,
            spawn_y: 350.0,
            jump_velocity: -10.5,
            gravity: 3.0,
            terminal_velocity: 16.0,
            max_rise: 2.0,
            max_tilt: 25.0,
            min_tilt: -90.0,
            tilt_rate: 20.0,
            tilt_band: 50.0,
            animation_ticks: 5,

            pipe_gap: 200.0,
            pipe_velocity: 5.0,
            // Gap top edge is drawn from [50, 450) with a 200px gap
            gap_center_min: 150.0,
            gap_center_max: 550.0,

            floor_y: 703.0,
            ground_velocity: 5.0,
            floor_margin: 10.0,

            survival_reward: 0.1,
            pass_reward: 5.0,
            collision_penalty: 1.0,
            jump_threshold: 0.5,
        }
    }
}

impl SimConfig {
    /// Reject configurations the tick loop cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        if self.pipe_gap <= 0.0 {
            return Err(SimError::InvalidConfig("pipe_gap must be positive"));
        }
        if self.pipe_velocity <= 0.0 {
            return Err(SimError::InvalidConfig("pipe_velocity must be positive"));
        }
        if self.ground_velocity <= 0.0 {
            return Err(SimError::InvalidConfig("ground_velocity must be positive"));
        }
        if self.terminal_velocity <= 0.0 || self.max_rise <= 0.0 {
            return Err(SimError::InvalidConfig(
                "terminal_velocity and max_rise must be positive",
            ));
        }
        if self.gap_center_max < self.gap_center_min {
            return Err(SimError::InvalidConfig(
                "gap_center_max must not be below gap_center_min",
            ));
        }
        if self.field_width <= self.spawn_x {
            return Err(SimError::InvalidConfig(
                "field_width must lie ahead of spawn_x",
            ));
        }
        if self.animation_ticks == 0 || self.tick_rate == 0 {
            return Err(SimError::InvalidConfig(
                "animation_ticks and tick_rate must be non-zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spawn_x, 230.0);
        assert_eq!(config.pipe_gap, 200.0);
        assert_eq!(config.floor_y, 703.0);
    }

    #[test]
    fn test_inverted_gap_range_rejected() {
        let config = SimConfig {
            gap_center_min: 400.0,
            gap_center_max: 300.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_gap_rejected() {
        let config = SimConfig {
            pipe_gap: 0.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: SimConfig = ron::from_str("(pipe_gap: 160.0)").expect("parse");
        assert_eq!(config.pipe_gap, 160.0);
        assert_eq!(config.pipe_velocity, 5.0);
        assert_eq!(config.ground_velocity, 5.0);
    }

    #[test]
    fn test_stalled_ground_rejected() {
        let config = SimConfig {
            ground_velocity: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig("ground_velocity must be positive"))
        ));
    }
}
