//! Pipe-pair obstacle

use serde::{Deserialize, Serialize};

/// One pipe-pair: a top piece hanging down to `gap_top` and a bottom piece
/// standing up from `gap_bottom`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    gap_center: f32,
    gap: f32,
    /// Set once any agent has flown past this obstacle
    pub passed: bool,
}

impl Obstacle {
    pub fn new(x: f32, gap_center: f32, gap: f32) -> Self {
        Self {
            x,
            gap_center,
            gap,
            passed: false,
        }
    }

    pub fn gap_center(&self) -> f32 {
        self.gap_center
    }

    /// Lower edge of the top piece
    pub fn gap_top(&self) -> f32 {
        self.gap_center - self.gap / 2.0
    }

    /// Upper edge of the bottom piece
    pub fn gap_bottom(&self) -> f32 {
        self.gap_center + self.gap / 2.0
    }

    /// y of the top piece sprite, which ends exactly at the gap
    pub fn top_piece_y(&self, piece_height: u32) -> f32 {
        self.gap_top() - piece_height as f32
    }

    /// Scroll left by one tick
    pub fn advance(&mut self, velocity: f32) {
        self.x -= velocity;
    }

    /// True once the right edge has left the visible field
    pub fn is_off_screen(&self, width: u32) -> bool {
        self.x + (width as f32) < 0.0
    }
}
