//! Scrolling floor
//!
//! Two copies of the ground tile scroll left together; when one leaves the
//! screen it is moved behind the other so the floor appears endless. Only
//! `y` matters to collision logic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ground {
    /// Floor line
    y: f32,
    /// Left edge of the first tile
    pub x1: f32,
    /// Left edge of the second tile
    pub x2: f32,
    tile_width: f32,
    velocity: f32,
}

impl Ground {
    pub fn new(y: f32, tile_width: u32, velocity: f32) -> Self {
        let tile_width = tile_width as f32;
        Self {
            y,
            x1: 0.0,
            x2: tile_width,
            tile_width,
            velocity,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn advance(&mut self) {
        self.x1 -= self.velocity;
        self.x2 -= self.velocity;

        if self.x1 + self.tile_width < 0.0 {
            self.x1 = self.x2 + self.tile_width;
        }
        if self.x2 + self.tile_width < 0.0 {
            self.x2 = self.x1 + self.tile_width;
        }
    }
}
