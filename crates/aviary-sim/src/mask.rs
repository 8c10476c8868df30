//! Per-pixel silhouettes for collision detection
//!
//! A mask marks which pixels of a sprite are solid. Collision between two
//! sprites is a mask overlap test at their relative offset, so transparent
//! corners of the bird never count as hits.

use glam::IVec2;

use crate::error::SimError;

/// Alpha value above which a sprite pixel is considered solid
pub const ALPHA_THRESHOLD: u8 = 127;

/// Boolean silhouette of a sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Create an empty (fully transparent) mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width * height) as usize],
        }
    }

    /// Create a fully solid mask
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    /// Build a mask by evaluating `solid(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, solid: impl Fn(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if solid(x, y) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Build a mask from tightly packed RGBA pixels
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        Self::from_fn(width, height, |x, y| {
            let idx = ((y * width + x) * 4 + 3) as usize;
            rgba.get(idx).is_some_and(|&a| a > ALPHA_THRESHOLD)
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, solid: bool) {
        if x < self.width && y < self.height {
            self.bits[(y * self.width + x) as usize] = solid;
        }
    }

    /// Mirror top to bottom
    pub fn flip_vertical(&self) -> Self {
        Self::from_fn(self.width, self.height, |x, y| {
            self.get(x, self.height - 1 - y)
        })
    }

    /// Find the first pixel solid in both masks when `other` is placed with
    /// its top-left corner at `offset` in this mask's coordinates.
    ///
    /// Returns the overlapping point in this mask's coordinates.
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> Option<IVec2> {
        let x_start = offset.x.max(0);
        let y_start = offset.y.max(0);
        let x_end = (offset.x + other.width as i32).min(self.width as i32);
        let y_end = (offset.y + other.height as i32).min(self.height as i32);

        if x_start >= x_end || y_start >= y_end {
            return None;
        }

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x as u32, y as u32)
                    && other.get((x - offset.x) as u32, (y - offset.y) as u32)
                {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }
}

/// Collision silhouettes for everything that can touch a bird
#[derive(Debug, Clone)]
pub struct SpriteSet {
    bird_frames: Vec<Mask>,
    pipe_bottom: Mask,
    pipe_top: Mask,
    ground_width: u32,
}

impl SpriteSet {
    /// Bird sprite size after 2x scaling
    pub const BIRD_SIZE: (u32, u32) = (68, 48);
    /// Pipe sprite size after 2x scaling
    pub const PIPE_SIZE: (u32, u32) = (104, 640);
    /// Ground tile width after 2x scaling
    pub const GROUND_WIDTH: u32 = 672;

    /// Assemble a sprite set from loaded masks.
    ///
    /// `pipe` is the upright (bottom) piece; the top piece is its mirror.
    pub fn new(bird_frames: Vec<Mask>, pipe: Mask, ground_width: u32) -> Result<Self, SimError> {
        let Some(first) = bird_frames.first() else {
            return Err(SimError::InvalidConfig("at least one bird frame is required"));
        };
        if bird_frames
            .iter()
            .any(|f| f.width() != first.width() || f.height() != first.height())
        {
            return Err(SimError::InvalidConfig("bird frames must share one size"));
        }
        if pipe.width() == 0 || pipe.height() == 0 || ground_width == 0 {
            return Err(SimError::InvalidConfig("pipe and ground sprites must be non-empty"));
        }

        Ok(Self {
            pipe_top: pipe.flip_vertical(),
            pipe_bottom: pipe,
            bird_frames,
            ground_width,
        })
    }

    /// Generated silhouettes with the classic sprite dimensions
    pub fn procedural() -> Self {
        let (bw, bh) = Self::BIRD_SIZE;
        // Wing centre y for the up, mid and down strokes
        let frames = [14.0, 24.0, 34.0]
            .into_iter()
            .map(|wing_y| Mask::from_fn(bw, bh, |x, y| bird_pixel(x, y, wing_y)))
            .collect();

        let (pw, ph) = Self::PIPE_SIZE;
        let pipe = Mask::from_fn(pw, ph, |x, y| {
            const LIP_HEIGHT: u32 = 48;
            const BODY_INSET: u32 = 4;
            y < LIP_HEIGHT || (BODY_INSET..pw - BODY_INSET).contains(&x)
        });

        Self {
            pipe_top: pipe.flip_vertical(),
            pipe_bottom: pipe,
            bird_frames: frames,
            ground_width: Self::GROUND_WIDTH,
        }
    }

    /// Mask for a wing frame (wraps if the set has fewer frames)
    pub fn bird(&self, frame: usize) -> &Mask {
        &self.bird_frames[frame % self.bird_frames.len()]
    }

    pub fn bird_frame_count(&self) -> usize {
        self.bird_frames.len()
    }

    pub fn bird_width(&self) -> u32 {
        self.bird_frames[0].width()
    }

    pub fn bird_height(&self) -> u32 {
        self.bird_frames[0].height()
    }

    pub fn pipe_top(&self) -> &Mask {
        &self.pipe_top
    }

    pub fn pipe_bottom(&self) -> &Mask {
        &self.pipe_bottom
    }

    pub fn pipe_width(&self) -> u32 {
        self.pipe_bottom.width()
    }

    pub fn pipe_height(&self) -> u32 {
        self.pipe_bottom.height()
    }

    pub fn ground_width(&self) -> u32 {
        self.ground_width
    }
}

impl Default for SpriteSet {
    fn default() -> Self {
        Self::procedural()
    }
}

/// Ellipse body, beak and one wing stroke
fn bird_pixel(x: u32, y: u32, wing_y: f32) -> bool {
    let inside = |cx: f32, cy: f32, rx: f32, ry: f32| {
        let dx = (x as f32 + 0.5 - cx) / rx;
        let dy = (y as f32 + 0.5 - cy) / ry;
        dx * dx + dy * dy <= 1.0
    };

    let body = inside(32.0, 25.0, 26.0, 19.0);
    let beak = (54..66).contains(&x) && (22..32).contains(&y);
    let wing = inside(18.0, wing_y, 13.0, 7.0);
    body || beak || wing
}
