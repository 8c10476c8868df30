//! Sprite images and the collision masks derived from them
//!
//! Sprites come either from a directory of PNGs (`bird1.png`..`bird3.png`,
//! `pipe.png`, `base.png` and an optional `bg.png`) or are painted over the
//! procedural silhouettes of [`SpriteSet::procedural`].

use std::path::Path;

use anyhow::{Context, Result};
use aviary_sim::{Mask, SpriteSet};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

const BIRD_FILES: [&str; 3] = ["bird1.png", "bird2.png", "bird3.png"];

const BIRD_BODY: [u8; 4] = [246, 200, 52, 255];
const BIRD_BEAK: [u8; 4] = [232, 96, 40, 255];
const PIPE_BODY: [u8; 4] = [116, 190, 46, 255];
const PIPE_LIP: [u8; 4] = [84, 140, 34, 255];
const GRASS_LIGHT: [u8; 4] = [156, 228, 89, 255];
const GRASS_DARK: [u8; 4] = [115, 191, 46, 255];
const DIRT: [u8; 4] = [222, 216, 149, 255];

const GROUND_HEIGHT: u32 = 112;
const GRASS_HEIGHT: u32 = 10;

/// Drawable sprites for one run
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    /// Wing animation frames
    pub birds: Vec<RgbaImage>,
    pub pipe_bottom: RgbaImage,
    pub pipe_top: RgbaImage,
    pub ground: RgbaImage,
    pub background: Option<RgbaImage>,
}

impl SpriteSheet {
    /// Load sprites from `dir`, optionally upscaling them 2x
    pub fn load(dir: &Path, scale2x: bool) -> Result<Self> {
        let load = |name: &str| -> Result<RgbaImage> {
            let path = dir.join(name);
            let image = image::open(&path)
                .with_context(|| format!("Failed to load sprite {}", path.display()))?
                .to_rgba8();
            Ok(if scale2x { upscale(&image) } else { image })
        };

        let birds = BIRD_FILES
            .into_iter()
            .map(|name| load(name))
            .collect::<Result<Vec<_>>>()?;
        let pipe = load("pipe.png")?;
        let ground = load("base.png")?;
        let background = if dir.join("bg.png").exists() {
            Some(load("bg.png")?)
        } else {
            None
        };

        log::info!(
            "Loaded sprites from {} (bird {}x{}, pipe {}x{})",
            dir.display(),
            birds[0].width(),
            birds[0].height(),
            pipe.width(),
            pipe.height()
        );

        Ok(Self {
            birds,
            pipe_top: imageops::flip_vertical(&pipe),
            pipe_bottom: pipe,
            ground,
            background,
        })
    }

    /// Paint the procedural silhouettes
    pub fn procedural(masks: &SpriteSet) -> Self {
        let birds = (0..masks.bird_frame_count())
            .map(|frame| {
                paint(masks.bird(frame), |x, _| {
                    if x >= masks.bird_width() * 3 / 4 {
                        BIRD_BEAK
                    } else {
                        BIRD_BODY
                    }
                })
            })
            .collect();

        let pipe = paint(masks.pipe_bottom(), |_, y| {
            if y < 48 { PIPE_LIP } else { PIPE_BODY }
        });

        let ground = RgbaImage::from_fn(masks.ground_width(), GROUND_HEIGHT, |x, y| {
            let color = if y >= GRASS_HEIGHT {
                DIRT
            } else if ((x + y) / 12) % 2 == 0 {
                GRASS_LIGHT
            } else {
                GRASS_DARK
            };
            Rgba(color)
        });

        Self {
            birds,
            pipe_top: imageops::flip_vertical(&pipe),
            pipe_bottom: pipe,
            ground,
            background: None,
        }
    }

    /// Wing frame image (wraps like [`SpriteSet::bird`])
    pub fn bird(&self, frame: usize) -> &RgbaImage {
        &self.birds[frame % self.birds.len()]
    }

    /// Collision masks matching these images
    pub fn masks(&self) -> Result<SpriteSet> {
        let frames = self.birds.iter().map(mask_of).collect();
        SpriteSet::new(frames, mask_of(&self.pipe_bottom), self.ground.width())
            .context("Sprites do not form a usable set")
    }
}

fn upscale(image: &RgbaImage) -> RgbaImage {
    imageops::resize(
        image,
        image.width() * 2,
        image.height() * 2,
        FilterType::Nearest,
    )
}

fn mask_of(image: &RgbaImage) -> Mask {
    Mask::from_rgba(image.width(), image.height(), image.as_raw())
}

/// Solid mask pixels take `color(x, y)`, the rest stay transparent
fn paint(mask: &Mask, color: impl Fn(u32, u32) -> [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get(x, y) {
            Rgba(color(x, y))
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
