//! GIF capture for generation playback
//!
//! Collects downscaled frames from a [`PixelRenderer`] and encodes them as an
//! animated GIF.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use gif::{Encoder, Frame, Repeat};

use super::PixelRenderer;

/// NeuQuant sampling speed; 1 is best quality, 30 fastest
const QUANTIZE_SPEED: i32 = 10;

/// Captures frames and encodes them as GIF
pub struct GifCapture {
    /// Collected frames (RGB data)
    frames: Vec<Vec<u8>>,
    width: u16,
    height: u16,
    downscale: usize,
    max_frames: usize,
    /// Delay between frames in centiseconds (100ths of a second)
    frame_delay: u16,
}

impl GifCapture {
    /// Capture frames of `renderer_size` pixels, shrunk by `downscale`
    pub fn new(renderer_size: (usize, usize), downscale: u32, fps: u16, max_frames: usize) -> Self {
        let downscale = downscale.max(1) as usize;
        let frame_delay = if fps > 0 { 100 / fps } else { 10 };

        Self {
            frames: Vec::new(),
            width: (renderer_size.0 / downscale) as u16,
            height: (renderer_size.1 / downscale) as u16,
            downscale,
            max_frames,
            frame_delay,
        }
    }

    /// Capture a frame from a pixel renderer; returns false once full
    pub fn capture_frame(&mut self, renderer: &PixelRenderer) -> bool {
        if self.is_full() {
            return false;
        }
        self.frames.push(renderer.downscaled_rgb(self.downscale));
        true
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.max_frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Save captured frames as an animated GIF
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if self.frames.is_empty() {
            anyhow::bail!("No frames to save");
        }

        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create GIF file {}", path.display()))?;

        let mut encoder = Encoder::new(BufWriter::new(file), self.width, self.height, &[])
            .context("Failed to create GIF encoder")?;

        encoder
            .set_repeat(Repeat::Infinite)
            .context("Failed to set GIF repeat")?;

        for frame_data in &self.frames {
            let mut frame =
                Frame::from_rgb_speed(self.width, self.height, frame_data, QUANTIZE_SPEED);
            frame.delay = self.frame_delay;

            encoder
                .write_frame(&frame)
                .context("Failed to write GIF frame")?;
        }

        Ok(())
    }
}
