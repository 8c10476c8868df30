//! Renderer that turns selected generations into GIFs
//!
//! Generation 1 and every `gif_interval`-th generation are drawn with the
//! [`PixelRenderer`] and written to `generation_NNNN.gif` once the next
//! generation starts (or on [`GenerationRecorder::finish`]).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aviary_sim::{Renderer, Snapshot};

use super::{GifCapture, PixelRenderer};
use crate::assets::SpriteSheet;
use crate::config::TrainingConfig;

pub struct GenerationRecorder {
    sheet: SpriteSheet,
    pixels: PixelRenderer,
    gif_dir: PathBuf,
    interval: usize,
    stride: u64,
    downscale: u32,
    max_frames: usize,
    fps: u16,
    draw_lines: bool,
    /// Generation being recorded and its frames
    capture: Option<(usize, GifCapture)>,
    saved: Vec<PathBuf>,
    /// First write failure; aborts the run
    error: Option<anyhow::Error>,
}

impl GenerationRecorder {
    pub fn new(
        sheet: SpriteSheet,
        viewport: (usize, usize),
        training: &TrainingConfig,
        tick_rate: u32,
        gif_dir: &Path,
    ) -> Self {
        Self {
            sheet,
            pixels: PixelRenderer::new(viewport.0, viewport.1),
            gif_dir: gif_dir.to_path_buf(),
            interval: training.gif_interval,
            stride: training.gif_frame_stride.max(1),
            downscale: training.gif_downscale,
            max_frames: training.gif_max_frames,
            fps: training.gif_fps(tick_rate),
            draw_lines: training.draw_lines,
            capture: None,
            saved: Vec::new(),
            error: None,
        }
    }

    pub fn records(&self, generation: usize) -> bool {
        self.interval > 0 && (generation == 1 || generation % self.interval == 0)
    }

    /// GIFs written so far
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Write the pending GIF and return every path written, or the first
    /// error hit while recording
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.flush()?;
        Ok(self.saved)
    }

    fn flush(&mut self) -> Result<()> {
        let Some((generation, capture)) = self.capture.take() else {
            return Ok(());
        };
        if capture.frame_count() == 0 {
            return Ok(());
        }

        let path = self.gif_dir.join(format!("generation_{:04}.gif", generation));
        capture
            .save(&path)
            .with_context(|| format!("Failed to record generation {}", generation))?;
        log::info!(
            "Saved {} frames of generation {} to {}",
            capture.frame_count(),
            generation,
            path.display()
        );
        self.saved.push(path);
        Ok(())
    }

    fn record(&mut self, snapshot: &Snapshot) -> Result<()> {
        if self
            .capture
            .as_ref()
            .is_some_and(|(generation, _)| *generation != snapshot.generation)
        {
            self.flush()?;
        }

        if self.capture.is_none() && snapshot.tick == 1 && self.records(snapshot.generation) {
            let size = (self.pixels.width, self.pixels.height);
            let capture = GifCapture::new(size, self.downscale, self.fps, self.max_frames);
            self.capture = Some((snapshot.generation, capture));
        }

        if let Some((_, capture)) = &mut self.capture
            && (snapshot.tick - 1) % self.stride == 0
            && !capture.is_full()
        {
            self.pixels
                .draw_snapshot(snapshot, &self.sheet, self.draw_lines);
            capture.capture_frame(&self.pixels);
        }
        Ok(())
    }
}

impl Renderer for GenerationRecorder {
    fn render(&mut self, snapshot: &Snapshot) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.record(snapshot) {
            log::error!("GIF recording failed: {:#}", error);
            self.error = Some(error);
        }
    }

    fn poll_abort(&mut self) -> bool {
        self.error.is_some()
    }
}
