//! CPU-based pixel buffer renderer for headless GIF capture
//!
//! Draws a [`Snapshot`] with the sprite sheet into an RGBA buffer.

use aviary_sim::Snapshot;
use image::RgbaImage;

use crate::assets::SpriteSheet;

const SKY: [u8; 4] = [78, 192, 202, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const DECISION_LINE: [u8; 4] = [255, 0, 0, 255];

/// Pixel size of one font cell at scale 1 (5 wide plus spacing)
const GLYPH_ADVANCE: i32 = 6;
const HUD_SCALE: i32 = 4;

/// CPU-based renderer that outputs to a pixel buffer
pub struct PixelRenderer {
    /// Width of the viewport in pixels
    pub width: usize,
    /// Height of the viewport in pixels
    pub height: usize,
    /// RGBA pixel buffer (4 bytes per pixel)
    pub buffer: Vec<u8>,
}

impl PixelRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u8; width * height * 4],
        }
    }

    /// Draw one tick: background, pipes, ground, birds and the HUD
    pub fn draw_snapshot(&mut self, snapshot: &Snapshot, sheet: &SpriteSheet, draw_lines: bool) {
        match &sheet.background {
            Some(background) => self.blit(background, 0, 0),
            None => self.clear(SKY),
        }

        for obstacle in &snapshot.obstacles {
            let x = obstacle.x as i32;
            let top_y = obstacle.gap_top as i32 - sheet.pipe_top.height() as i32;
            self.blit(&sheet.pipe_top, x, top_y);
            self.blit(&sheet.pipe_bottom, x, obstacle.gap_bottom as i32);
        }

        let ground = &snapshot.ground;
        self.blit(&sheet.ground, ground.x1 as i32, ground.y as i32);
        self.blit(&sheet.ground, ground.x2 as i32, ground.y as i32);

        let reference = snapshot.obstacles.get(snapshot.reference_obstacle);
        for agent in &snapshot.agents {
            let sprite = sheet.bird(agent.frame);
            let cx = agent.x as i32 + sprite.width() as i32 / 2;
            let cy = agent.y as i32 + sprite.height() as i32 / 2;

            if draw_lines && let Some(pipe) = reference {
                let px = pipe.x as i32 + sheet.pipe_bottom.width() as i32 / 2;
                self.draw_thick_line(cx, cy, px, pipe.gap_top as i32, 2, DECISION_LINE);
                self.draw_thick_line(cx, cy, px, pipe.gap_bottom as i32, 2, DECISION_LINE);
            }

            self.blit_rotated(sprite, cx, cy, agent.tilt);
        }

        let score = format!("SCORE: {}", snapshot.score);
        let score_x = self.width as i32 - 15 - text_width(&score, HUD_SCALE);
        self.draw_text(score_x, 10, &score, HUD_SCALE, WHITE);
        self.draw_text(10, 10, &format!("GEN: {}", snapshot.generation), HUD_SCALE, WHITE);
        self.draw_text(10, 50, &format!("ALIVE: {}", snapshot.alive), HUD_SCALE, WHITE);
    }

    /// Fill the whole buffer with one color
    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.buffer.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    /// Set a single pixel at screen coordinates
    pub fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            let idx = (y as usize * self.width + x as usize) * 4;
            self.buffer[idx..idx + 4].copy_from_slice(&color);
        }
    }

    /// RGBA value at screen coordinates
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.buffer[idx],
            self.buffer[idx + 1],
            self.buffer[idx + 2],
            self.buffer[idx + 3],
        ]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: [u8; 4]) {
        for py in y..y + h {
            for px in x..x + w {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// Copy a sprite with its top-left corner at (x, y); transparent pixels
    /// are skipped
    pub fn blit(&mut self, sprite: &RgbaImage, x: i32, y: i32) {
        for (sx, sy, pixel) in sprite.enumerate_pixels() {
            if pixel.0[3] > 127 {
                self.set_pixel(x + sx as i32, y + sy as i32, pixel.0);
            }
        }
    }

    /// Copy a sprite rotated counter-clockwise by `degrees` around its
    /// center, placed so that the center lands on (cx, cy)
    pub fn blit_rotated(&mut self, sprite: &RgbaImage, cx: i32, cy: i32, degrees: f32) {
        if degrees == 0.0 {
            let x = cx - sprite.width() as i32 / 2;
            let y = cy - sprite.height() as i32 / 2;
            self.blit(sprite, x, y);
            return;
        }

        let (sin, cos) = degrees.to_radians().sin_cos();
        let half_w = sprite.width() as f32 / 2.0;
        let half_h = sprite.height() as f32 / 2.0;
        let radius = half_w.hypot(half_h).ceil() as i32;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let fx = dx as f32 + 0.5;
                let fy = dy as f32 + 0.5;
                // Inverse rotation in y-down screen space
                let sx = fx * cos - fy * sin + half_w;
                let sy = fx * sin + fy * cos + half_h;
                if sx < 0.0 || sy < 0.0 {
                    continue;
                }
                let (sx, sy) = (sx as u32, sy as u32);
                if sx >= sprite.width() || sy >= sprite.height() {
                    continue;
                }
                let pixel = sprite.get_pixel(sx, sy).0;
                if pixel[3] > 127 {
                    self.set_pixel(cx + dx, cy + dy, pixel);
                }
            }
        }
    }

    /// Draw a line using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 4]) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Line widened by `half_width` pixels to each side of its minor axis
    pub fn draw_thick_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        half_width: i32,
        color: [u8; 4],
    ) {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        for offset in -half_width..=half_width {
            if steep {
                self.draw_line(x0 + offset, y0, x1 + offset, y1, color);
            } else {
                self.draw_line(x0, y0 + offset, x1, y1 + offset, color);
            }
        }
    }

    /// Draw text using a 5x7 bitmap font, each font pixel `scale` pixels wide
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: [u8; 4]) {
        let mut cursor_x = x;
        for c in text.chars() {
            let glyph = font_glyph(c);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..5 {
                    if bits & (1 << (4 - col)) != 0 {
                        self.fill_rect(
                            cursor_x + col * scale,
                            y + row as i32 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
            cursor_x += GLYPH_ADVANCE * scale;
        }
    }

    /// Get the pixel buffer as RGB (without alpha) for GIF encoding
    pub fn get_rgb_buffer(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for chunk in self.buffer.chunks_exact(4) {
            rgb.extend_from_slice(&chunk[..3]);
        }
        rgb
    }

    /// RGB buffer keeping the top-left pixel of every `factor` x `factor`
    /// block
    pub fn downscaled_rgb(&self, factor: usize) -> Vec<u8> {
        if factor <= 1 {
            return self.get_rgb_buffer();
        }
        let (w, h) = self.downscaled_size(factor);
        let mut rgb = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                let idx = ((y * factor) * self.width + x * factor) * 4;
                rgb.extend_from_slice(&self.buffer[idx..idx + 3]);
            }
        }
        rgb
    }

    pub fn downscaled_size(&self, factor: usize) -> (usize, usize) {
        let factor = factor.max(1);
        (self.width / factor, self.height / factor)
    }
}

/// Rendered width of `text` at `scale`
pub fn text_width(text: &str, scale: i32) -> i32 {
    let chars = text.chars().count() as i32;
    if chars == 0 {
        0
    } else {
        (chars * GLYPH_ADVANCE - 1) * scale
    }
}

/// 5x7 glyph rows, bits 4-0 being columns left-to-right
fn font_glyph(c: char) -> [u8; 7] {
    match c {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        ':' => [0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
        ' ' => [0; 7],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aviary_sim::{AgentView, GroundView, ObstacleView, SpriteSet};

    fn snapshot() -> Snapshot {
        Snapshot {
            generation: 3,
            tick: 12,
            score: 7,
            alive: 1,
            agents: vec![AgentView {
                x: 230.0,
                y: 350.0,
                tilt: 0.0,
                frame: 0,
            }],
            obstacles: vec![ObstacleView {
                x: 300.0,
                gap_top: 250.0,
                gap_bottom: 450.0,
            }],
            ground: GroundView {
                y: 703.0,
                x1: 0.0,
                x2: 672.0,
            },
            reference_obstacle: 0,
        }
    }

    #[test]
    fn test_pixel_renderer_creation() {
        let renderer = PixelRenderer::new(128, 128);
        assert_eq!(renderer.width, 128);
        assert_eq!(renderer.height, 128);
        assert_eq!(renderer.buffer.len(), 128 * 128 * 4);
    }

    #[test]
    fn test_draw_snapshot_places_sprites() {
        let sheet = SpriteSheet::procedural(&SpriteSet::procedural());
        let mut renderer = PixelRenderer::new(500, 800);
        renderer.draw_snapshot(&snapshot(), &sheet, false);

        // Sky inside the gap, pipe body above and below it
        assert_eq!(renderer.pixel(350, 350), SKY);
        assert_eq!(renderer.pixel(350, 150), sheet.pipe_top.get_pixel(50, 540).0);
        assert_eq!(renderer.pixel(350, 550), sheet.pipe_bottom.get_pixel(50, 100).0);
        // Ground below the floor line
        assert_eq!(renderer.pixel(100, 750), sheet.ground.get_pixel(100, 47).0);
        // Bird body around its center
        assert_eq!(renderer.pixel(230 + 30, 350 + 24), sheet.bird(0).get_pixel(30, 24).0);
    }

    #[test]
    fn test_decision_lines_reach_gap_edges() {
        let sheet = SpriteSheet::procedural(&SpriteSet::procedural());
        let mut renderer = PixelRenderer::new(500, 800);
        renderer.draw_snapshot(&snapshot(), &sheet, true);
        assert_eq!(renderer.pixel(352, 250), DECISION_LINE);
        assert_eq!(renderer.pixel(352, 450), DECISION_LINE);
    }

    #[test]
    fn test_hud_text_is_drawn() {
        let mut renderer = PixelRenderer::new(100, 40);
        renderer.clear([0, 0, 0, 255]);
        renderer.draw_text(0, 0, "1", 2, WHITE);
        // Top stroke of '1' sits in the middle column
        assert_eq!(renderer.pixel(4, 0), WHITE);
        assert_eq!(renderer.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(text_width("SCORE: 7", 4), (8 * 6 - 1) * 4);
    }

    #[test]
    fn test_rotation_keeps_center() {
        let sprite = RgbaImage::from_pixel(10, 4, image::Rgba(WHITE));
        let mut renderer = PixelRenderer::new(40, 40);
        renderer.clear([0, 0, 0, 255]);
        renderer.blit_rotated(&sprite, 20, 20, 90.0);
        // Rotated a quarter turn the bar stands upright
        assert_eq!(renderer.pixel(20, 15), WHITE);
        assert_eq!(renderer.pixel(20, 24), WHITE);
        assert_eq!(renderer.pixel(15, 20), [0, 0, 0, 255]);
    }

    #[test]
    fn test_downscaled_rgb() {
        let mut renderer = PixelRenderer::new(4, 4);
        renderer.set_pixel(2, 2, [9, 8, 7, 255]);
        let rgb = renderer.downscaled_rgb(2);
        assert_eq!(renderer.downscaled_size(2), (2, 2));
        assert_eq!(rgb.len(), 2 * 2 * 3);
        assert_eq!(&rgb[9..12], &[9, 8, 7]);
        assert_eq!(renderer.downscaled_rgb(1), renderer.get_rgb_buffer());
    }
}
