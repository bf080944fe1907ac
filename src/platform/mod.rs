//! Platform abstraction layer
//!
//! Browser details the simulation should not know about:
//! - Pointer coordinates (CSS pixels on a scaled canvas) to world coordinates
//! - Frame timing from `requestAnimationFrame` timestamps

use glam::Vec2;

use crate::consts::FIXED_FRAME_MS;
use crate::sim::Camera;

/// Frames averaged for the FPS readout
const FPS_WINDOW: usize = 60;

/// Where the canvas sits on the page and how large its backing store is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Bounding rectangle in CSS pixels
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Canvas resolution in logical game pixels
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl Viewport {
    /// CSS-to-canvas scale; 1 for a collapsed element
    fn scale(&self) -> Vec2 {
        let sx = if self.width > 0.0 { self.canvas_width / self.width } else { 1.0 };
        let sy = if self.height > 0.0 { self.canvas_height / self.height } else { 1.0 };
        Vec2::new(sx, sy)
    }

    /// Client (page) coordinates to canvas coordinates
    pub fn to_canvas(&self, client: Vec2) -> Vec2 {
        (client - Vec2::new(self.left, self.top)) * self.scale()
    }

    /// Client coordinates to world coordinates under `camera`
    pub fn to_world(&self, client: Vec2, camera: &Camera) -> Vec2 {
        self.to_canvas(client) + Vec2::new(camera.x, camera.y)
    }
}

/// Turns animation-frame timestamps into frame durations
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    frame_times: [f64; FPS_WINDOW],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_ms: None,
            frame_times: [0.0; FPS_WINDOW],
            frame_index: 0,
            fps: 0,
        }
    }

    /// Milliseconds since the previous frame. The first frame counts as one
    /// nominal 60 Hz frame.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let elapsed = match self.last_ms {
            Some(last) => (now_ms - last) as f32,
            None => FIXED_FRAME_MS,
        };
        self.last_ms = Some(now_ms);

        // FPS over the last FPS_WINDOW frames
        let oldest = self.frame_times[self.frame_index];
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % FPS_WINDOW;
        if oldest > 0.0 && now_ms > oldest {
            self.fps = (FPS_WINDOW as f64 * 1000.0 / (now_ms - oldest)).round() as u32;
        }

        elapsed
    }

    /// Forget the previous timestamp (after the tab was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_canvas_to_world() {
        // 800x600 canvas shown at half size, 10px from the page corner
        let viewport = Viewport {
            left: 10.0,
            top: 20.0,
            width: 400.0,
            height: 300.0,
            canvas_width: 800.0,
            canvas_height: 600.0,
        };
        let camera = Camera {
            y: -1000.0,
            ..Default::default()
        };
        assert_eq!(viewport.to_canvas(Vec2::new(210.0, 270.0)), Vec2::new(400.0, 500.0));
        assert_eq!(
            viewport.to_world(Vec2::new(210.0, 270.0), &camera),
            Vec2::new(400.0, -500.0)
        );
    }

    #[test]
    fn test_collapsed_viewport() {
        let viewport = Viewport {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            canvas_width: 800.0,
            canvas_height: 600.0,
        };
        let p = viewport.to_world(Vec2::new(5.0, 7.0), &Camera::default());
        assert_eq!(p, Vec2::new(5.0, 7.0));
    }

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(1000.0), FIXED_FRAME_MS);
        assert_eq!(clock.advance(1020.0), 20.0);
        clock.reset();
        assert_eq!(clock.advance(5000.0), FIXED_FRAME_MS);
    }

    #[test]
    fn test_fps_readout() {
        let mut clock = FrameClock::new();
        let mut t = 1000.0;
        for _ in 0..=FPS_WINDOW {
            clock.advance(t);
            t += 1000.0 / 60.0;
        }
        assert_eq!(clock.fps(), 60);
    }
}
