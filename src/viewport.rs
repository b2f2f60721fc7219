//! Stage pan and zoom.
//!
//! Screen space is the canvas widget's pixel space; world space is the drawing's own
//! coordinate system. `screen = world * scale + position`.

use egui::{Pos2, Vec2, pos2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f32,
    position: Vec2,
    min_scale: f32,
    max_scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.1, 5.0)
    }
}

impl Viewport {
    pub fn new(min_scale: f32, max_scale: f32) -> Self {
        Self {
            scale: 1.0,
            position: Vec2::ZERO,
            min_scale,
            max_scale,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Screen offset of the world origin.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = self.clamp_scale(scale);
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_finite() {
            scale.clamp(self.min_scale, self.max_scale)
        } else {
            self.scale
        }
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.position = Vec2::ZERO;
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        pos2(
            (screen.x - self.position.x) / self.scale,
            (screen.y - self.position.y) / self.scale,
        )
    }

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        pos2(
            world.x * self.scale + self.position.x,
            world.y * self.scale + self.position.y,
        )
    }

    /// Sets the scale while keeping the world point under `anchor` stationary on screen.
    pub fn zoom_at(&mut self, anchor: Pos2, new_scale: f32) {
        let world = self.screen_to_world(anchor);
        self.scale = self.clamp_scale(new_scale);
        self.position = anchor.to_vec2() - world.to_vec2() * self.scale;
    }

    /// One wheel notch: in multiplies by `step`, out divides by it.
    pub fn zoom_step_at(&mut self, anchor: Pos2, zoom_in: bool, step: f32) {
        let new_scale = if zoom_in {
            self.scale * step
        } else {
            self.scale / step
        };
        self.zoom_at(anchor, new_scale);
    }
}
