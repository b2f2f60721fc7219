use egui::{Pos2, Rect, pos2};
use serde::{Deserialize, Serialize};

pub mod hit_testing;
pub mod shapes;

pub use hit_testing::{
    compute_bounds, hit_test, line_in_selection_box, rects_intersect, selection_bounds,
};

/// Axis-aligned rectangle in `x, y, width, height` form, as used by the project format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalised rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Pos2, b: Pos2) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn from_min_max(min: Pos2, max: Pos2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn min(&self) -> Pos2 {
        pos2(self.x, self.y)
    }

    pub fn max(&self) -> Pos2 {
        pos2(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Pos2 {
        pos2(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Pos2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_min_max(self.min(), self.max())
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::from_min_max(rect.min, rect.max)
    }
}
