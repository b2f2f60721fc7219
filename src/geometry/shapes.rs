//! Tool geometry shared by the software rasteriser and the on-screen painter.
//!
//! Everything here is in a line's local space; [`Placement`] maps it into the layer.

use std::f32::consts::PI;

use egui::{Pos2, Vec2, pos2, vec2};

use super::Bounds;
use crate::line::{Line, Tool};

/// Ratio of a star's inner to outer radius.
pub const STAR_INNER_RATIO: f32 = 0.5;

/// How a line's local geometry lands in the layer: translate by the offset, then rotate
/// (degrees) and scale around the tool's pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub offset: Vec2,
    pub pivot: Pos2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Placement {
    pub fn of(line: &Line) -> Self {
        Self {
            offset: line.offset(),
            pivot: pivot(line),
            rotation: effective_rotation(line),
            scale: line.scale(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.offset == Vec2::ZERO && self.rotation == 0.0 && self.scale == Vec2::splat(1.0)
    }

    pub fn apply(&self, p: Pos2) -> Pos2 {
        let local = (p - self.pivot) * self.scale;
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let rotated = vec2(local.x * cos - local.y * sin, local.x * sin + local.y * cos);
        self.pivot + rotated + self.offset
    }

    pub fn to_skia(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_translate(
            self.offset.x + self.pivot.x,
            self.offset.y + self.pivot.y,
        )
        .pre_concat(tiny_skia::Transform::from_rotate(self.rotation))
        .pre_concat(tiny_skia::Transform::from_scale(self.scale.x, self.scale.y))
        .pre_concat(tiny_skia::Transform::from_translate(
            -self.pivot.x,
            -self.pivot.y,
        ))
    }
}

/// The point a shape rotates and scales around: the rectangle's top-left corner, the drag
/// start for circles and polygons, the local origin for everything else.
pub fn pivot(line: &Line) -> Pos2 {
    match (line.tool, line.diagonal()) {
        (Tool::Rectangle, Some((a, b))) => a.min(b),
        (Tool::Circle | Tool::Triangle | Tool::Star, Some((a, _))) => a,
        _ => Pos2::ZERO,
    }
}

/// Stored rotation, or for triangles and stars without one, the drag direction so the
/// apex points where the user dragged.
pub fn effective_rotation(line: &Line) -> f32 {
    if let Some(rotation) = line.rotation {
        return rotation;
    }
    match (line.tool, line.diagonal()) {
        (Tool::Triangle | Tool::Star, Some((a, b))) => {
            let d = b - a;
            d.y.atan2(d.x).to_degrees() + 90.0
        }
        _ => 0.0,
    }
}

pub fn rectangle(line: &Line) -> Option<Bounds> {
    let (a, b) = line.diagonal()?;
    Some(Bounds::from_corners(a, b))
}

/// Centre and radius; the radius is the length of the drag diagonal.
pub fn circle(line: &Line) -> Option<(Pos2, f32)> {
    let (a, b) = line.diagonal()?;
    Some((a, a.distance(b)))
}

/// Outline of a triangle or star, unrotated, first vertex straight above the centre.
pub fn polygon(line: &Line) -> Option<Vec<Pos2>> {
    let (center, radius) = circle(line)?;
    let vertices = match line.tool {
        Tool::Triangle => regular_polygon(center, radius, 3),
        Tool::Star => star(center, radius, radius * STAR_INNER_RATIO, 5),
        _ => return None,
    };
    Some(vertices)
}

fn regular_polygon(center: Pos2, radius: f32, sides: usize) -> Vec<Pos2> {
    (0..sides)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / sides as f32;
            pos2(center.x + radius * angle.sin(), center.y - radius * angle.cos())
        })
        .collect()
}

fn star(center: Pos2, outer: f32, inner: f32, points: usize) -> Vec<Pos2> {
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = PI * i as f32 / points as f32;
            pos2(center.x + radius * angle.sin(), center.y - radius * angle.cos())
        })
        .collect()
}

/// Area covered by a rectangle-style fill marker. Degenerate or inverted areas yield `None`.
pub fn fill_area(line: &Line) -> Option<Bounds> {
    let (a, b) = line.diagonal()?;
    let (width, height) = (b.x - a.x, b.y - a.y);
    (width > 0.0 && height > 0.0).then(|| Bounds::new(a.x, a.y, width, height))
}
