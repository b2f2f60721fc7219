use egui::Pos2;

use crate::line::{Line, Tool};

/// Starts the in-progress line for a pointer-down at `pos`.
///
/// The first point is duplicated so a click without movement still leaves a dot, and shape
/// tools start with a zero-length diagonal. Erasers are drawn `eraser_multiplier` times wider
/// than the brush.
pub fn begin_candidate(
    tool: Tool,
    pos: Pos2,
    color: &str,
    brush_size: f32,
    eraser_multiplier: f32,
) -> Line {
    let size = if tool == Tool::Eraser {
        brush_size * eraser_multiplier
    } else {
        brush_size
    };
    Line::new(tool, vec![pos.x, pos.y, pos.x, pos.y], color, size)
}

/// Feeds a pointer move into the in-progress line.
///
/// Shapes keep their first corner and move the second; everything else appends a point.
pub fn extend_candidate(candidate: &mut Line, pos: Pos2) {
    if candidate.tool.is_shape() {
        candidate.points.truncate(2);
        candidate.points.extend([pos.x, pos.y]);
    } else {
        candidate.points.extend([pos.x, pos.y]);
    }
}

/// The committed form of a candidate: geometry and style only, with a fresh id to come.
pub fn finish_candidate(candidate: Line) -> Line {
    Line::new(
        candidate.tool,
        candidate.points,
        candidate.color,
        candidate.size,
    )
}
