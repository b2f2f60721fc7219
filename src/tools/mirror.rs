use crate::line::Line;

/// The pair committed by the mirror tool: the stroke itself and its reflection across the
/// vertical midline of a canvas `canvas_width` wide.
pub fn mirror_pair(stroke: Line, canvas_width: f32) -> [Line; 2] {
    let reflected = stroke.mirrored(canvas_width);
    [stroke, reflected]
}
