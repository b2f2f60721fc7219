use egui::Pos2;

use super::Bounds;
use crate::line::{Line, Tool};

/// Stroke width assumed for lines that carry no usable size.
pub const DEFAULT_LINE_SIZE: f32 = 5.0;

/// Size assumed for text lines without one; text is drawn at `size * 3` px.
pub const DEFAULT_TEXT_SIZE: f32 = 24.0;

fn effective_size(size: f32, fallback: f32) -> f32 {
    if size.is_finite() && size > 0.0 { size } else { fallback }
}

/// Min/max of the offset points of `line`, or `None` when it has no points.
fn point_extent(line: &Line) -> Option<(Pos2, Pos2)> {
    let offset = line.offset();
    let mut points = line.local_points().map(|p| p + offset);
    let first = points.next()?;
    Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
}

/// Axis-aligned bounds of a line's points shifted by its offset and padded by half its size
/// on every side, so that hairline strokes stay selectable.
///
/// Rotation and scale are not taken into account. A line without points yields
/// [`Bounds::ZERO`].
pub fn compute_bounds(line: &Line) -> Bounds {
    let Some((min, max)) = point_extent(line) else {
        return Bounds::ZERO;
    };
    let pad = effective_size(line.size, DEFAULT_LINE_SIZE) / 2.0;
    Bounds::new(
        min.x - pad,
        min.y - pad,
        max.x - min.x + pad * 2.0,
        max.y - min.y + pad * 2.0,
    )
}

/// Bounds used for box selection and click picking.
///
/// Identical to [`compute_bounds`] for lines with points; text (which has none) gets an
/// approximate `size * 5` by `size` box anchored at its offset.
pub fn selection_bounds(line: &Line) -> Bounds {
    if !line.points.is_empty() {
        return compute_bounds(line);
    }
    let size = effective_size(line.size, DEFAULT_TEXT_SIZE);
    let pad = effective_size(line.size, DEFAULT_LINE_SIZE) / 2.0;
    let origin = line.offset();
    Bounds::new(
        origin.x - pad,
        origin.y - pad,
        size * 5.0 + pad * 2.0,
        size + pad * 2.0,
    )
}

/// Separating-axis test. Touching edges count as intersecting.
pub fn rects_intersect(a: &Bounds, b: &Bounds) -> bool {
    !(b.x > a.x + a.width || b.x + b.width < a.x || b.y > a.y + a.height || b.y + b.height < a.y)
}

pub fn line_in_selection_box(line: &Line, selection_box: &Bounds) -> bool {
    rects_intersect(&selection_bounds(line), selection_box)
}

/// Topmost line whose selection bounds contain `point`. Fill markers are not pickable.
pub fn hit_test(lines: &[Line], point: Pos2) -> Option<&Line> {
    lines
        .iter()
        .rev()
        .filter(|line| line.tool != Tool::Fill)
        .find(|line| selection_bounds(line).contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn brush(points: Vec<f32>, size: f32) -> Line {
        Line::new(Tool::Brush, points, "#000000", size).with_id("line-t")
    }

    #[test]
    fn brush_bounds_are_padded_by_half_size() {
        let bounds = compute_bounds(&brush(vec![10.0, 10.0, 20.0, 20.0], 5.0));
        assert_eq!(bounds, Bounds::new(7.5, 7.5, 15.0, 15.0));
    }

    #[test]
    fn offset_shifts_bounds() {
        let mut line = brush(vec![0.0, 0.0, 10.0, 0.0], 2.0);
        line.x = Some(100.0);
        line.y = Some(50.0);
        let bounds = compute_bounds(&line);
        assert_eq!(bounds.x, 99.0);
        assert_eq!(bounds.y, 49.0);
        assert_eq!(bounds.width, 12.0);
        assert_eq!(bounds.height, 2.0);
    }

    #[test]
    fn empty_line_has_zero_bounds() {
        assert_eq!(compute_bounds(&brush(Vec::new(), 5.0)), Bounds::ZERO);
    }

    #[test]
    fn touching_rects_intersect() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(10.0, 10.0, 5.0, 5.0);
        let c = Bounds::new(10.1, 0.0, 5.0, 5.0);
        assert!(rects_intersect(&a, &b));
        assert!(rects_intersect(&b, &a));
        assert!(!rects_intersect(&a, &c));
    }

    #[test]
    fn text_gets_fallback_selection_box() {
        let text = Line::new_text("hi", pos2(100.0, 100.0), "#000000", 10.0);
        assert_eq!(compute_bounds(&text), Bounds::ZERO);
        let bounds = selection_bounds(&text);
        assert!(bounds.contains(pos2(120.0, 105.0)));
    }

    #[test]
    fn hit_test_prefers_topmost_line() {
        let lines = vec![
            brush(vec![0.0, 0.0, 50.0, 50.0], 4.0).with_id("bottom"),
            brush(vec![10.0, 10.0, 40.0, 40.0], 4.0).with_id("top"),
        ];
        assert_eq!(hit_test(&lines, pos2(20.0, 20.0)).map(|l| l.id.as_str()), Some("top"));
        assert_eq!(hit_test(&lines, pos2(2.0, 2.0)).map(|l| l.id.as_str()), Some("bottom"));
        assert!(hit_test(&lines, pos2(200.0, 2.0)).is_none());
    }
}
