use std::collections::BTreeSet;

use egui::Pos2;

use crate::geometry::{Bounds, compute_bounds, rects_intersect};
use crate::layer::Layer;
use crate::line::{Line, Tool};

/// Eraser lines of `layer` that belong with `target`.
///
/// Erasers only make sense together with the strokes they cut into, so selecting a line
/// drags along every eraser whose padded bounds intersect the target's padded bounds.
/// Selecting an eraser itself pulls in nothing.
pub fn eraser_companions<'a>(layer: &'a Layer, target: &Line) -> Vec<&'a str> {
    if target.tool == Tool::Eraser {
        return Vec::new();
    }
    let target_bounds = compute_bounds(target);
    layer
        .lines
        .iter()
        .filter(|line| line.tool == Tool::Eraser && line.id != target.id)
        .filter(|line| rects_intersect(&target_bounds, &compute_bounds(line)))
        .map(|line| line.id.as_str())
        .collect()
}

/// The set of selected line ids. Always a subset of the active layer's line ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Click selection of `id` within `layer`.
    ///
    /// Additive clicks toggle membership. Plain clicks replace the selection with the line
    /// and its [`eraser_companions`]. Unknown ids leave the selection alone.
    pub fn select(&mut self, layer: &Layer, id: &str, additive: bool) -> bool {
        let Some(target) = layer.line(id) else {
            return false;
        };
        if additive {
            if !self.ids.remove(id) {
                self.ids.insert(id.to_string());
            }
            return true;
        }

        self.ids.clear();
        self.ids.insert(id.to_string());
        let companions = eraser_companions(layer, target);
        if !companions.is_empty() {
            log::debug!("Selection of {id} picked up {} erasers", companions.len());
        }
        self.ids.extend(companions.into_iter().map(str::to_string));
        true
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, ids: I) {
        self.ids.extend(ids);
    }

    /// Drops ids that no longer exist in `layer`. Returns how many were dropped.
    pub fn prune(&mut self, layer: Option<&Layer>) -> usize {
        let before = self.ids.len();
        match layer {
            Some(layer) => self.ids.retain(|id| layer.contains_line(id)),
            None => self.ids.clear(),
        }
        before - self.ids.len()
    }
}

/// A rubber-band rectangle anchored where the drag started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    pub anchor: Pos2,
    pub current: Pos2,
    /// Whether the drag started with shift held; the result is unioned with the previous
    /// selection instead of replacing it.
    pub additive: bool,
}

impl SelectionBox {
    pub fn new(anchor: Pos2, additive: bool) -> Self {
        Self {
            anchor,
            current: anchor,
            additive,
        }
    }

    /// Normalised rectangle from the anchor to the current point.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.anchor, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn layer_with(lines: Vec<Line>) -> Layer {
        let mut layer = Layer::background();
        layer.lines = lines;
        layer
    }

    fn line(tool: Tool, id: &str, points: Vec<f32>) -> Line {
        Line::new(tool, points, "#000000", 4.0).with_id(id)
    }

    #[test]
    fn plain_click_pulls_in_overlapping_erasers() {
        let layer = layer_with(vec![
            line(Tool::Brush, "stroke", vec![0.0, 0.0, 50.0, 50.0]),
            line(Tool::Eraser, "near", vec![40.0, 40.0, 60.0, 60.0]),
            line(Tool::Eraser, "far", vec![300.0, 300.0, 310.0, 310.0]),
        ]);
        let mut selection = Selection::new();
        assert!(selection.select(&layer, "stroke", false));
        assert!(selection.contains("stroke"));
        assert!(selection.contains("near"));
        assert!(!selection.contains("far"));
    }

    #[test]
    fn selecting_an_eraser_does_not_expand() {
        let layer = layer_with(vec![
            line(Tool::Eraser, "a", vec![0.0, 0.0, 10.0, 10.0]),
            line(Tool::Eraser, "b", vec![5.0, 5.0, 10.0, 10.0]),
        ]);
        let mut selection = Selection::new();
        selection.select(&layer, "a", false);
        assert_eq!(selection.to_vec(), vec!["a".to_string()]);
    }

    #[test]
    fn additive_click_toggles() {
        let layer = layer_with(vec![
            line(Tool::Brush, "a", vec![0.0, 0.0]),
            line(Tool::Brush, "b", vec![100.0, 100.0]),
        ]);
        let mut selection = Selection::new();
        selection.select(&layer, "a", false);
        selection.select(&layer, "b", true);
        assert_eq!(selection.len(), 2);
        selection.select(&layer, "a", true);
        assert_eq!(selection.to_vec(), vec!["b".to_string()]);
        assert!(!selection.select(&layer, "ghost", true));
    }

    #[test]
    fn prune_drops_missing_ids() {
        let layer = layer_with(vec![line(Tool::Brush, "a", vec![0.0, 0.0])]);
        let mut selection = Selection::new();
        selection.extend(["a".to_string(), "gone".to_string()]);
        assert_eq!(selection.prune(Some(&layer)), 1);
        assert!(selection.contains("a"));
        selection.prune(None);
        assert!(selection.is_empty());
    }

    #[test]
    fn selection_box_is_normalised() {
        let mut selection_box = SelectionBox::new(pos2(100.0, 100.0), false);
        selection_box.current = pos2(20.0, 50.0);
        assert_eq!(selection_box.bounds(), Bounds::new(20.0, 50.0, 80.0, 50.0));
    }
}
