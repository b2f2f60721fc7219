use std::collections::HashSet;

use egui::Pos2;

use crate::error::ProjectError;
use crate::geometry::{self, Bounds};
use crate::history::{DEFAULT_MAX_DEPTH, History};
use crate::layer::Layer;
use crate::line::{Line, LinePatch};

/// The scene model: an ordered list of layers, the active layer and the undo history.
///
/// Every structural mutation records a snapshot; visibility, opacity, lock and name changes
/// are cosmetic and do not.
#[derive(Debug, Clone)]
pub struct Document {
    layers: Vec<Layer>,
    active_layer_id: String,
    history: History,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Document {
    pub fn new(max_history_depth: usize) -> Self {
        let background = Layer::background();
        Self {
            active_layer_id: background.id.clone(),
            layers: vec![background],
            history: History::new(max_history_depth),
        }
    }

    /// Rebuilds a document from already validated layers, e.g. hydrated state.
    pub fn from_layers(
        layers: Vec<Layer>,
        active_layer_id: Option<String>,
        max_history_depth: usize,
    ) -> Result<Self, ProjectError> {
        let mut document = Self::new(max_history_depth);
        document.load_project(layers)?;
        if let Some(id) = active_layer_id {
            document.set_active_layer(&id);
        }
        Ok(document)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    pub fn active_layer_id(&self) -> &str {
        &self.active_layer_id
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layer(&self.active_layer_id)
    }

    fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active_layer_id.clone();
        self.layer_mut(&id)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_step(&self) -> usize {
        self.history.step()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn begin_mutation(&mut self) {
        self.history.ensure_baseline(&self.layers);
    }

    fn commit_mutation(&mut self) {
        self.history.save(&self.layers);
    }

    /// Makes `id` the active layer. Returns `false` if there is no such layer.
    pub fn set_active_layer(&mut self, id: &str) -> bool {
        if self.layer(id).is_none() {
            return false;
        }
        self.active_layer_id = id.to_string();
        true
    }

    /// Appends a new layer named after its position and makes it active.
    pub fn add_layer(&mut self) -> String {
        self.begin_mutation();
        let layer = Layer::new(&format!("Layer {}", self.layers.len() + 1));
        let id = layer.id.clone();
        self.layers.push(layer);
        self.active_layer_id = id.clone();
        self.commit_mutation();
        log::debug!("Added layer {id}");
        id
    }

    /// Removes a layer. The last remaining layer can never be deleted.
    ///
    /// If the deleted layer was active, the first remaining layer becomes active.
    pub fn delete_layer(&mut self, id: &str) -> bool {
        if self.layers.len() <= 1 {
            log::warn!("Refusing to delete the only layer {id}");
            return false;
        }
        let Some(index) = self.layers.iter().position(|layer| layer.id == id) else {
            return false;
        };
        self.begin_mutation();
        self.layers.remove(index);
        if self.active_layer_id == id {
            self.active_layer_id = self.layers[0].id.clone();
        }
        self.commit_mutation();
        log::debug!("Deleted layer {id}");
        true
    }

    pub fn toggle_layer_visibility(&mut self, id: &str) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.visible = !layer.visible;
                true
            }
            None => false,
        }
    }

    pub fn update_layer_opacity(&mut self, id: &str, opacity: f32) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.set_opacity(opacity);
                true
            }
            None => false,
        }
    }

    pub fn toggle_layer_lock(&mut self, id: &str) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.locked = !layer.locked;
                true
            }
            None => false,
        }
    }

    pub fn rename_layer(&mut self, id: &str, name: &str) -> bool {
        match self.layer_mut(id) {
            Some(layer) => {
                layer.set_name(name.to_string());
                true
            }
            None => false,
        }
    }

    fn active_layer_editable(&self) -> bool {
        match self.active_layer() {
            Some(layer) if layer.locked => {
                log::warn!("Active layer {} is locked", layer.id);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Appends `line` to the active layer, assigning a fresh id if it has none.
    ///
    /// Returns the id of the stored line, or `None` if the active layer is locked.
    pub fn add_line_to_active_layer(&mut self, mut line: Line) -> Option<String> {
        if !self.active_layer_editable() {
            return None;
        }
        line.ensure_id();
        let id = line.id.clone();
        self.begin_mutation();
        self.active_layer_mut()?.add_line(line);
        self.commit_mutation();
        Some(id)
    }

    /// Merges `patch` into the active-layer line with the given id.
    pub fn update_line_in_active_layer(&mut self, id: &str, patch: &LinePatch) -> bool {
        let Some(index) = self.active_layer().and_then(|layer| layer.line_index(id)) else {
            return false;
        };
        self.update_line_at(index, patch)
    }

    /// Merges `patch` into the active-layer line at a list position.
    pub fn update_line_at(&mut self, index: usize, patch: &LinePatch) -> bool {
        if !self.active_layer_editable() {
            return false;
        }
        if self.active_layer().is_none_or(|layer| index >= layer.lines.len()) {
            return false;
        }
        self.begin_mutation();
        let updated = self
            .active_layer_mut()
            .is_some_and(|layer| layer.update_line_at(index, patch));
        self.commit_mutation();
        updated
    }

    /// Applies several patches to active-layer lines as one history step. Unknown ids are
    /// skipped. Returns how many lines were updated; nothing is recorded when none were.
    pub fn update_lines_in_active_layer(&mut self, patches: &[(String, LinePatch)]) -> usize {
        if patches.is_empty() || !self.active_layer_editable() {
            return 0;
        }
        let Some(layer) = self.active_layer() else {
            return 0;
        };
        let indices: Vec<(usize, &LinePatch)> = patches
            .iter()
            .filter_map(|(id, patch)| layer.line_index(id).map(|index| (index, patch)))
            .collect();
        if indices.is_empty() {
            return 0;
        }
        self.begin_mutation();
        let updated = self.active_layer_mut().map_or(0, |layer| {
            indices
                .into_iter()
                .map(|(index, patch)| layer.update_line_at(index, patch))
                .filter(|updated| *updated)
                .count()
        });
        self.commit_mutation();
        updated
    }

    /// Removes the given lines from the active layer only. Returns how many were removed;
    /// nothing is recorded when none matched.
    pub fn delete_lines<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        if ids.is_empty() || !self.active_layer_editable() {
            return 0;
        }
        let matched = self.active_layer().map_or(0, |layer| {
            layer
                .lines
                .iter()
                .filter(|line| ids.iter().any(|id| id.as_ref() == line.id))
                .count()
        });
        if matched == 0 {
            return 0;
        }
        self.begin_mutation();
        let removed = self
            .active_layer_mut()
            .map_or(0, |layer| layer.remove_lines(ids));
        self.commit_mutation();
        removed
    }

    fn restore(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        if self.layer(&self.active_layer_id).is_none() {
            if let Some(first) = self.layers.first() {
                self.active_layer_id = first.id.clone();
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(layers) => {
                self.restore(layers);
                log::debug!("Undo to step {}", self.history.step());
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(layers) => {
                self.restore(layers);
                log::debug!("Redo to step {}", self.history.step());
                true
            }
            None => false,
        }
    }

    /// Replaces the whole scene. Validation happens before anything is touched, the first
    /// layer becomes active and the history starts over.
    pub fn load_project(&mut self, mut layers: Vec<Layer>) -> Result<(), ProjectError> {
        validate_layers(&mut layers)?;
        self.active_layer_id = layers[0].id.clone();
        self.layers = layers;
        self.history.clear();
        log::info!("Loaded project with {} layers", self.layers.len());
        Ok(())
    }

    /// Topmost line in the active layer under `point`.
    pub fn hit_test(&self, point: Pos2) -> Option<&Line> {
        self.active_layer()
            .and_then(|layer| geometry::hit_test(&layer.lines, point))
    }

    /// Ids of active-layer lines whose selection bounds touch `selection_box`.
    pub fn lines_in_box(&self, selection_box: &Bounds) -> Vec<String> {
        self.active_layer()
            .map(|layer| {
                layer
                    .lines
                    .iter()
                    .filter(|line| !line.id.is_empty())
                    .filter(|line| geometry::line_in_selection_box(line, selection_box))
                    .map(|line| line.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Checks project invariants and fills in missing line ids.
fn validate_layers(layers: &mut [Layer]) -> Result<(), ProjectError> {
    if layers.is_empty() {
        return Err(ProjectError::invalid("a project needs at least one layer"));
    }

    let mut layer_ids = HashSet::new();
    let mut line_ids = HashSet::new();
    for layer in layers.iter_mut() {
        if layer.id.is_empty() || !layer_ids.insert(layer.id.clone()) {
            return Err(ProjectError::invalid(format!(
                "missing or duplicate layer id {:?}",
                layer.id
            )));
        }
        if !layer.opacity.is_finite() || !(0.0..=1.0).contains(&layer.opacity) {
            return Err(ProjectError::invalid(format!(
                "layer {} has opacity {} outside 0..=1",
                layer.id, layer.opacity
            )));
        }
        for line in &mut layer.lines {
            if line.points.len() % 2 != 0 {
                return Err(ProjectError::invalid(format!(
                    "line {:?} has an odd number of coordinates",
                    line.id
                )));
            }
            line.ensure_id();
            if !line_ids.insert(line.id.clone()) {
                return Err(ProjectError::invalid(format!("duplicate line id {}", line.id)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Tool;

    fn stroke(points: Vec<f32>) -> Line {
        Line::new(Tool::Brush, points, "#000000", 5.0)
    }

    #[test]
    fn starts_with_background_layer() {
        let document = Document::default();
        assert_eq!(document.layers().len(), 1);
        assert_eq!(document.active_layer_id(), "layer-1");
        assert!(document.history().is_empty());
    }

    #[test]
    fn last_layer_cannot_be_deleted() {
        let mut document = Document::default();
        assert!(!document.delete_layer("layer-1"));
        assert_eq!(document.layers().len(), 1);
    }

    #[test]
    fn deleting_active_layer_activates_first_remaining() {
        let mut document = Document::default();
        let second = document.add_layer();
        let third = document.add_layer();
        assert_eq!(document.active_layer_id(), third);
        assert!(document.delete_layer(&third));
        assert_eq!(document.active_layer_id(), "layer-1");
        assert!(document.layer(&second).is_some());
    }

    #[test]
    fn new_layers_are_named_by_position() {
        let mut document = Document::default();
        document.add_layer();
        let id = document.add_layer();
        assert_eq!(document.layer(&id).unwrap().name, "Layer 3");
    }

    #[test]
    fn cosmetic_changes_skip_history() {
        let mut document = Document::default();
        assert!(document.toggle_layer_visibility("layer-1"));
        assert!(document.update_layer_opacity("layer-1", 0.5));
        assert!(document.history().is_empty());
        assert!(!document.layers()[0].visible);
    }

    #[test]
    fn add_line_assigns_id_and_records_history() {
        let mut document = Document::default();
        let id = document.add_line_to_active_layer(stroke(vec![0.0, 0.0])).unwrap();
        assert!(id.starts_with("line-"));
        assert_eq!(document.history_step(), 1);
        assert!(document.undo());
        assert!(document.active_layer().unwrap().lines.is_empty());
    }

    #[test]
    fn update_by_id_and_index() {
        let mut document = Document::default();
        let id = document.add_line_to_active_layer(stroke(vec![0.0, 0.0])).unwrap();
        assert!(document.update_line_in_active_layer(&id, &LinePatch::position(4.0, 5.0)));
        assert_eq!(document.active_layer().unwrap().lines[0].x, Some(4.0));
        assert!(document.update_line_at(0, &LinePatch::position(1.0, 1.0)));
        assert!(!document.update_line_at(7, &LinePatch::position(1.0, 1.0)));
        assert!(!document.update_line_in_active_layer("nope", &LinePatch::default()));
        assert_eq!(document.history_step(), 3);
    }

    #[test]
    fn batched_updates_record_one_step() {
        let mut document = Document::default();
        let first = document.add_line_to_active_layer(stroke(vec![0.0, 0.0])).unwrap();
        let second = document.add_line_to_active_layer(stroke(vec![5.0, 5.0])).unwrap();
        let patches = vec![
            (first, LinePatch::position(3.0, 4.0)),
            (second, LinePatch::position(3.0, 4.0)),
            ("missing".to_string(), LinePatch::position(3.0, 4.0)),
        ];
        assert_eq!(document.update_lines_in_active_layer(&patches), 2);
        assert_eq!(document.history_step(), 3);
        assert!(document.active_layer().unwrap().lines.iter().all(|l| l.x == Some(3.0)));

        assert!(document.undo());
        assert!(document.active_layer().unwrap().lines.iter().all(|l| l.x.is_none()));
        assert_eq!(document.update_lines_in_active_layer(&patches[2..]), 0);
        assert_eq!(document.history_step(), 2);
    }

    #[test]
    fn delete_lines_is_scoped_to_active_layer() {
        let mut document = Document::default();
        let first = document.add_line_to_active_layer(stroke(vec![0.0, 0.0])).unwrap();
        document.add_layer();
        let second = document.add_line_to_active_layer(stroke(vec![1.0, 1.0])).unwrap();
        assert_eq!(document.delete_lines(&[first.clone(), second]), 1);
        assert!(document.layer("layer-1").unwrap().contains_line(&first));
        assert_eq!(document.delete_lines(&["missing"]), 0);
    }

    #[test]
    fn locked_layer_refuses_edits() {
        let mut document = Document::default();
        let id = document.add_line_to_active_layer(stroke(vec![0.0, 0.0])).unwrap();
        document.toggle_layer_lock("layer-1");
        assert!(document.add_line_to_active_layer(stroke(vec![1.0, 1.0])).is_none());
        assert!(!document.update_line_in_active_layer(&id, &LinePatch::position(1.0, 1.0)));
        assert_eq!(document.delete_lines(&[id]), 0);
    }

    #[test]
    fn undo_of_add_layer_restores_valid_active_layer() {
        let mut document = Document::default();
        document.add_layer();
        assert!(document.undo());
        assert_eq!(document.layers().len(), 1);
        assert_eq!(document.active_layer_id(), "layer-1");
    }

    #[test]
    fn bad_project_leaves_scene_untouched() {
        let mut document = Document::default();
        document.add_line_to_active_layer(stroke(vec![0.0, 0.0])).unwrap();
        let before = document.layers().to_vec();

        let mut odd = Layer::with_id("x", "X");
        odd.lines.push(stroke(vec![0.0, 0.0, 1.0]));
        assert!(document.load_project(vec![odd]).is_err());
        assert!(document.load_project(Vec::new()).is_err());
        assert_eq!(document.layers(), before.as_slice());
    }

    #[test]
    fn load_resets_history_and_fills_missing_ids() {
        let mut document = Document::default();
        document.add_line_to_active_layer(stroke(vec![0.0, 0.0])).unwrap();

        let mut layer = Layer::with_id("loaded", "Loaded");
        layer.lines.push(stroke(vec![2.0, 2.0]));
        document.load_project(vec![layer]).unwrap();

        assert!(document.history().is_empty());
        assert_eq!(document.active_layer_id(), "loaded");
        assert!(!document.active_layer().unwrap().lines[0].id.is_empty());
        assert!(!document.undo());
    }
}
