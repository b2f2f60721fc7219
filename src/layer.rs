use serde::{Deserialize, Serialize};

use crate::id_generator::{INITIAL_LAYER_ID, generate_layer_id};
use crate::line::{Line, LinePatch};

fn default_opacity() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// An ordered, independently toggleable group of lines. Lines paint bottom to top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique, stable identifier
    pub id: String,
    /// Display name of the layer
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Opacity in `0.0..=1.0`
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl Layer {
    pub fn new(name: &str) -> Self {
        Self::with_id(generate_layer_id(), name)
    }

    pub fn with_id(id: impl Into<String>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            visible: true,
            locked: false,
            opacity: 1.0,
            lines: Vec::new(),
        }
    }

    /// The layer every new document starts with.
    pub fn background() -> Self {
        Self::with_id(INITIAL_LAYER_ID, "Background")
    }

    pub fn line(&self, id: &str) -> Option<&Line> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn line_index(&self, id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    pub fn contains_line(&self, id: &str) -> bool {
        self.line_index(id).is_some()
    }

    pub fn add_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// Merges `patch` into the line at `index`. Returns `false` if there is no such line.
    pub fn update_line_at(&mut self, index: usize, patch: &LinePatch) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                patch.apply(line);
                true
            }
            None => false,
        }
    }

    /// Removes every line whose id is in `ids`; returns how many were removed.
    pub fn remove_lines<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let before = self.lines.len();
        self.lines
            .retain(|line| !ids.iter().any(|id| id.as_ref() == line.id));
        before - self.lines.len()
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }
}
