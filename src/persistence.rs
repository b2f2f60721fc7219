use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::layer::Layer;
use crate::line::Tool;

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub const DEFAULT_USER_COLOR: &str = "#6366f1";
pub const DEFAULT_BRUSH_COLOR: &str = "#000000";
pub const DEFAULT_BRUSH_SIZE: f32 = 5.0;

/// The durable part of the editor, handed to a [`StateStore`] after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Layers with fill stamps removed
    pub layers: Vec<Layer>,
    pub active_layer_id: String,
    pub brush_color: String,
    pub brush_size: f32,
    pub active_tool: Tool,
    #[serde(default)]
    pub user_name: Option<String>,
    pub user_color: String,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

/// Copies `layers` without the `filledImage` payloads, which are too large to keep around.
pub fn strip_filled_images(layers: &[Layer]) -> Vec<Layer> {
    layers
        .iter()
        .map(|layer| {
            let mut layer = layer.clone();
            for line in &mut layer.lines {
                line.filled_image = None;
            }
            layer
        })
        .collect()
}

/// Key-value home of [`PersistedState`]. The editor does not care what backs it.
pub trait StateStore {
    fn persist(&mut self, state: &PersistedState) -> PersistenceResult<()>;

    /// The last persisted state, or `None` if nothing was ever stored.
    fn hydrate(&self) -> PersistenceResult<Option<PersistedState>>;
}

/// In-memory store. Clones share the same slot, so a test can keep a handle to what the
/// editor persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
    writes: Rc<RefCell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `persist` was called.
    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl StateStore for MemoryStore {
    fn persist(&mut self, state: &PersistedState) -> PersistenceResult<()> {
        let json = serde_json::to_string(state)?;
        *self.slot.borrow_mut() = Some(json);
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn hydrate(&self) -> PersistenceResult<Option<PersistedState>> {
        match self.slot.borrow().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}

/// Stores the state as pretty JSON in a file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where the state file is stored
    state_dir: PathBuf,
    file_name: String,
}

impl FileStore {
    pub const DEFAULT_FILE_NAME: &'static str = "editor_state.json";

    /// Create a store writing to `state_dir`
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            file_name: Self::DEFAULT_FILE_NAME.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.state_dir.join(&self.file_name)
    }
}

impl StateStore for FileStore {
    fn persist(&mut self, state: &PersistedState) -> PersistenceResult<()> {
        // Create state directory if it doesn't exist
        fs::create_dir_all(&self.state_dir)?;

        let json = serde_json::to_string_pretty(state)?;
        fs::write(self.path(), json)?;
        Ok(())
    }

    fn hydrate(&self) -> PersistenceResult<Option<PersistedState>> {
        let path = self.path();
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}
