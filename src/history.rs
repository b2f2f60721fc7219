use crate::layer::Layer;

pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Snapshot-based undo/redo over the layer list.
///
/// Entry 0 is the baseline recorded before the first mutation; every later entry is the
/// state right after a mutation. At most `max_depth` undo steps are kept: once the stack
/// holds `max_depth + 1` snapshots the oldest is evicted. The cursor always points at the
/// snapshot matching the live scene.
#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Vec<Layer>>,
    step: usize,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            step: 0,
            max_depth,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Index of the snapshot matching the live scene.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Records `layers` as entry 0 if nothing has been recorded yet.
    pub fn ensure_baseline(&mut self, layers: &[Layer]) {
        if self.stack.is_empty() {
            self.stack.push(layers.to_vec());
            self.step = 0;
        }
    }

    /// Drops any redo entries, appends a deep copy of `layers` and moves the cursor onto it.
    pub fn save(&mut self, layers: &[Layer]) {
        self.stack.truncate(self.step + 1);
        self.stack.push(layers.to_vec());

        let capacity = self.max_depth + 1;
        if self.stack.len() > capacity {
            let excess = self.stack.len() - capacity;
            self.stack.drain(..excess);
        }
        self.step = self.stack.len() - 1;
        log::debug!("History saved: step {} of {}", self.step, self.stack.len());
    }

    /// Steps back and returns a copy of the snapshot to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<Vec<Layer>> {
        if self.step == 0 || self.stack.is_empty() {
            return None;
        }
        self.step -= 1;
        self.stack.get(self.step).cloned()
    }

    /// Steps forward and returns a copy of the snapshot to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<Vec<Layer>> {
        if self.step + 1 >= self.stack.len() {
            return None;
        }
        self.step += 1;
        self.stack.get(self.step).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.step + 1 < self.stack.len()
    }

    /// Forgets every snapshot; the next mutation records a fresh baseline.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Vec<Layer> {
        vec![Layer::with_id("layer-1", name)]
    }

    #[test]
    fn undo_and_redo_walk_the_stack() {
        let mut history = History::new(5);
        history.ensure_baseline(&named("v0"));
        history.save(&named("v1"));
        history.save(&named("v2"));
        assert_eq!(history.step(), 2);

        assert_eq!(history.undo().unwrap()[0].name, "v1");
        assert_eq!(history.undo().unwrap()[0].name, "v0");
        assert!(history.undo().is_none());
        assert_eq!(history.step(), 0);

        assert_eq!(history.redo().unwrap()[0].name, "v1");
        assert_eq!(history.redo().unwrap()[0].name, "v2");
        assert!(history.redo().is_none());
    }

    #[test]
    fn saving_after_undo_truncates_redo_branch() {
        let mut history = History::new(5);
        history.ensure_baseline(&named("v0"));
        history.save(&named("v1"));
        history.save(&named("v2"));
        history.undo();
        history.save(&named("v3"));
        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert_eq!(history.undo().unwrap()[0].name, "v1");
    }

    #[test]
    fn eviction_keeps_cursor_on_latest_entry() {
        let mut history = History::new(3);
        history.ensure_baseline(&named("v0"));
        for i in 1..=10 {
            history.save(&named(&format!("v{i}")));
            assert_eq!(history.step(), history.len() - 1);
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.undo().unwrap()[0].name, "v9");
        assert_eq!(history.undo().unwrap()[0].name, "v8");
        assert_eq!(history.undo().unwrap()[0].name, "v7");
        assert!(history.undo().is_none());
    }

    #[test]
    fn first_save_without_baseline_becomes_entry_zero() {
        let mut history = History::new(3);
        history.save(&named("v1"));
        assert_eq!(history.step(), 0);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn boundary_moves_are_no_ops() {
        let mut history = History::default();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.step(), 0);
    }
}
