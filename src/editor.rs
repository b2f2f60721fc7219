//! The editor state container.
//!
//! `Editor` owns everything the canvas needs (scene, selection, viewport, the in-progress
//! interaction, brush settings) and is passed explicitly to whoever drives it. Input arrives
//! as [`InputEvent`]s; every scene mutation goes through [`Document`] so it lands in the
//! undo history, and is followed by selection pruning and a persist.

use egui::{Key, Modifiers, PointerButton, Pos2, Vec2};

use crate::config::{EditorConfig, WheelMode};
use crate::document::Document;
use crate::error::{ExportError, ProjectError};
use crate::event::{EventBus, FeedbackEvent};
use crate::export::{self, ExportRequest};
use crate::fill::FillStrategy;
use crate::image::{RasterImage, decode_data_uri};
use crate::input::{InputEvent, Interaction, TouchPan};
use crate::layer::Layer;
use crate::line::{Line, LinePatch, Tool};
use crate::persistence::{
    DEFAULT_BRUSH_COLOR, DEFAULT_BRUSH_SIZE, DEFAULT_USER_COLOR, PersistedState, StateStore,
    strip_filled_images,
};
use crate::render::ReferenceOverlay;
use crate::selection::{Selection, SelectionBox};
use crate::tools::{self, TextCommitTrigger, TextEntry, TextOutcome};
use crate::util::time::{Clock, SystemClock};
use crate::viewport::Viewport;

pub const MIN_BRUSH_SIZE: f32 = 1.0;
pub const MAX_BRUSH_SIZE: f32 = 100.0;

/// A decoded tracing image shown above the layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    pub data_uri: String,
    pub image: RasterImage,
    pub opacity: f32,
}

/// Work whose result arrives after the event that started it. Each item remembers the
/// generation it was issued at and is dropped if the editor has moved on since.
#[derive(Debug, Clone, PartialEq)]
enum PendingWork {
    ReferenceDecode {
        generation: u64,
        data_uri: String,
        opacity: f32,
    },
    FillStamp {
        generation: u64,
        layer_id: String,
        line: Line,
    },
}

impl PendingWork {
    fn generation(&self) -> u64 {
        match self {
            PendingWork::ReferenceDecode { generation, .. }
            | PendingWork::FillStamp { generation, .. } => *generation,
        }
    }
}

pub struct Editor {
    config: EditorConfig,
    document: Document,
    selection: Selection,
    viewport: Viewport,
    interaction: Interaction,
    touch_pan: TouchPan,
    active_tool: Tool,
    brush_color: String,
    brush_size: f32,
    user_name: Option<String>,
    user_color: String,
    space_held: bool,
    /// Last pointer position in world space, for the brush cursor preview
    cursor: Option<Pos2>,
    mirror_axis_visible: bool,
    reference: Option<ReferenceImage>,
    generation: u64,
    /// Bumped on every durable change, so renderers know when to redraw the scene
    revision: u64,
    pending: Vec<PendingWork>,
    notice: Option<String>,
    events: EventBus,
    store: Option<Box<dyn StateStore>>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("active_tool", &self.active_tool)
            .field("active_layer", &self.document.active_layer_id())
            .field("interaction", &self.interaction.name())
            .field("selection", &self.selection.len())
            .field("generation", &self.generation)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            document: Document::new(config.history_depth),
            viewport: Viewport::new(config.min_scale, config.max_scale),
            config,
            selection: Selection::new(),
            interaction: Interaction::Idle,
            touch_pan: TouchPan::default(),
            active_tool: Tool::default(),
            brush_color: DEFAULT_BRUSH_COLOR.to_string(),
            brush_size: DEFAULT_BRUSH_SIZE,
            user_name: None,
            user_color: DEFAULT_USER_COLOR.to_string(),
            space_held: false,
            cursor: None,
            mirror_axis_visible: false,
            reference: None,
            generation: 0,
            revision: 0,
            pending: Vec::new(),
            notice: None,
            events: EventBus::new(),
            store: None,
            clock,
        }
    }

    /// Attaches the persistence collaborator. Every later mutation is persisted to it.
    pub fn set_store(&mut self, store: Box<dyn StateStore>) {
        self.store = Some(store);
    }

    /// Restores the state last persisted to the attached store, if any.
    pub fn hydrate_from_store(&mut self) -> bool {
        let hydrated = match self.store.as_ref().map(|store| store.hydrate()) {
            Some(Ok(Some(state))) => state,
            Some(Ok(None)) | None => return false,
            Some(Err(err)) => {
                log::warn!("Could not hydrate editor state: {err}");
                return false;
            }
        };
        match self.restore(hydrated) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Ignoring persisted state: {err}");
                false
            }
        }
    }

    /// Replaces the durable state wholesale. Nothing is persisted and the history starts
    /// over.
    pub fn restore(&mut self, state: PersistedState) -> Result<(), ProjectError> {
        self.document.load_project(state.layers)?;
        self.document.set_active_layer(&state.active_layer_id);
        self.brush_color = state.brush_color;
        self.brush_size = clamp_brush_size(state.brush_size);
        self.active_tool = state.active_tool;
        self.user_name = state.user_name;
        self.user_color = state.user_color;
        if state.canvas_width > 0.0 && state.canvas_height > 0.0 {
            self.config.canvas_width = state.canvas_width;
            self.config.canvas_height = state.canvas_height;
        }
        self.reset_transient();
        self.revision = self.revision.wrapping_add(1);
        Ok(())
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            layers: strip_filled_images(self.document.layers()),
            active_layer_id: self.document.active_layer_id().to_string(),
            brush_color: self.brush_color.clone(),
            brush_size: self.brush_size,
            active_tool: self.active_tool,
            user_name: self.user_name.clone(),
            user_color: self.user_color.clone(),
            canvas_width: self.config.canvas_width,
            canvas_height: self.config.canvas_height,
        }
    }

    fn persist(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        if self.store.is_none() {
            return;
        }
        let state = self.persisted_state();
        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.persist(&state) {
                log::warn!("Failed to persist editor state: {err}");
            }
        }
    }

    /// Housekeeping after every scene mutation.
    fn after_mutation(&mut self) {
        let dropped = self.selection.prune(self.document.active_layer());
        if dropped > 0 {
            log::debug!("Pruned {dropped} stale ids from the selection");
        }
        self.persist();
    }

    /// Invalidates in-flight async work and forgets transient UI state.
    fn reset_transient(&mut self) {
        self.generation += 1;
        self.selection.clear();
        self.interaction = Interaction::Idle;
        self.touch_pan.end();
    }

    // ---- accessors -------------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layers(&self) -> &[Layer] {
        self.document.layers()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn active_tool(&self) -> Tool {
        self.active_tool
    }

    pub fn brush_color(&self) -> &str {
        &self.brush_color
    }

    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn user_color(&self) -> &str {
        &self.user_color
    }

    pub fn cursor(&self) -> Option<Pos2> {
        self.cursor
    }

    pub fn is_space_held(&self) -> bool {
        self.space_held
    }

    pub fn mirror_axis_visible(&self) -> bool {
        self.mirror_axis_visible
    }

    pub fn reference(&self) -> Option<&ReferenceImage> {
        self.reference.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    /// Takes the last human-readable failure, e.g. a rejected project file.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn candidate(&self) -> Option<&Line> {
        self.interaction.candidate()
    }

    pub fn selection_box(&self) -> Option<&SelectionBox> {
        self.interaction.selection_box()
    }

    pub fn text_entry(&self) -> Option<&TextEntry> {
        self.interaction.text_entry()
    }

    pub fn drag_offset(&self) -> Option<Vec2> {
        self.interaction.drag_offset()
    }

    // ---- settings --------------------------------------------------------------------

    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.active_tool {
            return;
        }
        if self.text_entry().is_some() {
            self.commit_text(TextCommitTrigger::Enter);
        }
        log::debug!("Tool {} -> {}", self.active_tool.name(), tool.name());
        self.active_tool = tool;
        self.reset_transient();
        self.persist();
    }

    pub fn set_brush_color(&mut self, color: impl Into<String>) {
        self.brush_color = color.into();
        self.persist();
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush_size = clamp_brush_size(size);
        self.persist();
    }

    pub fn set_user(&mut self, name: Option<String>, color: impl Into<String>) {
        self.user_name = name;
        self.user_color = color.into();
        self.persist();
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.config.canvas_width = width;
            self.config.canvas_height = height;
            self.persist();
        }
    }

    pub fn set_fill_strategy(&mut self, strategy: FillStrategy) {
        self.config.fill_strategy = strategy;
    }

    pub fn toggle_mirror_axis(&mut self) {
        self.mirror_axis_visible = !self.mirror_axis_visible;
    }

    // ---- layers ----------------------------------------------------------------------

    pub fn add_layer(&mut self) -> String {
        let id = self.document.add_layer();
        self.reset_transient();
        self.after_mutation();
        id
    }

    pub fn delete_layer(&mut self, id: &str) -> bool {
        let is_last = self.document.layers().len() == 1 && self.document.layer(id).is_some();
        if !self.document.delete_layer(id) {
            if is_last {
                self.notice = Some("The last layer cannot be deleted".to_string());
            }
            return false;
        }
        self.reset_transient();
        self.after_mutation();
        true
    }

    pub fn set_active_layer(&mut self, id: &str) -> bool {
        if self.document.active_layer_id() == id {
            return true;
        }
        if !self.document.set_active_layer(id) {
            return false;
        }
        self.reset_transient();
        self.persist();
        true
    }

    pub fn rename_layer(&mut self, id: &str, name: &str) -> bool {
        let renamed = self.document.rename_layer(id, name);
        if renamed {
            self.persist();
        }
        renamed
    }

    pub fn toggle_layer_visibility(&mut self, id: &str) -> bool {
        let toggled = self.document.toggle_layer_visibility(id);
        if toggled {
            self.persist();
        }
        toggled
    }

    pub fn set_layer_opacity(&mut self, id: &str, opacity: f32) -> bool {
        let updated = self.document.update_layer_opacity(id, opacity);
        if updated {
            self.persist();
        }
        updated
    }

    pub fn toggle_layer_lock(&mut self, id: &str) -> bool {
        let toggled = self.document.toggle_layer_lock(id);
        if toggled {
            self.persist();
        }
        toggled
    }

    // ---- lines -----------------------------------------------------------------------

    fn commit_line(&mut self, line: Line) -> Option<String> {
        let id = self.document.add_line_to_active_layer(line);
        if id.is_none() {
            self.notice = Some("The active layer is locked".to_string());
        }
        id
    }

    fn commit_candidate(&mut self, candidate: Line) {
        let line = tools::finish_candidate(candidate);
        let committed = if line.tool == Tool::Mirror {
            let [original, reflected] = tools::mirror_pair(line, self.config.canvas_width);
            let first = self.commit_line(original).is_some();
            first && self.commit_line(reflected).is_some()
        } else {
            self.commit_line(line).is_some()
        };
        if committed {
            self.events.emit(FeedbackEvent::StrokeCommit);
        }
        self.after_mutation();
    }

    /// Click selection. Only honoured while the select tool is active.
    pub fn select_shape(&mut self, id: &str, additive: bool) -> bool {
        if self.active_tool != Tool::Select {
            return false;
        }
        match self.document.active_layer() {
            Some(layer) => self.selection.select(layer, id, additive),
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Commits the final position of a dragged line.
    pub fn drag_end(&mut self, id: &str, x: f32, y: f32) -> bool {
        let moved = self
            .document
            .update_line_in_active_layer(id, &LinePatch::position(x, y));
        if moved {
            self.after_mutation();
        }
        moved
    }

    /// Commits position, rotation and scale of a transformed line in one step.
    pub fn transform_end(
        &mut self,
        id: &str,
        x: f32,
        y: f32,
        rotation: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> bool {
        let patch = LinePatch::transform(x, y, rotation, scale_x, scale_y);
        let transformed = self.document.update_line_in_active_layer(id, &patch);
        if transformed {
            self.after_mutation();
        }
        transformed
    }

    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let ids = self.selection.to_vec();
        let removed = self.document.delete_lines(&ids);
        self.selection.clear();
        if removed > 0 {
            self.events.emit(FeedbackEvent::Delete);
            self.after_mutation();
        }
        removed
    }

    pub fn undo(&mut self) -> bool {
        if !self.document.undo() {
            return false;
        }
        self.reset_transient();
        self.persist();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.document.redo() {
            return false;
        }
        self.reset_transient();
        self.persist();
        true
    }

    // ---- project I/O -----------------------------------------------------------------

    /// Replaces the scene with `layers`. On failure the scene is untouched and a notice is
    /// left for the shell.
    pub fn load_project(&mut self, layers: Vec<Layer>) -> Result<(), ProjectError> {
        if let Err(err) = self.document.load_project(layers) {
            log::warn!("Rejected project: {err}");
            self.notice = Some(format!("Could not load project: {err}"));
            return Err(err);
        }
        self.reset_transient();
        self.persist();
        Ok(())
    }

    pub fn load_project_json(&mut self, json: &str) -> Result<(), ProjectError> {
        match export::parse_project_json(json) {
            Ok(layers) => self.load_project(layers),
            Err(err) => {
                log::warn!("Rejected project file: {err}");
                self.notice = Some(format!("Could not load project: {err}"));
                Err(err)
            }
        }
    }

    pub fn save_project_json(&self) -> Result<String, ExportError> {
        export::save_project_json(self.document.layers())
    }

    /// PNG of the composed scene at the configured pixel ratio, stamped with the user name
    /// and the current local time.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        let watermark = export::watermark_text(self.user_name.as_deref(), &chrono::Local::now());
        self.export_png_with(Some(watermark))
    }

    pub fn export_png_with(&self, watermark: Option<String>) -> Result<Vec<u8>, ExportError> {
        let request = ExportRequest {
            canvas_width: self.config.canvas_width,
            canvas_height: self.config.canvas_height,
            pixel_ratio: self.config.export_pixel_ratio,
            watermark,
            reference: self.reference.as_ref().map(|reference| ReferenceOverlay {
                image: &reference.image,
                opacity: reference.opacity,
            }),
        };
        export::export_png(self.document.layers(), &request)
    }

    // ---- reference image and async work ----------------------------------------------

    /// Queues decoding of a tracing image; it appears once [`Editor::poll_pending`] runs.
    pub fn set_reference_image(&mut self, data_uri: impl Into<String>, opacity: f32) {
        self.pending.push(PendingWork::ReferenceDecode {
            generation: self.generation,
            data_uri: data_uri.into(),
            opacity: opacity.clamp(0.0, 1.0),
        });
    }

    pub fn set_reference_opacity(&mut self, opacity: f32) {
        if let Some(reference) = self.reference.as_mut() {
            reference.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn clear_reference_image(&mut self) {
        self.reference = None;
    }

    /// Applies queued async results that are still current. Returns how many were applied.
    pub fn poll_pending(&mut self) -> usize {
        let mut applied = 0;
        for work in std::mem::take(&mut self.pending) {
            if work.generation() != self.generation {
                log::warn!(
                    "Dropping stale async result from generation {} (now {})",
                    work.generation(),
                    self.generation
                );
                continue;
            }
            match work {
                PendingWork::ReferenceDecode {
                    data_uri, opacity, ..
                } => match decode_data_uri(&data_uri) {
                    Ok(image) => {
                        self.reference = Some(ReferenceImage {
                            data_uri,
                            image,
                            opacity,
                        });
                        applied += 1;
                    }
                    Err(err) => {
                        log::warn!("Reference image rejected: {err}");
                        self.notice = Some(format!("Could not load reference image: {err}"));
                    }
                },
                PendingWork::FillStamp { layer_id, line, .. } => {
                    if self.document.active_layer_id() != layer_id {
                        continue;
                    }
                    if self.commit_line(line).is_some() {
                        self.events.emit(FeedbackEvent::StrokeCommit);
                        self.after_mutation();
                        applied += 1;
                    }
                }
            }
        }
        applied
    }

    fn fill_at(&mut self, world: Pos2) {
        match self.config.fill_strategy {
            FillStrategy::CanvasRect => {
                let line = tools::canvas_fill(
                    &self.brush_color,
                    self.config.canvas_width,
                    self.config.canvas_height,
                );
                if self.commit_line(line).is_some() {
                    self.events.emit(FeedbackEvent::StrokeCommit);
                    self.after_mutation();
                }
            }
            FillStrategy::FloodRaster => {
                let Some(layer) = self.document.active_layer() else {
                    return;
                };
                let stamp = tools::flood_stamp(
                    layer,
                    self.config.canvas_width.round().max(1.0) as u32,
                    self.config.canvas_height.round().max(1.0) as u32,
                    world,
                    &self.brush_color,
                    self.config.fill_tolerance,
                );
                match stamp {
                    Ok(Some(line)) => {
                        let layer_id = layer.id.clone();
                        self.pending.push(PendingWork::FillStamp {
                            generation: self.generation,
                            layer_id,
                            line,
                        });
                    }
                    Ok(None) => log::debug!("Flood fill at {world:?} changed nothing"),
                    Err(err) => {
                        log::warn!("Flood fill failed: {err}");
                        self.notice = Some(format!("Fill failed: {err}"));
                    }
                }
            }
        }
    }

    // ---- text ------------------------------------------------------------------------

    /// Replaces the text of the open text box.
    pub fn set_text_input(&mut self, text: impl Into<String>) {
        if let Interaction::TextEditing(entry) = &mut self.interaction {
            entry.text = text.into();
        }
    }

    /// Tries to close the open text box. Returns `true` if a text line was committed.
    pub fn commit_text(&mut self, trigger: TextCommitTrigger) -> bool {
        let Interaction::TextEditing(entry) = &self.interaction else {
            return false;
        };
        let outcome = entry.close(
            trigger,
            self.clock.now_ms(),
            self.config.text_commit_guard_ms,
            &self.brush_color,
            self.brush_size,
        );
        match outcome {
            TextOutcome::Guarded => false,
            TextOutcome::Discarded => {
                self.interaction = Interaction::Idle;
                false
            }
            TextOutcome::Commit(line) => {
                self.interaction = Interaction::Idle;
                let committed = self.commit_line(line).is_some();
                if committed {
                    self.events.emit(FeedbackEvent::TextCommit);
                    self.after_mutation();
                }
                committed
            }
        }
    }

    pub fn cancel_text(&mut self) {
        if self.text_entry().is_some() {
            self.interaction = Interaction::Idle;
        }
    }

    // ---- input -----------------------------------------------------------------------

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown {
                pos,
                button,
                modifiers,
            } => self.pointer_down(pos, button, modifiers),
            InputEvent::PointerMove { pos } => self.pointer_move(pos),
            InputEvent::PointerUp { pos, button } => self.pointer_up(pos, button),
            InputEvent::PointerLeave => self.pointer_leave(),
            InputEvent::Wheel {
                pos,
                delta,
                modifiers,
            } => self.wheel(pos, delta, modifiers),
            InputEvent::Touch { contacts } => self.touch(&contacts),
            InputEvent::KeyDown {
                key,
                modifiers,
                repeat,
            } => self.key_down(key, modifiers, repeat),
            InputEvent::KeyUp { key } => {
                if key == Key::Space {
                    self.space_held = false;
                }
            }
        }
    }

    fn pointer_down(&mut self, pos: Pos2, button: PointerButton, modifiers: Modifiers) {
        if self.touch_pan.is_active() {
            return;
        }
        if button == PointerButton::Middle || (button == PointerButton::Primary && self.space_held)
        {
            self.interaction = Interaction::Panning { last: pos };
            return;
        }
        if button != PointerButton::Primary {
            return;
        }

        let world = self.viewport.screen_to_world(pos);
        if self.text_entry().is_some() {
            // Clicking outside the box is a blur; inside the guard window it is ignored.
            self.commit_text(TextCommitTrigger::Blur);
            return;
        }

        match self.active_tool {
            Tool::Select => self.begin_select(world, modifiers.shift),
            Tool::Text => {
                let entry = TextEntry::new(world, self.clock.now_ms());
                self.interaction = Interaction::TextEditing(entry);
            }
            Tool::Fill => self.fill_at(world),
            tool => {
                let candidate = tools::begin_candidate(
                    tool,
                    world,
                    &self.brush_color,
                    self.brush_size,
                    self.config.eraser_size_multiplier,
                );
                self.interaction = Interaction::Drawing { candidate };
                self.events.emit(FeedbackEvent::StrokeStart);
            }
        }
    }

    fn begin_select(&mut self, world: Pos2, additive: bool) {
        let hit = self.document.hit_test(world).map(|line| line.id.clone());
        match hit {
            Some(id) => {
                self.select_shape(&id, additive);
                if self.selection.contains(&id) {
                    self.interaction = Interaction::Dragging {
                        anchor: world,
                        current: world,
                    };
                }
            }
            None => {
                if !additive {
                    self.selection.clear();
                }
                self.interaction = Interaction::BoxSelecting(SelectionBox::new(world, additive));
            }
        }
    }

    fn pointer_move(&mut self, pos: Pos2) {
        let world = self.viewport.screen_to_world(pos);
        match &mut self.interaction {
            Interaction::Panning { last } => {
                let delta = pos - *last;
                *last = pos;
                self.viewport.pan_by(delta);
                return;
            }
            Interaction::BoxSelecting(selection_box) => selection_box.current = world,
            Interaction::Dragging { current, .. } => *current = world,
            Interaction::Drawing { candidate } => tools::extend_candidate(candidate, world),
            Interaction::Idle | Interaction::TextEditing(_) => {}
        }
        self.cursor = Some(world);
    }

    fn pointer_up(&mut self, pos: Pos2, button: PointerButton) {
        if let Interaction::Drawing { .. } | Interaction::BoxSelecting(_) = self.interaction {
            if button != PointerButton::Primary {
                return;
            }
        }
        let world = self.viewport.screen_to_world(pos);
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle | Interaction::Panning { .. } => {}
            Interaction::TextEditing(entry) => {
                self.interaction = Interaction::TextEditing(entry);
            }
            Interaction::BoxSelecting(mut selection_box) => {
                selection_box.current = world;
                let hits = self.document.lines_in_box(&selection_box.bounds());
                log::debug!("Box selection picked {} lines", hits.len());
                self.selection.extend(hits);
            }
            Interaction::Dragging { anchor, .. } => self.finish_drag(world - anchor),
            Interaction::Drawing { mut candidate } => {
                if candidate.tool.is_shape() {
                    tools::extend_candidate(&mut candidate, world);
                }
                self.commit_candidate(candidate);
            }
        }
    }

    fn finish_drag(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        let Some(layer) = self.document.active_layer() else {
            return;
        };
        let moves: Vec<(String, LinePatch)> = self
            .selection
            .ids()
            .filter_map(|id| layer.line(id))
            .map(|line| {
                let offset = line.offset() + delta;
                (line.id.clone(), LinePatch::position(offset.x, offset.y))
            })
            .collect();
        if self.document.update_lines_in_active_layer(&moves) > 0 {
            self.after_mutation();
        }
    }

    /// Abandons whatever gesture was in progress without committing it.
    fn pointer_leave(&mut self) {
        self.cursor = None;
        match self.interaction {
            Interaction::Drawing { .. }
            | Interaction::BoxSelecting(_)
            | Interaction::Dragging { .. }
            | Interaction::Panning { .. } => {
                log::debug!("Pointer left during {}, cancelling", self.interaction.name());
                self.interaction = Interaction::Idle;
            }
            Interaction::Idle | Interaction::TextEditing(_) => {}
        }
    }

    fn wheel(&mut self, pos: Pos2, delta: Vec2, modifiers: Modifiers) {
        let zoom = match self.config.wheel_mode {
            WheelMode::ZoomAlways => true,
            WheelMode::ZoomWithModifier => modifiers.ctrl || modifiers.command,
        };
        if !zoom {
            self.viewport.pan_by(-delta);
            return;
        }
        if delta.y != 0.0 {
            self.viewport
                .zoom_step_at(pos, delta.y < 0.0, self.config.zoom_step);
        }
    }

    fn touch(&mut self, contacts: &[Pos2]) {
        if contacts.len() < 2 {
            self.touch_pan.end();
            return;
        }
        if !self.touch_pan.is_active() {
            self.touch_pan.begin(contacts);
            if !matches!(self.interaction, Interaction::TextEditing(_)) {
                self.interaction = Interaction::Idle;
            }
            return;
        }
        if let Some(delta) = self.touch_pan.update(contacts) {
            self.viewport.pan_by(delta);
        }
    }

    fn key_down(&mut self, key: Key, modifiers: Modifiers, repeat: bool) {
        let editing_text = self.text_entry().is_some();
        let ctrl = modifiers.ctrl || modifiers.command;
        match key {
            Key::Space if !repeat && !editing_text => self.space_held = true,
            Key::Delete | Key::Backspace if !editing_text => {
                self.delete_selected();
            }
            Key::Z if ctrl && !editing_text => {
                if modifiers.shift {
                    self.redo();
                } else {
                    self.undo();
                }
            }
            Key::Y if ctrl && !editing_text => {
                self.redo();
            }
            Key::Enter if editing_text && !modifiers.shift => {
                self.commit_text(TextCommitTrigger::Enter);
            }
            Key::Escape => {
                if editing_text {
                    self.cancel_text();
                } else if self.selection_box().is_some() {
                    self.interaction = Interaction::Idle;
                }
            }
            _ => {}
        }
    }
}

fn clamp_brush_size(size: f32) -> f32 {
    if size.is_finite() {
        size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
    } else {
        DEFAULT_BRUSH_SIZE
    }
}
