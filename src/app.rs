use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::event::LogFeedback;
use crate::file_handler::{DroppedAsset, FileHandler};
use crate::gizmo::TransformGizmo;
use crate::input::CanvasInputTranslator;
use crate::panels;
use crate::persistence::PersistedState;
use crate::renderer::Renderer;

pub const APP_NAME: &str = "Pixel Studio";
const STATE_KEY: &str = "pixel_studio_state";
const CONFIG_KEY: &str = "pixel_studio_config";
const DEFAULT_REFERENCE_OPACITY: f32 = 0.5;

/// The eframe shell around an [`Editor`].
///
/// The durable editor state is written to eframe's storage on save. Native builds also
/// keep a state file in the app's storage directory, updated after every change.
pub struct PaintApp {
    pub(crate) editor: Editor,
    // Not available until the creation context is
    pub(crate) renderer: Option<Renderer>,
    pub(crate) input: CanvasInputTranslator,
    pub(crate) file_handler: FileHandler,
    pub(crate) gizmo: TransformGizmo,
    /// Line the gizmo is currently attached to
    pub(crate) gizmo_target: Option<String>,
    /// Entry (by open time) the text box already grabbed focus for
    pub(crate) focused_text_entry: Option<u64>,
    /// Last message shown in the status bar
    pub(crate) status: Option<String>,
    pub(crate) user_name_buffer: String,
}

impl Default for PaintApp {
    fn default() -> Self {
        Self::with_editor(Editor::default())
    }
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = cc
            .storage
            .and_then(|storage| eframe::get_value::<EditorConfig>(storage, CONFIG_KEY))
            .unwrap_or_default();
        let mut editor = Editor::new(config);

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(dir) = eframe::storage_dir(APP_NAME) {
                log::info!("Persisting editor state under {}", dir.display());
                editor.set_store(Box::new(crate::persistence::FileStore::new(dir)));
            }
        }

        if !editor.hydrate_from_store() {
            let stored = cc
                .storage
                .and_then(|storage| eframe::get_value::<PersistedState>(storage, STATE_KEY));
            if let Some(state) = stored {
                if let Err(err) = editor.restore(state) {
                    log::warn!("Ignoring stored state: {err}");
                }
            }
        }

        let mut app = Self::with_editor(editor);
        app.renderer = Some(Renderer::new(cc));
        app
    }

    pub fn with_editor(editor: Editor) -> Self {
        editor.event_bus().subscribe(Box::new(LogFeedback));
        let user_name_buffer = editor.user_name().unwrap_or_default().to_owned();
        Self {
            editor,
            renderer: None,
            input: CanvasInputTranslator::new(),
            file_handler: FileHandler::new(),
            gizmo: TransformGizmo::default(),
            gizmo_target: None,
            focused_text_entry: None,
            status: None,
            user_name_buffer,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.status = Some(message);
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        for asset in self.file_handler.process_dropped_files() {
            match asset {
                DroppedAsset::Project(json) => {
                    if self.editor.load_project_json(&json).is_ok() {
                        self.set_status("Project loaded");
                    }
                }
                DroppedAsset::Reference(data_uri) => {
                    self.editor
                        .set_reference_image(data_uri, DEFAULT_REFERENCE_OPACITY);
                }
            }
        }
    }

    /// Writes the PNG export or project file, or hands it to the browser.
    pub(crate) fn deliver(&mut self, ctx: &egui::Context, file_name: &str, mime: &str, bytes: &[u8]) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (ctx, mime);
            let path = std::env::current_dir()
                .unwrap_or_default()
                .join(file_name);
            match std::fs::write(&path, bytes) {
                Ok(()) => self.set_status(format!("Saved {}", path.display())),
                Err(err) => {
                    log::error!("Failed to write {}: {err}", path.display());
                    self.status = Some(format!("Could not save {file_name}: {err}"));
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            let uri = crate::image::bytes_to_data_uri(mime, bytes);
            ctx.open_url(egui::OpenUrl::new_tab(uri));
            self.set_status(format!("Opened {file_name}"));
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, STATE_KEY, &self.editor.persisted_state());
        eframe::set_value(storage, CONFIG_KEY, self.editor.config());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.editor.poll_pending() > 0 {
            ctx.request_repaint();
        }
        if let Some(notice) = self.editor.take_notice() {
            self.status = Some(notice);
        }
        self.handle_dropped_files(ctx);

        panels::tools_panel(self, ctx);
        panels::layers_panel(self, ctx);
        panels::central_panel(self, ctx);

        if self.editor.pending_count() > 0 {
            ctx.request_repaint();
        }
    }
}
