use eframe::egui;

use crate::image::bytes_to_data_uri;

/// A dropped file the editor knows what to do with.
#[derive(Debug, Clone, PartialEq)]
pub enum DroppedAsset {
    /// Contents of a project JSON file
    Project(String),
    /// An image as a data URI, to be used as the reference overlay
    Reference(String),
}

#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up files dropped this frame. Returns true if there is anything to process.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
        !self.dropped_files.is_empty()
    }

    /// Turns the pending dropped files into assets, skipping anything unsupported.
    pub fn process_dropped_files(&mut self) -> Vec<DroppedAsset> {
        std::mem::take(&mut self.dropped_files)
            .iter()
            .filter_map(|file| {
                let name = file_name(file);
                let kind = FileKind::of(file);
                let Some(kind) = kind else {
                    log::warn!("Dropped file is not a supported type: {name}");
                    return None;
                };
                let bytes = read_bytes(file, &name)?;
                log::info!("Processing dropped {kind:?}: {name} ({} bytes)", bytes.len());
                match kind {
                    FileKind::Project => match String::from_utf8(bytes) {
                        Ok(json) => Some(DroppedAsset::Project(json)),
                        Err(err) => {
                            log::error!("Project file {name} is not UTF-8: {err}");
                            None
                        }
                    },
                    FileKind::Image(mime) => {
                        Some(DroppedAsset::Reference(bytes_to_data_uri(&mime, &bytes)))
                    }
                }
            })
            .collect()
    }

    /// Preview files being dragged over the application
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }
        let text = ctx.input(|i| {
            let mut text = "Dropping files:\n".to_owned();
            for file in &i.raw.hovered_files {
                if let Some(path) = &file.path {
                    text += &format!("\n{}", path.display());
                } else if !file.mime.is_empty() {
                    text += &format!("\n{}", file.mime);
                } else {
                    text += "\n(Path not available)";
                }
            }
            text
        });

        let painter =
            ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FileKind {
    Project,
    Image(String),
}

impl FileKind {
    /// Classifies by MIME type first, then by extension.
    fn of(file: &egui::DroppedFile) -> Option<Self> {
        if file.mime == "application/json" {
            return Some(Self::Project);
        }
        if file.mime.starts_with("image/") {
            return Some(Self::Image(file.mime.clone()));
        }
        let name = file_name(file);
        let ext = name.rsplit_once('.')?.1.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Project),
            "png" => Some(Self::Image("image/png".to_owned())),
            "jpg" | "jpeg" => Some(Self::Image("image/jpeg".to_owned())),
            "gif" => Some(Self::Image("image/gif".to_owned())),
            "webp" => Some(Self::Image("image/webp".to_owned())),
            "bmp" => Some(Self::Image("image/bmp".to_owned())),
            _ => None,
        }
    }
}

fn file_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

fn read_bytes(file: &egui::DroppedFile, name: &str) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(path) = &file.path {
            return match std::fs::read(path) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    log::error!("Failed to read dropped file {}: {err}", path.display());
                    None
                }
            };
        }
    }
    log::warn!("Dropped file has no accessible data: {name}");
    None
}
