#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod color;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod event;
pub mod export;
pub mod file_handler;
pub mod fill;
pub mod geometry;
pub mod gizmo;
pub mod history;
pub mod id_generator;
pub mod image;
pub mod input;
pub mod layer;
pub mod line;
pub mod panels;
pub mod persistence;
pub mod render;
pub mod renderer;
pub mod selection;
pub mod texture_manager;
pub mod tools;
pub mod util;
pub mod viewport;

pub use app::{APP_NAME, PaintApp};
pub use config::EditorConfig;
pub use document::Document;
pub use editor::Editor;
pub use error::{DecodeError, ExportError, PersistenceError, ProjectError};
pub use input::{CanvasInputTranslator, InputEvent};
pub use layer::Layer;
pub use line::{Line, LinePatch, Tool};
pub use renderer::Renderer;
