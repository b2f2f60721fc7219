//! Per-tool behaviour that turns pointer input into lines.

pub mod draw;
pub mod fill;
pub mod mirror;
pub mod text;

pub use draw::{begin_candidate, extend_candidate, finish_candidate};
pub use fill::{canvas_fill, flood_stamp};
pub use mirror::mirror_pair;
pub use text::{TextCommitTrigger, TextEntry, TextOutcome};
