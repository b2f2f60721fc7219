use serde::{Deserialize, Serialize};

use crate::fill::{DEFAULT_TOLERANCE, FillStrategy};
use crate::history::DEFAULT_MAX_DEPTH;

/// How plain mouse-wheel input is interpreted on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WheelMode {
    /// Ctrl+wheel zooms, plain wheel pans.
    #[default]
    ZoomWithModifier,
    /// Every wheel notch zooms.
    ZoomAlways,
}

/// Editor tunables. Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Number of undo steps kept
    pub history_depth: usize,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Multiplicative zoom factor per wheel notch
    pub zoom_step: f32,
    pub wheel_mode: WheelMode,
    pub fill_strategy: FillStrategy,
    /// Per-channel flood-fill tolerance
    pub fill_tolerance: u8,
    /// Blur-commits of a text entry younger than this are ignored
    pub text_commit_guard_ms: u64,
    pub eraser_size_multiplier: f32,
    pub export_pixel_ratio: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 800.0,
            history_depth: DEFAULT_MAX_DEPTH,
            min_scale: 0.1,
            max_scale: 5.0,
            zoom_step: 1.1,
            wheel_mode: WheelMode::default(),
            fill_strategy: FillStrategy::default(),
            fill_tolerance: DEFAULT_TOLERANCE,
            text_commit_guard_ms: 500,
            eraser_size_multiplier: 1.5,
            export_pixel_ratio: 2.0,
        }
    }
}

impl EditorConfig {
    pub fn canvas_size(&self) -> egui::Vec2 {
        egui::vec2(self.canvas_width, self.canvas_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"history_depth": 5, "fill_strategy": "FloodRaster"}"#).unwrap();
        assert_eq!(config.history_depth, 5);
        assert_eq!(config.fill_strategy, FillStrategy::FloodRaster);
        assert_eq!(config.canvas_width, 1200.0);
        assert_eq!(config.wheel_mode, WheelMode::ZoomWithModifier);
    }
}
