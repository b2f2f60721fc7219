//! Device-independent input for the editor.
//!
//! Positions are in screen space (the canvas widget's pixels); the editor maps them to
//! world space through its viewport.

use egui::{Key, Modifiers, PointerButton, Pos2, Vec2};

pub mod gestures;
mod router;
pub mod state;

pub use gestures::TouchPan;
pub use router::CanvasInputTranslator;
pub use state::Interaction;

/// Represents different types of input events the canvas can receive
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A pointer button was pressed
    PointerDown {
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// The pointer moved, with or without buttons held
    PointerMove { pos: Pos2 },
    /// A pointer button was released
    PointerUp { pos: Pos2, button: PointerButton },
    /// The pointer left the canvas; any gesture in progress is abandoned
    PointerLeave,
    /// Wheel or trackpad scroll at `pos`. Positive `delta.y` scrolls down, as in browsers.
    Wheel {
        pos: Pos2,
        delta: Vec2,
        modifiers: Modifiers,
    },
    /// Active touch contacts changed; `contacts` holds every finger currently down
    Touch { contacts: Vec<Pos2> },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
        repeat: bool,
    },
    KeyUp { key: Key },
}

impl InputEvent {
    pub fn pointer_down(pos: Pos2) -> Self {
        Self::PointerDown {
            pos,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(pos: Pos2) -> Self {
        Self::PointerUp {
            pos,
            button: PointerButton::Primary,
        }
    }

    pub fn key(key: Key, modifiers: Modifiers) -> Self {
        Self::KeyDown {
            key,
            modifiers,
            repeat: false,
        }
    }
}
