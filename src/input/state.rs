use egui::{Pos2, Vec2};

use crate::line::Line;
use crate::selection::SelectionBox;
use crate::tools::text::TextEntry;

/// What the canvas is doing between pointer-down and pointer-up.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// A candidate line is being drawn; it is only committed on pointer-up.
    Drawing { candidate: Line },
    /// The stage follows the pointer; `last` is in screen space.
    Panning { last: Pos2 },
    BoxSelecting(SelectionBox),
    /// The selection is being moved; both points are in world space.
    Dragging { anchor: Pos2, current: Pos2 },
    TextEditing(TextEntry),
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "Idle",
            Interaction::Drawing { .. } => "Drawing",
            Interaction::Panning { .. } => "Panning",
            Interaction::BoxSelecting(_) => "BoxSelecting",
            Interaction::Dragging { .. } => "Dragging",
            Interaction::TextEditing(_) => "TextEditing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn candidate(&self) -> Option<&Line> {
        match self {
            Interaction::Drawing { candidate } => Some(candidate),
            _ => None,
        }
    }

    pub fn selection_box(&self) -> Option<&SelectionBox> {
        match self {
            Interaction::BoxSelecting(selection_box) => Some(selection_box),
            _ => None,
        }
    }

    pub fn text_entry(&self) -> Option<&TextEntry> {
        match self {
            Interaction::TextEditing(entry) => Some(entry),
            _ => None,
        }
    }

    /// World-space offset of an in-progress selection drag.
    pub fn drag_offset(&self) -> Option<Vec2> {
        match self {
            Interaction::Dragging { anchor, current } => Some(*current - *anchor),
            _ => None,
        }
    }
}
