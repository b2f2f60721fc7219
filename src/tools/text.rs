use egui::Pos2;

use crate::line::Line;

/// A floating text box opened by the text tool.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    /// World position the text will be placed at
    pub anchor: Pos2,
    pub text: String,
    /// Clock reading when the box was opened
    pub opened_at_ms: u64,
}

/// Why a text entry is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCommitTrigger {
    /// Enter without shift
    Enter,
    /// Focus left the box, or the user clicked elsewhere on the canvas
    Blur,
}

/// Result of trying to close a text entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TextOutcome {
    /// The entry is still inside its guard window; it stays open.
    Guarded,
    /// Empty or whitespace-only; closed without committing.
    Discarded,
    Commit(Line),
}

impl TextEntry {
    pub fn new(anchor: Pos2, now_ms: u64) -> Self {
        Self {
            anchor,
            text: String::new(),
            opened_at_ms: now_ms,
        }
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.opened_at_ms)
    }

    /// Decides what closing the entry means.
    ///
    /// Blur-triggered closes inside `guard_ms` are ignored, since opening the box moves
    /// focus around. Enter is always honoured.
    pub fn close(
        &self,
        trigger: TextCommitTrigger,
        now_ms: u64,
        guard_ms: u64,
        color: &str,
        size: f32,
    ) -> TextOutcome {
        if trigger == TextCommitTrigger::Blur && self.age_ms(now_ms) < guard_ms {
            return TextOutcome::Guarded;
        }
        if self.text.trim().is_empty() {
            return TextOutcome::Discarded;
        }
        TextOutcome::Commit(Line::new_text(self.text.clone(), self.anchor, color, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn entry(text: &str) -> TextEntry {
        TextEntry {
            text: text.to_string(),
            ..TextEntry::new(pos2(10.0, 20.0), 1_000)
        }
    }

    #[test]
    fn early_blur_is_guarded() {
        let outcome = entry("hi").close(TextCommitTrigger::Blur, 1_200, 500, "#000000", 5.0);
        assert_eq!(outcome, TextOutcome::Guarded);
    }

    #[test]
    fn enter_ignores_guard() {
        let outcome = entry("hi").close(TextCommitTrigger::Enter, 1_010, 500, "#000000", 5.0);
        let TextOutcome::Commit(line) = outcome else {
            panic!("expected a commit, got {outcome:?}");
        };
        assert_eq!(line.text.as_deref(), Some("hi"));
        assert_eq!(line.x, Some(10.0));
        assert_eq!(line.y, Some(20.0));
    }

    #[test]
    fn whitespace_is_discarded() {
        let outcome = entry("   ").close(TextCommitTrigger::Blur, 2_000, 500, "#000000", 5.0);
        assert_eq!(outcome, TextOutcome::Discarded);
    }
}
