/// Moments the feedback collaborator (sounds, haptics) cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackEvent {
    /// A stroke or shape began
    StrokeStart,
    /// A stroke, shape or fill was committed
    StrokeCommit,
    TextCommit,
    /// Lines were deleted
    Delete,
}

impl FeedbackEvent {
    pub fn name(self) -> &'static str {
        match self {
            FeedbackEvent::StrokeStart => "stroke-start",
            FeedbackEvent::StrokeCommit => "stroke-commit",
            FeedbackEvent::TextCommit => "text-commit",
            FeedbackEvent::Delete => "delete",
        }
    }
}
