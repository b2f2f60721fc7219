mod bus;
mod events;
mod handlers;

pub use bus::EventBus;
pub use events::FeedbackEvent;
pub use handlers::{LogFeedback, RecordingFeedback};

/// Fire-and-forget receiver of feedback events.
pub trait EventHandler {
    fn notify(&mut self, event: FeedbackEvent);
}
