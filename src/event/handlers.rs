use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{EventHandler, FeedbackEvent};

/// Logs every feedback event at debug level.
#[derive(Debug, Default)]
pub struct LogFeedback;

impl EventHandler for LogFeedback {
    fn notify(&mut self, event: FeedbackEvent) {
        log::debug!("Feedback: {}", event.name());
    }
}

/// Records events into a shared list, for tests and for shells that poll.
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    events: Rc<RefCell<Vec<FeedbackEvent>>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventHandler for RecordingFeedback {
    fn notify(&mut self, event: FeedbackEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;

    #[test]
    fn bus_fans_out_to_every_handler() {
        let bus = EventBus::new();
        let first = RecordingFeedback::new();
        let second = RecordingFeedback::new();
        bus.subscribe(Box::new(first.clone()));
        bus.subscribe(Box::new(second.clone()));
        bus.subscribe(Box::new(LogFeedback));

        bus.emit(FeedbackEvent::StrokeStart);
        bus.emit(FeedbackEvent::Delete);

        assert_eq!(first.events(), vec![FeedbackEvent::StrokeStart, FeedbackEvent::Delete]);
        assert_eq!(second.events().len(), 2);
        assert_eq!(bus.handler_count(), 3);
    }
}
