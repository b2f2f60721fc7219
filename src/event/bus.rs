use std::cell::RefCell;

use crate::event::{EventHandler, FeedbackEvent};

/// Broadcasts feedback events to registered handlers. Emitting never fails and never waits
/// on a handler's result.
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Handlers are notified in subscription order.
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn emit(&self, event: FeedbackEvent) {
        // A handler that emits from inside `notify` would re-borrow; drop the nested event.
        let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
            log::warn!("Dropping re-entrant feedback event {}", event.name());
            return;
        };
        for handler in handlers.iter_mut() {
            handler.notify(event);
        }
    }
}
