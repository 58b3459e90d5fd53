use crate::subscriber::{event::RunEvent, view::log_event};

/// Receiver of pipeline events.
pub trait Subscribe: Send + Sync + 'static {
    fn on_event(&self, event: &RunEvent);
    fn name(&self) -> &'static str;
}

/// Subscriber that forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for Journal {
    fn on_event(&self, event: &RunEvent) {
        log_event(event);
    }
    fn name(&self) -> &'static str {
        "journal"
    }
}
