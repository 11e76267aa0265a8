//! Pending-event buffer shared by the frontend and the delivery path.
//!
//! The buffer is unbounded: there is no backpressure, a long outage or a
//! very long scheduling interval grows it without limit.

use parking_lot::Mutex;

use crate::log_event::LogEvent;

/// Ordered buffer of events awaiting delivery.
#[derive(Debug, Default)]
pub struct BatchCollector {
    pending: Mutex<Vec<LogEvent>>,
}

impl BatchCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `event` to the tail of the current batch.
    pub fn append(&self, event: LogEvent) {
        self.pending.lock().push(event);
    }

    /// Whether the current batch holds any events.
    pub fn is_drainable(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Swap the current batch for an empty one and return its contents.
    ///
    /// Appends racing with the swap land either entirely before it (and are
    /// returned) or entirely after it (and stay pending).
    pub fn take_snapshot(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.pending.lock())
    }
}
