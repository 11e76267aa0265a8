//! Test helpers shared by unit and integration tests.
//!
//! Compiled for unit tests and, through the `test-util` feature, for the
//! integration tests under `tests/`.

mod recording_transport;

pub use recording_transport::{Delivery, RecordingTransport};

use crate::level::Level;
use crate::log_event::LogEvent;

/// Event with a fixed timestamp so payloads are easy to compare.
pub fn event(message: &str) -> LogEvent {
    LogEvent::with_timestamp(1_700_000_000_000, Level::Info, message)
}

/// Messages contained in a default-encoded JSON payload, in order.
pub fn messages_in(payload: &str) -> Vec<String> {
    let parsed: Vec<serde_json::Value> = serde_json::from_str(payload).unwrap_or_default();
    parsed
        .iter()
        .filter_map(|e| e["messages"][0].as_str().map(str::to_owned))
        .collect()
}

/// Shared capture logger for unit tests.
///
/// `logtest` can only install its global logger once per process, so every
/// test goes through this helper; queued records from earlier tests are
/// discarded before it is handed out.
#[cfg(test)]
pub fn capture_logs() -> logtest::Logger {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = logtest::Logger::start();
    });
    let mut logger = logtest::Logger;
    while logger.pop().is_some() {}
    logger
}
