//! Log event representation handed over by the logging frontend.
//!
//! The transmitter treats a [`LogEvent`] as opaque: it is buffered in append
//! order and serialised as part of a batch, nothing more.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::level::Level;

/// Level as it appears in a serialised event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub label: &'static str,
    pub value: u32,
}

impl From<Level> for LevelInfo {
    fn from(level: Level) -> Self {
        Self {
            label: level.as_str(),
            value: level.value(),
        }
    }
}

/// A single structured log event.
///
/// Field order is significant for the wire format: `ts`, `messages`,
/// `bindings`, `level`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEvent {
    /// Creation time in milliseconds since the Unix epoch.
    pub ts: i64,
    /// Message arguments passed to the logging call.
    pub messages: Vec<Value>,
    /// Child-logger bindings, outermost first.
    pub bindings: Vec<Map<String, Value>>,
    pub level: LevelInfo,
}

impl LogEvent {
    /// Construct an event stamped with the current time.
    pub fn new(level: Level, message: impl Into<Value>) -> Self {
        Self::with_timestamp(chrono::Utc::now().timestamp_millis(), level, message)
    }

    /// Construct an event with an explicit timestamp.
    pub fn with_timestamp(ts: i64, level: Level, message: impl Into<Value>) -> Self {
        Self {
            ts,
            messages: vec![message.into()],
            bindings: Vec::new(),
            level: level.into(),
        }
    }

    /// Append another message argument.
    pub fn with_message(mut self, message: impl Into<Value>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Append a set of bindings.
    pub fn with_bindings(mut self, bindings: Map<String, Value>) -> Self {
        self.bindings.push(bindings);
        self
    }

    /// First message rendered as a string, if it is one.
    pub fn message(&self) -> Option<&str> {
        self.messages.first().and_then(Value::as_str)
    }
}
