//! Optional hooks injected into the delivery path.
//!
//! Each hook is a trait with a blanket implementation for matching closures,
//! so callers can pass `|events: &[LogEvent]| ...` directly.

use crate::error::{PrepareError, TransportError};
use crate::log_event::LogEvent;
use crate::transport::Headers;

/// Turns a drained batch into the wire payload.
pub trait PrepareBody: Send + Sync {
    fn prepare_body(&self, events: &[LogEvent]) -> Result<String, PrepareError>;
}

impl<F> PrepareBody for F
where
    F: Fn(&[LogEvent]) -> Result<String, PrepareError> + Send + Sync,
{
    fn prepare_body(&self, events: &[LogEvent]) -> Result<String, PrepareError> {
        self(events)
    }
}

/// Computes the headers for the next delivery from the current ones.
pub trait PrepareHeaders: Send + Sync {
    fn prepare_headers(&self, current: Option<&Headers>) -> Result<Option<Headers>, PrepareError>;
}

impl<F> PrepareHeaders for F
where
    F: Fn(Option<&Headers>) -> Result<Option<Headers>, PrepareError> + Send + Sync,
{
    fn prepare_headers(&self, current: Option<&Headers>) -> Result<Option<Headers>, PrepareError> {
        self(current)
    }
}

/// Receives failed deliveries together with what was sent.
pub trait ErrorCallback: Send + Sync {
    fn on_error(&self, error: &TransportError, payload: &str, headers: Option<&Headers>);
}

impl<F> ErrorCallback for F
where
    F: Fn(&TransportError, &str, Option<&Headers>) + Send + Sync,
{
    fn on_error(&self, error: &TransportError, payload: &str, headers: Option<&Headers>) {
        self(error, payload, headers)
    }
}

/// Default body encoding: a JSON array in append order.
pub fn encode_json(events: &[LogEvent]) -> Result<String, PrepareError> {
    Ok(serde_json::to_string(events)?)
}
