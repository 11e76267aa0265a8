//! Error types shared across the crate.
//!
//! None of these ever cross the [`Transmitter::send`] or
//! [`Transmitter::flush`] boundary; they are routed to the error callback or
//! logged.
//!
//! [`Transmitter::send`]: crate::Transmitter::send
//! [`Transmitter::flush`]: crate::Transmitter::flush

use thiserror::Error;

/// Outcome of a failed delivery attempt.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The collector answered with a non-success status code.
    #[error("collector responded with HTTP status {0}")]
    Status(u16),
    /// Connection, DNS, TLS or I/O failure before a response was received.
    #[error("network error: {0}")]
    Network(String),
    /// The transport gave up on the payload without a response, e.g. it
    /// panicked mid-delivery.
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Failure raised by a body or header preparer.
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The preparer panicked; the panic was contained.
    #[error("preparer panicked: {0}")]
    Panicked(String),
}

impl PrepareError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Failure to hand a trigger or flush request to the scheduler worker.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The worker thread has exited.
    #[error("scheduler worker is no longer running")]
    Closed,
    /// The worker did not acknowledge within the flush timeout.
    #[error("scheduler worker did not acknowledge in time")]
    Timeout,
}

/// Errors that may occur while building a transmitter.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid transmitter configuration: {0}")]
    InvalidConfig(String),
}
