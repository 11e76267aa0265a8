//! Batching HTTP transmitter for structured log events.
//!
//! Events handed to a [`Transmitter`] are buffered and delivered as one JSON
//! array per flush. Flushes are throttled or debounced on a worker thread
//! until the environment signals unload, after which every event is
//! delivered synchronously on the calling thread.

mod collector;
mod coordinator;
mod error;
mod level;
mod log_event;
mod rate_limited_warner;
mod schedule;
mod transmit;
mod transmitter;
mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use collector::BatchCollector;
pub use coordinator::{
    Capabilities, DeliveryCoordinator, DrainOutcome, ErrorCallback, PrepareBody, PrepareHeaders,
    encode_json,
};
pub use error::{BuildError, PrepareError, ScheduleError, TransportError};
pub use level::Level;
pub use log_event::{LevelInfo, LogEvent};
pub use rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};
pub use schedule::{
    DEFAULT_THROTTLE, DEFAULT_THROTTLE_MS, DrainFn, ImmediateSend, ScheduledSend,
    SchedulingPolicy, SendStrategy, StrategySlot,
};
pub use transmit::Transmit;
pub use transmitter::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_FLUSH_TIMEOUT, DEFAULT_LEVEL, DEFAULT_URL, Transmitter,
    TransmitterBuilder, TransmitterConfig, UnloadHandle,
};
pub use transport::{
    AuthConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DeliveryMode, Headers,
    HttpMethod, HttpTransport, Transport, TransportOptions, select_mode,
};

/// Create a transmitter from `config`.
pub fn create_transmitter(config: TransmitterConfig) -> Transmitter {
    Transmitter::with_config(config)
}
