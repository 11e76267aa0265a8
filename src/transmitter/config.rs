//! Configuration consumed by [`Transmitter`](super::Transmitter).
//!
//! [`TransmitterBuilder`](super::TransmitterBuilder) validates user input
//! and produces these values; `Transmitter::with_config` accepts them
//! directly.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::coordinator::{Capabilities, ErrorCallback, PrepareBody, PrepareHeaders};
use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;
use crate::schedule::DEFAULT_THROTTLE_MS;
use crate::transport::{
    AuthConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, Headers, HttpMethod, Transport,
    TransportOptions,
};

/// Collector path used when no URL is configured.
pub const DEFAULT_URL: &str = "/log";
/// Default bounded capacity of the scheduler command queue.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
/// Longest a caller waits for a flush to be acknowledged.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LEVEL: &str = "info";

#[derive(Clone)]
pub struct TransmitterConfig {
    /// Throttle interval in milliseconds. Clearing both intervals falls back
    /// to the default throttle with a warning.
    pub throttle_ms: Option<u64>,
    /// Debounce interval in milliseconds; wins over `throttle_ms`.
    pub debounce_ms: Option<u64>,
    pub url: String,
    pub method: HttpMethod,
    /// Prefer beacon delivery when the transport supports it.
    pub use_beacon: bool,
    pub headers: Option<Headers>,
    pub auth: AuthConfig,
    /// Level reported to the frontend; carries no behaviour.
    pub level: String,
    /// Origin against which the built-in transport resolves relative URLs.
    pub origin: Option<String>,
    /// Replaces the built-in HTTP transport entirely.
    pub transport: Option<Arc<dyn Transport>>,
    /// Used by the built-in transport for non-forced deliveries.
    pub async_transport: Option<Arc<dyn Transport>>,
    pub on_error: Option<Arc<dyn ErrorCallback>>,
    pub prepare_body: Option<Arc<dyn PrepareBody>>,
    pub prepare_headers: Option<Arc<dyn PrepareHeaders>>,
    /// Bounded capacity of the scheduler command queue.
    pub capacity: usize,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub flush_timeout: Duration,
    /// Interval between rate-limited scheduling warnings.
    pub warn_interval: Duration,
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self {
            throttle_ms: Some(DEFAULT_THROTTLE_MS),
            debounce_ms: None,
            url: DEFAULT_URL.into(),
            method: HttpMethod::default(),
            use_beacon: true,
            headers: None,
            auth: AuthConfig::default(),
            level: DEFAULT_LEVEL.into(),
            origin: None,
            transport: None,
            async_transport: None,
            on_error: None,
            prepare_body: None,
            prepare_headers: None,
            capacity: DEFAULT_CHANNEL_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

impl TransmitterConfig {
    pub(crate) fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            url: self.url.clone(),
            method: self.method,
            headers: self.headers.clone(),
            use_beacon: self.use_beacon,
            auth: self.auth.clone(),
            async_transport: self.async_transport.clone(),
        }
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        Capabilities {
            prepare_body: self.prepare_body.clone(),
            prepare_headers: self.prepare_headers.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl fmt::Debug for TransmitterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransmitterConfig")
            .field("throttle_ms", &self.throttle_ms)
            .field("debounce_ms", &self.debounce_ms)
            .field("url", &self.url)
            .field("method", &self.method)
            .field("use_beacon", &self.use_beacon)
            .field("headers", &self.headers)
            .field("level", &self.level)
            .field("origin", &self.origin)
            .field("capacity", &self.capacity)
            .field("flush_timeout", &self.flush_timeout)
            .finish_non_exhaustive()
    }
}
