//! Built-in HTTP transport over a pooled `ureq` agent.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use log::{debug, warn};
use native_tls::TlsConnector;
use ureq::{Agent, AgentBuilder};

use super::{AuthConfig, Headers, Transport, TransportOptions};
use crate::error::TransportError;

/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default overall request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How a single payload leaves the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Fire-and-forget POST whose response is never observed.
    Beacon,
    /// Request performed on the calling thread, which waits for the response.
    Blocking,
    /// Request handed to the configured async transport, or performed by the
    /// agent on the scheduler worker.
    Async,
}

/// Choose the delivery mode for one call.
///
/// Beacon delivery wins whenever it is requested and supported; otherwise an
/// unloading session blocks and a normal session goes asynchronous.
pub fn select_mode(
    options: &TransportOptions,
    force_synchronous: bool,
    beacon_supported: bool,
) -> DeliveryMode {
    if options.use_beacon && beacon_supported {
        DeliveryMode::Beacon
    } else if force_synchronous {
        DeliveryMode::Blocking
    } else {
        DeliveryMode::Async
    }
}

/// HTTP transport backed by `ureq`.
///
/// Relative URLs such as the default `/log` are resolved against the
/// configured origin.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    agent: Agent,
    origin: Option<String>,
    beacon_supported: bool,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        let mut builder = AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout(request_timeout);
        match TlsConnector::new() {
            Ok(connector) => builder = builder.tls_connector(Arc::new(connector)),
            Err(err) => {
                warn!("transmit_http: native TLS unavailable, using agent default: {err}");
            }
        }
        let agent = builder.build();
        Self {
            agent,
            origin: None,
            beacon_supported: true,
        }
    }

    /// Resolve relative URLs against `origin`, e.g. `http://127.0.0.1:8080`.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Declare whether beacon delivery is available in this environment.
    pub fn with_beacon_support(mut self, supported: bool) -> Self {
        self.beacon_supported = supported;
        self
    }

    fn resolve_url(&self, url: &str) -> String {
        match &self.origin {
            Some(origin) if !is_absolute(url) => format!(
                "{}/{}",
                origin.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            _ => url.to_owned(),
        }
    }

    fn execute(
        &self,
        method: &str,
        payload: &str,
        options: &TransportOptions,
    ) -> Result<(), TransportError> {
        let url = self.resolve_url(&options.url);
        let mut req = self.agent.request(method, &url);
        req = apply_auth(req, &options.auth);
        req = apply_headers(req, options.headers.as_ref());
        match req.send_string(payload) {
            Ok(response) => check_status(response.status()),
            Err(ureq::Error::Status(code, _)) => Err(TransportError::Status(code)),
            Err(ureq::Error::Transport(err)) => Err(TransportError::Network(err.to_string())),
        }
    }

    /// Send `payload` without observing the outcome.
    ///
    /// When `wait` is set the caller is held until the request has been
    /// written, so an unloading process does not exit mid-request.
    fn send_beacon(&self, payload: &str, options: &TransportOptions, wait: bool) {
        let transport = self.clone();
        let payload = payload.to_owned();
        let options = options.clone();
        let handle = thread::spawn(move || {
            if let Err(err) = transport.execute("POST", &payload, &options) {
                debug!("beacon delivery to {} failed: {err}", options.url);
            }
        });
        if wait && handle.join().is_err() {
            debug!("beacon thread panicked");
        }
    }
}

impl Transport for HttpTransport {
    fn deliver(
        &self,
        payload: &str,
        force_synchronous: bool,
        options: &TransportOptions,
    ) -> Result<(), TransportError> {
        match select_mode(options, force_synchronous, self.beacon_supported) {
            DeliveryMode::Beacon => {
                self.send_beacon(payload, options, force_synchronous);
                Ok(())
            }
            DeliveryMode::Blocking => self.execute(options.method.as_str(), payload, options),
            DeliveryMode::Async => match &options.async_transport {
                Some(custom) => custom.deliver(payload, false, options),
                None => self.execute(options.method.as_str(), payload, options),
            },
        }
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn check_status(status: u16) -> Result<(), TransportError> {
    match status {
        200..=299 => Ok(()),
        code => Err(TransportError::Status(code)),
    }
}

fn apply_auth(req: ureq::Request, auth: &AuthConfig) -> ureq::Request {
    match auth {
        AuthConfig::None => req,
        AuthConfig::Basic { username, password } => {
            let credentials = format!("{username}:{password}");
            let encoded = BASE64_STANDARD.encode(credentials.as_bytes());
            req.set("Authorization", &format!("Basic {encoded}"))
        }
        AuthConfig::Bearer { token } => req.set("Authorization", &format!("Bearer {token}")),
    }
}

fn apply_headers(mut req: ureq::Request, headers: Option<&Headers>) -> ureq::Request {
    for (key, value) in headers.into_iter().flatten() {
        req = req.set(key, value);
    }
    req
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn options(use_beacon: bool) -> TransportOptions {
        TransportOptions {
            url: "/log".into(),
            use_beacon,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(true, false, true, DeliveryMode::Beacon)]
    #[case(true, true, true, DeliveryMode::Beacon)]
    #[case(true, true, false, DeliveryMode::Blocking)]
    #[case(false, true, true, DeliveryMode::Blocking)]
    #[case(false, false, true, DeliveryMode::Async)]
    #[case(true, false, false, DeliveryMode::Async)]
    fn selects_delivery_mode(
        #[case] use_beacon: bool,
        #[case] unloading: bool,
        #[case] beacon_supported: bool,
        #[case] expected: DeliveryMode,
    ) {
        assert_eq!(
            select_mode(&options(use_beacon), unloading, beacon_supported),
            expected
        );
    }

    #[rstest]
    #[case(None, "/log", "/log")]
    #[case(Some("http://host:8080"), "/log", "http://host:8080/log")]
    #[case(Some("http://host:8080/"), "log", "http://host:8080/log")]
    #[case(Some("http://host:8080"), "https://other/log", "https://other/log")]
    fn resolves_relative_urls(
        #[case] origin: Option<&str>,
        #[case] url: &str,
        #[case] expected: &str,
    ) {
        let mut transport = HttpTransport::default();
        if let Some(origin) = origin {
            transport = transport.with_origin(origin);
        }
        assert_eq!(transport.resolve_url(url), expected);
    }

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(400, false)]
    #[case(503, false)]
    fn only_2xx_is_success(#[case] status: u16, #[case] ok: bool) {
        assert_eq!(check_status(status).is_ok(), ok);
    }

    #[test]
    fn relative_url_without_origin_is_a_network_error() {
        let transport = HttpTransport::default().with_beacon_support(false);
        let err = transport
            .deliver("[]", true, &options(false))
            .expect_err("relative URL cannot be requested");
        assert!(matches!(err, TransportError::Network(_)));
    }

    #[test]
    fn async_override_is_used_when_not_unloading() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let custom = move |payload: &str, forced: bool, _: &TransportOptions| {
            assert_eq!(payload, "[1]");
            assert!(!forced);
            seen.fetch_add(1, Ordering::SeqCst);
            Ok::<(), TransportError>(())
        };
        let opts = TransportOptions {
            async_transport: Some(Arc::new(custom)),
            ..options(false)
        };
        let transport = HttpTransport::default();
        transport.deliver("[1]", false, &opts).expect("delivered");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Unloading bypasses the override and blocks on the agent.
        assert!(transport.deliver("[1]", true, &opts).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
