//! Builder for [`Transmitter`].
//!
//! Exposes scheduling, destination, header, authentication and hook
//! configuration. Validation happens in [`TransmitterBuilder::build`].
//! Without an explicit interval the default 500ms throttle applies.

use std::sync::Arc;
use std::time::Duration;

use super::Transmitter;
use super::config::TransmitterConfig;
use crate::coordinator::{ErrorCallback, PrepareBody, PrepareHeaders};
use crate::error::BuildError;
use crate::transport::{AuthConfig, Headers, HttpMethod, Transport};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(BuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`Transmitter`] instances.
#[derive(Clone, Default)]
pub struct TransmitterBuilder {
    throttle_ms: Option<u64>,
    debounce_ms: Option<u64>,
    url: Option<String>,
    method: Option<HttpMethod>,
    use_beacon: Option<bool>,
    headers: Option<Headers>,
    auth: Option<AuthConfig>,
    level: Option<String>,
    origin: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    async_transport: Option<Arc<dyn Transport>>,
    on_error: Option<Arc<dyn ErrorCallback>>,
    prepare_body: Option<Arc<dyn PrepareBody>>,
    prepare_headers: Option<Arc<dyn PrepareHeaders>>,
    capacity: Option<usize>,
    connect_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    flush_timeout_ms: Option<u64>,
}

impl TransmitterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    option_setter!(
        #[doc = "Throttle deliveries to at most one per `value` milliseconds."]
        with_throttle_ms,
        throttle_ms,
        u64
    );
    option_setter!(
        #[doc = "Deliver once appends have been quiet for `value` milliseconds."]
        with_debounce_ms,
        debounce_ms,
        u64
    );
    option_setter!(
        #[doc = "Enable or disable beacon delivery. Enabled by default."]
        with_beacon,
        use_beacon,
        bool
    );
    option_setter!(
        #[doc = "Set the bounded scheduler queue capacity."]
        with_capacity,
        capacity,
        usize
    );
    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the request timeout in milliseconds."]
        with_request_timeout_ms,
        request_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set how long `flush` waits for the scheduler, in milliseconds."]
        with_flush_timeout_ms,
        flush_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the HTTP method. Defaults to POST."]
        with_method,
        method,
        HttpMethod
    );

    /// Set the collector URL. Defaults to `/log`.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Resolve relative URLs against `origin` in the built-in transport.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Replace the header map sent with every batch.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Add a single header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(key.into(), value.into());
        self
    }

    /// Configure HTTP Basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Configure Bearer token authentication.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(AuthConfig::Bearer {
            token: token.into(),
        });
        self
    }

    /// Level reported back to the frontend.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Use `transport` instead of the built-in HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Perform non-forced deliveries of the built-in transport through
    /// `transport`.
    pub fn with_async_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.async_transport = Some(transport);
        self
    }

    pub fn with_on_error(mut self, callback: impl ErrorCallback + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn with_prepare_body(mut self, preparer: impl PrepareBody + 'static) -> Self {
        self.prepare_body = Some(Arc::new(preparer));
        self
    }

    pub fn with_prepare_headers(mut self, preparer: impl PrepareHeaders + 'static) -> Self {
        self.prepare_headers = Some(Arc::new(preparer));
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        self.validate_url()?;
        self.validate_capacity()?;
        self.validate_timeouts()?;
        Ok(())
    }

    fn validate_url(&self) -> Result<(), BuildError> {
        match &self.url {
            Some(url) if url.trim().is_empty() => {
                Err(BuildError::InvalidConfig("URL must not be empty".into()))
            }
            _ => Ok(()),
        }
    }

    fn validate_capacity(&self) -> Result<(), BuildError> {
        if let Some(capacity) = self.capacity {
            ensure_positive!(capacity, "capacity")?;
        }
        Ok(())
    }

    fn validate_timeouts(&self) -> Result<(), BuildError> {
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.request_timeout_ms {
            ensure_positive!(timeout, "request_timeout_ms")?;
        }
        if let Some(timeout) = self.flush_timeout_ms {
            ensure_positive!(timeout, "flush_timeout_ms")?;
        }
        Ok(())
    }

    /// Validate the builder and produce a [`TransmitterConfig`].
    pub fn build_config(&self) -> Result<TransmitterConfig, BuildError> {
        self.validate()?;

        let defaults = TransmitterConfig::default();
        Ok(TransmitterConfig {
            throttle_ms: self.throttle_ms.or(defaults.throttle_ms),
            debounce_ms: self.debounce_ms,
            url: self.url.clone().unwrap_or(defaults.url),
            method: self.method.unwrap_or(defaults.method),
            use_beacon: self.use_beacon.unwrap_or(defaults.use_beacon),
            headers: self.headers.clone(),
            auth: self.auth.clone().unwrap_or(defaults.auth),
            level: self.level.clone().unwrap_or(defaults.level),
            origin: self.origin.clone(),
            transport: self.transport.clone(),
            async_transport: self.async_transport.clone(),
            on_error: self.on_error.clone(),
            prepare_body: self.prepare_body.clone(),
            prepare_headers: self.prepare_headers.clone(),
            capacity: self.capacity.unwrap_or(defaults.capacity),
            connect_timeout: self
                .connect_timeout_ms
                .map_or(defaults.connect_timeout, Duration::from_millis),
            request_timeout: self
                .request_timeout_ms
                .map_or(defaults.request_timeout, Duration::from_millis),
            flush_timeout: self
                .flush_timeout_ms
                .map_or(defaults.flush_timeout, Duration::from_millis),
            warn_interval: defaults.warn_interval,
        })
    }

    pub fn build(&self) -> Result<Transmitter, BuildError> {
        let config = self.build_config()?;
        Ok(Transmitter::with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty_url(TransmitterBuilder::new().with_url("  "), "URL")]
    #[case::zero_capacity(TransmitterBuilder::new().with_capacity(0), "capacity")]
    #[case::zero_connect(TransmitterBuilder::new().with_connect_timeout_ms(0), "connect_timeout_ms")]
    #[case::zero_request(TransmitterBuilder::new().with_request_timeout_ms(0), "request_timeout_ms")]
    #[case::zero_flush(TransmitterBuilder::new().with_flush_timeout_ms(0), "flush_timeout_ms")]
    fn rejects_invalid_configuration(#[case] builder: TransmitterBuilder, #[case] field: &str) {
        let err = builder.build_config().expect_err("must be rejected");
        assert!(matches!(err, BuildError::InvalidConfig(ref msg) if msg.contains(field)));
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = TransmitterBuilder::new().build_config().expect("valid");
        assert_eq!(config.url, "/log");
        assert_eq!(config.method, HttpMethod::POST);
        assert!(config.use_beacon);
        assert!(config.headers.is_none());
        assert_eq!(config.level, "info");
        assert_eq!(config.throttle_ms, Some(500));
        assert_eq!(config.debounce_ms, None);
    }

    #[test]
    fn overrides_are_carried_into_config() {
        let config = TransmitterBuilder::new()
            .with_throttle_ms(250)
            .with_url("https://collector.example/ingest")
            .with_method(HttpMethod::PUT)
            .with_beacon(false)
            .with_header("x-app", "shop")
            .with_bearer_token("secret")
            .with_level("warn")
            .with_flush_timeout_ms(750)
            .build_config()
            .expect("valid");

        assert_eq!(config.throttle_ms, Some(250));
        assert_eq!(config.url, "https://collector.example/ingest");
        assert_eq!(config.method, HttpMethod::PUT);
        assert!(!config.use_beacon);
        assert_eq!(
            config.headers.as_ref().and_then(|h| h.get("x-app")).map(String::as_str),
            Some("shop")
        );
        assert_eq!(
            config.auth,
            AuthConfig::Bearer {
                token: "secret".into()
            }
        );
        assert_eq!(config.level, "warn");
        assert_eq!(config.flush_timeout, Duration::from_millis(750));
    }
}
