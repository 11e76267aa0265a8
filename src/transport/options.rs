//! Per-call transport configuration.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::Transport;

/// Header map sent with every request.
pub type Headers = HashMap<String, String>;

/// HTTP methods supported for batch delivery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    POST,
    PUT,
    PATCH,
}

impl HttpMethod {
    /// Convert to the string representation used by ureq.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::PATCH => "PATCH",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" => Ok(Self::POST),
            "PUT" => Ok(Self::PUT),
            "PATCH" => Ok(Self::PATCH),
            other => Err(format!("unsupported HTTP method '{other}'")),
        }
    }
}

/// Authentication configuration for HTTP requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthConfig {
    #[default]
    None,
    /// HTTP Basic authentication with username and password.
    Basic { username: String, password: String },
    Bearer { token: String },
}

/// Options resolved for one delivery attempt.
///
/// Built from the session configuration plus the headers current at drain
/// time; transports must treat it as read-only.
#[derive(Clone, Default)]
pub struct TransportOptions {
    pub url: String,
    pub method: HttpMethod,
    /// `None` when no headers were configured or the header preparer
    /// cleared them.
    pub headers: Option<Headers>,
    /// Prefer fire-and-forget delivery when the transport supports it.
    pub use_beacon: bool,
    pub auth: AuthConfig,
    /// Replacement for the built-in request when delivery is not forced
    /// synchronous.
    pub async_transport: Option<Arc<dyn Transport>>,
}

impl TransportOptions {
    /// Copy of these options carrying `headers`.
    pub fn with_headers(&self, headers: Option<Headers>) -> Self {
        Self {
            headers,
            ..self.clone()
        }
    }
}

impl fmt::Debug for TransportOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportOptions")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("use_beacon", &self.use_beacon)
            .field("async_transport", &self.async_transport.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("post", HttpMethod::POST)]
    #[case(" PUT ", HttpMethod::PUT)]
    #[case("Patch", HttpMethod::PATCH)]
    fn parses_methods(#[case] raw: &str, #[case] expected: HttpMethod) {
        assert_eq!(raw.parse::<HttpMethod>(), Ok(expected));
    }

    #[test]
    fn rejects_unsupported_method() {
        let err = "DELETE".parse::<HttpMethod>().expect_err("must reject");
        assert!(err.contains("DELETE"));
    }

    #[test]
    fn with_headers_keeps_other_fields() {
        let base = TransportOptions {
            url: "/log".into(),
            use_beacon: true,
            ..Default::default()
        };
        let headers = Headers::from([("x-session".to_string(), "42".to_string())]);
        let resolved = base.with_headers(Some(headers.clone()));
        assert_eq!(resolved.url, "/log");
        assert!(resolved.use_beacon);
        assert_eq!(resolved.headers, Some(headers));
        assert!(base.headers.is_none());
    }
}
