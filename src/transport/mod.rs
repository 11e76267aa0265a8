//! Delivery capability used by the coordinator.
//!
//! The coordinator knows nothing about HTTP: it hands a serialised payload,
//! the unload flag and the resolved options to a [`Transport`]. The built-in
//! [`HttpTransport`] picks between beacon, blocking and asynchronous
//! delivery; tests and embedders can inject any other implementation,
//! including plain closures.

mod http;
mod options;

pub use http::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DeliveryMode, HttpTransport, select_mode,
};
pub use options::{AuthConfig, Headers, HttpMethod, TransportOptions};

use crate::error::TransportError;

/// Single-call delivery capability.
///
/// `force_synchronous` is set once the session is unloading: the call must
/// not return before the payload has been handed to the network.
pub trait Transport: Send + Sync {
    fn deliver(
        &self,
        payload: &str,
        force_synchronous: bool,
        options: &TransportOptions,
    ) -> Result<(), TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&str, bool, &TransportOptions) -> Result<(), TransportError> + Send + Sync,
{
    fn deliver(
        &self,
        payload: &str,
        force_synchronous: bool,
        options: &TransportOptions,
    ) -> Result<(), TransportError> {
        self(payload, force_synchronous, options)
    }
}
