//! Drains the collector and hands batches to the transport.
//!
//! The coordinator also owns the session's unload flag. Once set, every
//! delivery is performed with `force_synchronous` so the transport blocks
//! until the payload is on the wire.

mod capability;


pub use capability::{ErrorCallback, PrepareBody, PrepareHeaders, encode_json};

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::error;
use parking_lot::Mutex;

use crate::collector::BatchCollector;
use crate::error::{PrepareError, TransportError};
use crate::log_event::LogEvent;
use crate::transport::{Headers, Transport, TransportOptions};

/// Result of one [`DeliveryCoordinator::drain_and_send`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing was pending; the transport was not called.
    Empty,
    /// The transport accepted the batch.
    Delivered,
    /// The transport failed; the failure was reported and the batch discarded.
    Failed,
    /// A preparer failed; nothing was sent this cycle.
    Dropped,
}

/// Hooks consulted on every drain.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub prepare_body: Option<Arc<dyn PrepareBody>>,
    pub prepare_headers: Option<Arc<dyn PrepareHeaders>>,
    pub on_error: Option<Arc<dyn ErrorCallback>>,
}

pub struct DeliveryCoordinator {
    collector: Arc<BatchCollector>,
    transport: Arc<dyn Transport>,
    options: TransportOptions,
    headers: Mutex<Option<Headers>>,
    capabilities: Capabilities,
    unloading: AtomicBool,
}

impl DeliveryCoordinator {
    /// `options.headers` seeds the current header map.
    pub fn new(
        collector: Arc<BatchCollector>,
        transport: Arc<dyn Transport>,
        mut options: TransportOptions,
        capabilities: Capabilities,
    ) -> Self {
        let headers = options.headers.take();
        Self {
            collector,
            transport,
            options,
            headers: Mutex::new(headers),
            capabilities,
            unloading: AtomicBool::new(false),
        }
    }

    pub fn collector(&self) -> &Arc<BatchCollector> {
        &self.collector
    }

    pub fn is_unloading(&self) -> bool {
        self.unloading.load(Ordering::SeqCst)
    }

    /// Flip the session into unloading mode.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn begin_unload(&self) -> bool {
        !self.unloading.swap(true, Ordering::SeqCst)
    }

    /// Headers that the next drain starts from.
    pub fn current_headers(&self) -> Option<Headers> {
        self.headers.lock().clone()
    }

    /// Drain the pending batch and deliver it.
    ///
    /// Never unwinds: preparer and transport failures, panics included, are
    /// logged or routed to the error callback and reflected in the outcome.
    pub fn drain_and_send(&self) -> DrainOutcome {
        if !self.collector.is_drainable() {
            return DrainOutcome::Empty;
        }

        let headers = match self.resolve_headers() {
            Ok(headers) => headers,
            Err(err) => {
                error!("transmit_http: header preparation failed: {err}");
                return DrainOutcome::Dropped;
            }
        };

        let batch = self.collector.take_snapshot();
        if batch.is_empty() {
            return DrainOutcome::Empty;
        }
        let payload = match self.encode(&batch) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    "transmit_http: body preparation failed, dropping {} events: {err}",
                    batch.len()
                );
                return DrainOutcome::Dropped;
            }
        };

        let options = self.options.with_headers(headers);
        let unloading = self.is_unloading();
        let delivered = contained(|| self.transport.deliver(&payload, unloading, &options))
            .unwrap_or_else(|panic| {
                Err(TransportError::Rejected(format!("transport panicked: {panic}")))
            });
        match delivered {
            Ok(()) => DrainOutcome::Delivered,
            Err(err) => {
                self.report_failure(&err, &payload, &options);
                DrainOutcome::Failed
            }
        }
    }

    fn report_failure(&self, err: &TransportError, payload: &str, options: &TransportOptions) {
        let Some(callback) = &self.capabilities.on_error else {
            error!("transmit_http: delivery to {} failed: {err}", options.url);
            return;
        };
        let reported = contained(|| callback.on_error(err, payload, options.headers.as_ref()));
        if let Err(panic) = reported {
            error!("transmit_http: error callback panicked while reporting {err}: {panic}");
        }
    }

    /// Run the header preparer, persisting its result for later drains.
    fn resolve_headers(&self) -> Result<Option<Headers>, PrepareError> {
        let Some(preparer) = &self.capabilities.prepare_headers else {
            return Ok(self.current_headers());
        };
        let current = self.current_headers();
        let prepared = contained(|| preparer.prepare_headers(current.as_ref()))
            .map_err(PrepareError::Panicked)??;
        *self.headers.lock() = prepared.clone();
        Ok(prepared)
    }

    fn encode(&self, batch: &[LogEvent]) -> Result<String, PrepareError> {
        match &self.capabilities.prepare_body {
            Some(preparer) => {
                contained(|| preparer.prepare_body(batch)).map_err(PrepareError::Panicked)?
            }
            None => encode_json(batch),
        }
    }
}

/// Run a user hook, turning a panic into its message.
fn contained<T>(hook: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(hook)).map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| (*msg).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

impl std::fmt::Debug for DeliveryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryCoordinator")
            .field("options", &self.options)
            .field("unloading", &self.is_unloading())
            .field("pending", &self.collector.pending_len())
            .finish_non_exhaustive()
    }
}
