//! The transmitter session handed to the logging frontend.
//!
//! A [`Transmitter`] buffers events in a [`BatchCollector`], asks the active
//! [`SendStrategy`] to schedule a drain and, on unload, swaps the timer-backed
//! strategy for one that delivers synchronously on the caller's thread.

mod builder;
mod config;


pub use builder::TransmitterBuilder;
pub use config::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_FLUSH_TIMEOUT, DEFAULT_LEVEL, DEFAULT_URL, TransmitterConfig,
};

use std::fmt;
use std::sync::{Arc, Weak};

use log::warn;

use crate::collector::BatchCollector;
use crate::coordinator::DeliveryCoordinator;
use crate::level::Level;
use crate::log_event::LogEvent;
use crate::rate_limited_warner::RateLimitedWarner;
use crate::schedule::{
    DrainFn, ImmediateSend, ScheduledSend, SchedulingPolicy, SendStrategy, StrategySlot,
};
use crate::transport::{HttpTransport, Transport};

struct Session {
    level: String,
    policy: SchedulingPolicy,
    coordinator: Arc<DeliveryCoordinator>,
    strategy: StrategySlot,
    warner: RateLimitedWarner,
}

impl Session {
    fn unload(&self) {
        if !self.coordinator.begin_unload() {
            return;
        }
        let immediate: Arc<dyn SendStrategy> =
            Arc::new(ImmediateSend::new(Arc::clone(&self.coordinator)));
        // Dropping the scheduled strategy fires anything armed after the flush.
        drop(self.strategy.replace(immediate));
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.warner.flush(|count| {
            warn!("transmit_http: {count} events could not be scheduled before shutdown");
        });
    }
}

/// Batching log transmitter.
///
/// Dropping the transmitter delivers whatever is still pending.
pub struct Transmitter {
    shared: Arc<Session>,
}

impl Transmitter {
    /// Start a fluent [`TransmitterBuilder`].
    pub fn builder() -> TransmitterBuilder {
        TransmitterBuilder::new()
    }

    /// Create a transmitter from an already validated configuration.
    ///
    /// A configuration with both intervals cleared falls back to a 500ms
    /// throttle and logs a warning.
    pub fn with_config(config: TransmitterConfig) -> Self {
        let policy = SchedulingPolicy::resolve(config.throttle_ms, config.debounce_ms);
        let collector = Arc::new(BatchCollector::new());
        let transport = config
            .transport
            .clone()
            .unwrap_or_else(|| default_transport(&config));
        let coordinator = Arc::new(DeliveryCoordinator::new(
            collector,
            transport,
            config.transport_options(),
            config.capabilities(),
        ));

        let drain_coordinator = Arc::clone(&coordinator);
        let drain: DrainFn = Arc::new(move || {
            drain_coordinator.drain_and_send();
        });
        let scheduled: Arc<dyn SendStrategy> = Arc::new(ScheduledSend::spawn(
            policy,
            config.capacity,
            config.flush_timeout,
            drain,
        ));

        Self {
            shared: Arc::new(Session {
                level: config.level,
                policy,
                coordinator,
                strategy: StrategySlot::new(scheduled),
                warner: RateLimitedWarner::new(config.warn_interval),
            }),
        }
    }

    /// Queue `event` for delivery.
    ///
    /// The event carries its own level; the frontend's label is not
    /// inspected.
    pub fn send(&self, _level: Level, event: LogEvent) {
        let session = &self.shared;
        session.coordinator.collector().append(event);
        if let Err(err) = session.strategy.schedule() {
            session.warner.record_drop();
            session.warner.warn_if_due(|count| {
                warn!("transmit_http: {count} events could not be scheduled: {err}");
            });
        }
    }

    /// Deliver the pending batch now.
    ///
    /// Returns `true` once the drain has run, `false` if the scheduler was
    /// unavailable or did not answer within the flush timeout.
    pub fn flush(&self) -> bool {
        match self.shared.strategy.flush() {
            Ok(()) => true,
            Err(err) => {
                warn!("transmit_http: flush failed: {err}");
                false
            }
        }
    }

    /// Level configured for the frontend.
    pub fn level(&self) -> &str {
        &self.shared.level
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.shared.policy
    }

    /// Number of events waiting for the next drain.
    pub fn pending(&self) -> usize {
        self.shared.coordinator.collector().pending_len()
    }

    pub fn is_unloading(&self) -> bool {
        self.shared.coordinator.is_unloading()
    }

    /// Switch to synchronous delivery.
    ///
    /// The pending batch is delivered with `force_synchronous` before this
    /// returns; every later [`send`](Self::send) delivers on the calling
    /// thread. Repeated calls are no-ops.
    pub fn unload(&self) {
        self.shared.unload();
    }

    /// Handle the environment can keep to raise the unload signal.
    pub fn unload_handle(&self) -> UnloadHandle {
        UnloadHandle {
            session: Arc::downgrade(&self.shared),
        }
    }

    /// Deliver anything pending and stop the scheduler.
    pub fn close(self) {
        self.flush();
    }
}

fn default_transport(config: &TransmitterConfig) -> Arc<dyn Transport> {
    let mut transport = HttpTransport::new(config.connect_timeout, config.request_timeout);
    if let Some(origin) = &config.origin {
        transport = transport.with_origin(origin.clone());
    }
    Arc::new(transport)
}

impl fmt::Debug for Transmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transmitter")
            .field("level", &self.shared.level)
            .field("policy", &self.shared.policy)
            .field("unloading", &self.is_unloading())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Weak reference used to signal unload from outside the frontend.
///
/// Signalling after the transmitter has been dropped does nothing.
#[derive(Clone, Debug)]
pub struct UnloadHandle {
    session: Weak<Session>,
}

impl UnloadHandle {
    pub fn unload(&self) {
        if let Some(session) = self.session.upgrade() {
            session.unload();
        }
    }
}
