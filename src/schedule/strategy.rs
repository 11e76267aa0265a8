//! Replaceable send strategies.
//!
//! A [`StrategySlot`] holds whichever [`SendStrategy`] is active. While the
//! session is running that is a [`ScheduledSend`] backed by the timer
//! worker; the unload path swaps in an [`ImmediateSend`] that drains on the
//! caller's thread.

use std::{
    fmt,
    sync::Arc,
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crossbeam_channel::{RecvTimeoutError, SendTimeoutError, Sender, TrySendError, bounded};
use log::warn;
use parking_lot::{Mutex, RwLock};

use super::policy::SchedulingPolicy;
use super::worker::{DrainFn, ScheduleCommand, spawn_worker};
use crate::coordinator::DeliveryCoordinator;
use crate::error::ScheduleError;

/// How appended events reach the coordinator.
pub trait SendStrategy: Send + Sync {
    /// Note that an event was appended.
    fn schedule(&self) -> Result<(), ScheduleError>;

    /// Deliver whatever is pending now.
    fn flush(&self) -> Result<(), ScheduleError>;
}

/// Strategy deferring drains to the timer worker.
pub struct ScheduledSend {
    tx: Option<Sender<ScheduleCommand>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    policy: SchedulingPolicy,
    flush_timeout: Duration,
}

impl ScheduledSend {
    /// Spawn the timer worker; `drain` runs on that thread.
    pub fn spawn(
        policy: SchedulingPolicy,
        capacity: usize,
        flush_timeout: Duration,
        drain: DrainFn,
    ) -> Self {
        let (tx, handle) = spawn_worker(policy, capacity, drain);
        Self {
            tx: Some(tx),
            handle: Mutex::new(Some(handle)),
            policy,
            flush_timeout,
        }
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    /// Send a command carrying an ack channel and wait for the ack.
    ///
    /// Sending and receiving share one deadline so the total wait never
    /// exceeds the flush timeout.
    fn request(
        &self,
        command: impl FnOnce(Sender<()>) -> ScheduleCommand,
    ) -> Result<(), ScheduleError> {
        let tx = self.tx.as_ref().ok_or(ScheduleError::Closed)?;
        let deadline = Instant::now() + self.flush_timeout;
        let (ack_tx, ack_rx) = bounded(1);
        tx.send_deadline(command(ack_tx), deadline)
            .map_err(|err| match err {
                SendTimeoutError::Timeout(_) => ScheduleError::Timeout,
                SendTimeoutError::Disconnected(_) => ScheduleError::Closed,
            })?;
        ack_rx.recv_deadline(deadline).map_err(|err| match err {
            RecvTimeoutError::Timeout => ScheduleError::Timeout,
            RecvTimeoutError::Disconnected => ScheduleError::Closed,
        })
    }

    /// Fire any pending drain and wait for the worker to exit.
    pub fn close(&mut self) {
        if self.tx.is_some() {
            if let Err(err) = self.request(ScheduleCommand::Shutdown) {
                warn!("transmit_http: scheduler shutdown incomplete: {err}");
            }
            self.tx = None;
        }
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("transmit_http: scheduler thread panicked");
        }
    }
}

impl SendStrategy for ScheduledSend {
    fn schedule(&self) -> Result<(), ScheduleError> {
        let tx = self.tx.as_ref().ok_or(ScheduleError::Closed)?;
        match tx.try_send(ScheduleCommand::Trigger) {
            // A full queue already holds triggers that will arm the timer.
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(ScheduleError::Closed),
        }
    }

    fn flush(&self) -> Result<(), ScheduleError> {
        self.request(ScheduleCommand::Flush)
    }
}

impl Drop for ScheduledSend {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ScheduledSend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledSend")
            .field("policy", &self.policy)
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}

/// Strategy draining synchronously on every call.
#[derive(Debug)]
pub struct ImmediateSend {
    coordinator: Arc<DeliveryCoordinator>,
}

impl ImmediateSend {
    pub fn new(coordinator: Arc<DeliveryCoordinator>) -> Self {
        Self { coordinator }
    }
}

impl SendStrategy for ImmediateSend {
    fn schedule(&self) -> Result<(), ScheduleError> {
        self.coordinator.drain_and_send();
        Ok(())
    }

    fn flush(&self) -> Result<(), ScheduleError> {
        self.coordinator.drain_and_send();
        Ok(())
    }
}

/// Holder of the active strategy.
pub struct StrategySlot {
    active: RwLock<Arc<dyn SendStrategy>>,
}

impl StrategySlot {
    pub fn new(initial: Arc<dyn SendStrategy>) -> Self {
        Self {
            active: RwLock::new(initial),
        }
    }

    /// The active strategy. The lock is released before the caller uses it,
    /// so a slow synchronous drain never blocks [`replace`](Self::replace).
    pub fn current(&self) -> Arc<dyn SendStrategy> {
        Arc::clone(&self.active.read())
    }

    pub fn schedule(&self) -> Result<(), ScheduleError> {
        self.current().schedule()
    }

    pub fn flush(&self) -> Result<(), ScheduleError> {
        self.current().flush()
    }

    /// Flush the active strategy, then install `next`.
    ///
    /// Returns the previous strategy. Triggers that reached it between the
    /// flush and the swap are fired when it is closed or dropped.
    pub fn replace(&self, next: Arc<dyn SendStrategy>) -> Arc<dyn SendStrategy> {
        if let Err(err) = self.current().flush() {
            warn!("transmit_http: flushing replaced strategy failed: {err}");
        }
        std::mem::replace(&mut *self.active.write(), next)
    }
}

impl fmt::Debug for StrategySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategySlot").finish_non_exhaustive()
    }
}
