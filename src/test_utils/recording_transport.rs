//! A transport that records every delivery for later assertions.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::error::TransportError;
use crate::transport::{Headers, HttpMethod, Transport, TransportOptions};

/// One captured call to [`Transport::deliver`].
#[derive(Clone, Debug)]
pub struct Delivery {
    pub payload: String,
    pub force_synchronous: bool,
    pub url: String,
    pub method: HttpMethod,
    pub headers: Option<Headers>,
    pub thread: std::thread::ThreadId,
}

/// Transport storing deliveries and optionally failing them.
#[derive(Clone)]
pub struct RecordingTransport {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
    notify: Sender<Delivery>,
    notified: Receiver<Delivery>,
    failure: Arc<Mutex<Option<TransportError>>>,
    delay: Arc<Mutex<Duration>>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        let (notify, notified) = unbounded();
        Self {
            deliveries: Arc::default(),
            notify,
            notified,
            failure: Arc::default(),
            delay: Arc::default(),
        }
    }
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent delivery with `error`.
    pub fn fail_with(&self, error: TransportError) {
        *self.failure.lock() = Some(error);
    }

    /// Sleep for `delay` inside every subsequent delivery.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Return a snapshot of all deliveries received so far.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.deliveries.lock().len()
    }

    /// Wait up to `timeout` for the next delivery.
    pub fn next(&self, timeout: Duration) -> Option<Delivery> {
        self.notified.recv_timeout(timeout).ok()
    }

    pub fn as_transport(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }
}

impl Transport for RecordingTransport {
    fn deliver(
        &self,
        payload: &str,
        force_synchronous: bool,
        options: &TransportOptions,
    ) -> Result<(), TransportError> {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let delivery = Delivery {
            payload: payload.to_owned(),
            force_synchronous,
            url: options.url.clone(),
            method: options.method,
            headers: options.headers.clone(),
            thread: std::thread::current().id(),
        };
        self.deliveries.lock().push(delivery.clone());
        let _ = self.notify.send(delivery);
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
