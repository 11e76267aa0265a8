use crate::level::Level;
use crate::log_event::LogEvent;
use crate::transmitter::Transmitter;

/// Surface a logging frontend drives.
///
/// `Transmit` is `Send + Sync` so one transmitter can be shared by every
/// thread that logs. Implementations never block on the network in `send`
/// unless the session is unloading.
pub trait Transmit: Send + Sync {
    /// Level the frontend should log at.
    fn level(&self) -> &str;

    /// Queue an event for delivery.
    fn send(&self, level: Level, event: LogEvent);

    /// Deliver pending events now. Returns `false` if the flush could not be
    /// confirmed.
    fn flush(&self) -> bool;
}

impl Transmit for Transmitter {
    fn level(&self) -> &str {
        Transmitter::level(self)
    }

    fn send(&self, level: Level, event: LogEvent) {
        Transmitter::send(self, level, event);
    }

    fn flush(&self) -> bool {
        Transmitter::flush(self)
    }
}
