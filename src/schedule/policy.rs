//! Timing policy deciding when a pending batch is drained.

use std::time::{Duration, Instant};

use log::warn;

/// Throttle interval applied by default, in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 500;
/// Interval used when neither throttle nor debounce is configured.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(DEFAULT_THROTTLE_MS);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulingPolicy {
    /// Fire at most once per interval, at the end of the window opened by
    /// the first trigger.
    Throttle(Duration),
    /// Fire once the triggers have been quiet for the interval.
    Debounce(Duration),
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self::Throttle(DEFAULT_THROTTLE)
    }
}

impl SchedulingPolicy {
    /// Resolve the configured intervals into a policy.
    ///
    /// Debounce takes precedence when both are set. With neither set the
    /// policy falls back to [`DEFAULT_THROTTLE`] and warns.
    pub fn resolve(throttle_ms: Option<u64>, debounce_ms: Option<u64>) -> Self {
        match (debounce_ms, throttle_ms) {
            (Some(ms), _) => Self::Debounce(Duration::from_millis(ms)),
            (None, Some(ms)) => Self::Throttle(Duration::from_millis(ms)),
            (None, None) => {
                warn!(
                    "transmit_http: either throttle or debounce must be configured; \
                     falling back to throttle by {}ms",
                    DEFAULT_THROTTLE.as_millis()
                );
                Self::default()
            }
        }
    }

    pub fn interval(&self) -> Duration {
        match self {
            Self::Throttle(interval) | Self::Debounce(interval) => *interval,
        }
    }

    /// Deadline after a trigger received at `now`.
    ///
    /// A throttle keeps an already armed deadline; a debounce pushes it out.
    pub fn next_deadline(&self, armed: Option<Instant>, now: Instant) -> Instant {
        match (self, armed) {
            (Self::Throttle(_), Some(deadline)) => deadline,
            _ => now + self.interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;

    #[rstest]
    #[case(Some(200), None, SchedulingPolicy::Throttle(Duration::from_millis(200)))]
    #[case(None, Some(300), SchedulingPolicy::Debounce(Duration::from_millis(300)))]
    #[case(Some(200), Some(300), SchedulingPolicy::Debounce(Duration::from_millis(300)))]
    fn resolves_configured_policy(
        #[case] throttle: Option<u64>,
        #[case] debounce: Option<u64>,
        #[case] expected: SchedulingPolicy,
    ) {
        assert_eq!(SchedulingPolicy::resolve(throttle, debounce), expected);
    }

    #[test]
    #[serial]
    fn falls_back_to_default_throttle_with_warning() {
        let mut logger = crate::test_utils::capture_logs();
        let policy = SchedulingPolicy::resolve(None, None);
        assert_eq!(policy, SchedulingPolicy::Throttle(DEFAULT_THROTTLE));

        let mut warned = false;
        while let Some(record) = logger.pop() {
            warned |= record.level() == log::Level::Warn
                && record.args().contains("falling back to throttle by 500ms");
        }
        assert!(warned, "fallback warning not emitted");
    }

    #[test]
    fn throttle_keeps_armed_deadline() {
        let policy = SchedulingPolicy::Throttle(Duration::from_millis(100));
        let start = Instant::now();
        let first = policy.next_deadline(None, start);
        let later = start + Duration::from_millis(60);
        assert_eq!(policy.next_deadline(Some(first), later), first);
        assert_eq!(first, start + Duration::from_millis(100));
    }

    #[test]
    fn debounce_pushes_deadline_out() {
        let policy = SchedulingPolicy::Debounce(Duration::from_millis(100));
        let start = Instant::now();
        let first = policy.next_deadline(None, start);
        let later = start + Duration::from_millis(60);
        assert_eq!(
            policy.next_deadline(Some(first), later),
            later + Duration::from_millis(100)
        );
    }
}
