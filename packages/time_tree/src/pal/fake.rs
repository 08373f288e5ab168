//! Fake clock implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Clock;

/// Fake implementation of the clock abstraction for testing.
///
/// This implementation allows tests to control the timestamps instead of
/// relying on the real clock. Multiple clones of the same `FakeClock` share
/// the same underlying state, allowing tests to advance time after the clock
/// has been handed to a context.
#[derive(Clone, Debug)]
pub(crate) struct FakeClock {
    now: Arc<Mutex<Duration>>,
}

impl FakeClock {
    /// Creates a new fake clock starting at the zero timestamp.
    pub(crate) fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Sets the current timestamp.
    ///
    /// This affects all clones of this clock, allowing tests to simulate
    /// time progression during tracking.
    pub(crate) fn set_timestamp(&self, timestamp: Duration) {
        *self
            .now
            .lock()
            .expect("FakeClock state lock should not be poisoned") = timestamp;
    }

    /// Advances the current timestamp by the given amount.
    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self
            .now
            .lock()
            .expect("FakeClock state lock should not be poisoned");

        *now = now
            .checked_add(by)
            .expect("advancing the fake clock overflows Duration - this indicates an unrealistic test scenario");
    }
}

impl Clock for FakeClock {
    fn timestamp(&self) -> Duration {
        *self
            .now
            .lock()
            .expect("FakeClock state lock should not be poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = FakeClock::new();
        assert_eq!(clock.timestamp(), Duration::ZERO);
    }

    #[test]
    fn sets_timestamp() {
        let clock = FakeClock::new();
        clock.set_timestamp(Duration::from_millis(150));

        assert_eq!(clock.timestamp(), Duration::from_millis(150));
    }

    #[test]
    fn advances_timestamp() {
        let clock = FakeClock::new();
        clock.set_timestamp(Duration::from_millis(100));
        clock.advance(Duration::from_millis(25));

        assert_eq!(clock.timestamp(), Duration::from_millis(125));
    }

    #[test]
    fn shared_state_between_clones() {
        let clock1 = FakeClock::new();
        let clock2 = clock1.clone();

        clock1.set_timestamp(Duration::from_millis(100));
        assert_eq!(clock2.timestamp(), Duration::from_millis(100));

        clock2.advance(Duration::from_millis(50));
        assert_eq!(clock1.timestamp(), Duration::from_millis(150));
    }
}
