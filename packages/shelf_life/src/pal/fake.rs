//! Fake clock implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pal::abstractions::Clock;

/// Fake implementation of the clock abstraction for testing.
///
/// This implementation allows tests to control the timestamps instead of
/// relying on the real clock, so expiry can be tested without sleeping.
/// Multiple clones of the same `FakeClock` share the same underlying state.
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

    /// Advances the current timestamp by the given amount.
    ///
    /// This affects all clones of this clock.
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
    fn advances_timestamp() {
        let clock = FakeClock::new();
        clock.advance(Duration::from_secs(90));

        assert_eq!(clock.timestamp(), Duration::from_secs(90));
    }

    #[test]
    fn shared_state_between_clones() {
        let clock1 = FakeClock::new();
        let clock2 = clock1.clone();

        clock1.advance(Duration::from_secs(10));
        assert_eq!(clock2.timestamp(), Duration::from_secs(10));
    }
}
