//! Real clock implementation using the operating system monotonic clock.

use std::time::{Duration, Instant};

use crate::pal::abstractions::Clock;

/// Real clock implementation backed by [`Instant`].
///
/// Timestamps are measured from the moment the clock was created, which is
/// fine because only differences between timestamps are ever used.
#[derive(Clone, Debug)]
pub(crate) struct RealClock {
    origin: Instant,
}

impl RealClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for RealClock {
    fn timestamp(&self) -> Duration {
        self.origin.elapsed()
    }
}
