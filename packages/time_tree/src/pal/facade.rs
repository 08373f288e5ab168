//! Clock facade for switching between real and fake implementations.

use std::time::Duration;

use crate::pal::abstractions::Clock;
#[cfg(test)]
use crate::pal::fake::FakeClock;
use crate::pal::real::RealClock;

/// Facade that allows switching between real and fake clock implementations.
///
/// This enum provides a unified interface to either the real monotonic clock
/// or a fake clock (for testing).
#[derive(Clone, Debug)]
pub(crate) enum ClockFacade {
    /// Real clock implementation using the operating system monotonic clock.
    Real(RealClock),

    /// Fake clock implementation for testing.
    #[cfg(test)]
    Fake(FakeClock),
}

impl ClockFacade {
    /// Creates a new clock facade using the real implementation.
    pub(crate) fn real() -> Self {
        Self::Real(RealClock::new())
    }

    /// Creates a new clock facade using the fake implementation.
    #[cfg(test)]
    pub(crate) fn fake(fake_clock: FakeClock) -> Self {
        Self::Fake(fake_clock)
    }
}

impl Clock for ClockFacade {
    fn timestamp(&self) -> Duration {
        match self {
            Self::Real(clock) => clock.timestamp(),
            #[cfg(test)]
            Self::Fake(clock) => clock.timestamp(),
        }
    }
}
