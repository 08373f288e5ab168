//! Platform abstraction layer for entry age tracking.
//!
//! This module provides a clock abstraction that allows switching between
//! the real monotonic clock and a fake implementation for testing purposes.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::Clock;
pub(crate) use facade::ClockFacade;
#[cfg(test)]
pub(crate) use fake::FakeClock;
