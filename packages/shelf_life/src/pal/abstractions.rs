//! Clock abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides monotonic timestamps for entry age tracking.
///
/// Timestamps are expressed as durations since an arbitrary per-clock
/// origin, so they are only meaningful when compared against other
/// timestamps from the same clock.
pub(crate) trait Clock: Debug + Send + Sync + 'static {
    /// Gets the current monotonic timestamp.
    fn timestamp(&self) -> Duration;
}
