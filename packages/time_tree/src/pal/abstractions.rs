//! Clock abstraction trait definitions.

use std::fmt::Debug;
use std::time::Duration;

/// Provides monotonic timestamps for span timing.
///
/// Timestamps are expressed as durations since an arbitrary per-clock origin,
/// so they are only meaningful when compared against other timestamps from
/// the same clock. This trait abstracts the time source, allowing for both
/// a real implementation (the operating system monotonic clock) and a fake
/// implementation (for testing).
pub(crate) trait Clock: Debug + Send + Sync + 'static {
    /// Gets the current monotonic timestamp.
    fn timestamp(&self) -> Duration;
}
