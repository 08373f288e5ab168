//! Diagnostic taxonomy for fail-soft error reporting.

use thiserror::Error;

/// Non-fatal conditions recorded while tracking spans.
///
/// Measurement is advisory: the tracker must never alter the control flow
/// of the code it measures, so none of these conditions propagate to the
/// instrumented caller. Each occurrence is logged and recorded on the
/// owning [`Context`](crate::Context), where tests and diagnostics tooling
/// can inspect it via [`Context::diagnostics()`](crate::Context::diagnostics).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// `start` or `stop` was invoked with an empty operation name.
    ///
    /// The name is the join key for nesting, so no default is substituted;
    /// the call is ignored.
    #[error("empty span name; the start/stop call was ignored")]
    InvalidName,

    /// A `stop` call named a span that is neither the current top of the
    /// stack nor an open ancestor. State is left unchanged.
    #[error("stopping '{name}' but it was not found on the span stack")]
    UnmatchedStop {
        /// The name the stop call tried to close.
        name: String,
    },

    /// An open span was force-closed while recovering from a mismatched
    /// stop, typically because an early return or panic skipped its own
    /// stop call. The tree remains usable.
    #[error("stopping '{stopping}' force-closed the open span '{forced}'")]
    RecoveredMismatch {
        /// The name the stop call was resolving.
        stopping: String,

        /// The open span that was force-closed during recovery.
        forced: String,
    },
}
