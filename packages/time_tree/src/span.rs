//! Span records and failure metadata.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Opaque handle to a span within one context's tree.
///
/// Handles are only meaningful within the tree that created them. Spans are
/// never removed individually, so a handle stays valid until the whole tree
/// is discarded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct SpanId(pub(crate) usize);

/// A failure captured against a span.
///
/// A span carrying a failure is always shown explicitly in reports, tagged
/// with the failure kind, regardless of its display threshold.
///
/// # Examples
///
/// ```
/// use time_tree::Failure;
///
/// let parse_error = "abc".parse::<u32>().unwrap_err();
/// let failure = Failure::from_error(&parse_error);
///
/// assert_eq!(failure.kind(), "ParseIntError");
/// ```
#[derive(Clone, Debug)]
pub struct Failure {
    kind: String,
    message: String,
}

impl Failure {
    /// Creates a failure from an explicit kind and message.
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Creates a failure from any error, deriving the kind from the error's
    /// type name (last path segment only).
    #[must_use]
    pub fn from_error<E: Error>(error: &E) -> Self {
        let type_name = std::any::type_name::<E>();
        let kind = type_name.rsplit("::").next().unwrap_or(type_name);

        Self {
            kind: kind.to_string(),
            message: error.to_string(),
        }
    }

    /// The failure kind, typically a short type name such as `ParseIntError`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// One timed operation occurrence within a context's tree.
///
/// Mutated only while open; once the stop timestamp is recorded the timing
/// fields are final. Parent/child links are arena indexes, with children
/// stored in start order.
#[derive(Clone, Debug)]
pub(crate) struct SpanRecord {
    pub(crate) name: String,

    /// Grouping tag for summarizing repeated collapsible spans; defaults to
    /// the span name.
    pub(crate) identity: String,

    /// Minimum elapsed time for explicit display in reports. Inherited from
    /// the parent at creation unless explicitly overridden.
    pub(crate) threshold: Duration,

    pub(crate) started_at: Duration,
    pub(crate) stopped_at: Option<Duration>,

    pub(crate) failure: Option<Failure>,

    pub(crate) parent: Option<SpanId>,
    pub(crate) children: Vec<SpanId>,
}

impl SpanRecord {
    /// Whether the stop timestamp has not yet been recorded.
    pub(crate) fn is_open(&self) -> bool {
        self.stopped_at.is_none()
    }

    pub(crate) fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Elapsed time between start and stop; zero while the span is open.
    pub(crate) fn elapsed(&self) -> Duration {
        self.stopped_at
            .map_or(Duration::ZERO, |stopped_at| {
                stopped_at.saturating_sub(self.started_at)
            })
    }

    pub(crate) fn last_child(&self) -> Option<SpanId> {
        self.children.last().copied()
    }
}
