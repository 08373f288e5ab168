//! Builder for starting spans with optional overrides.

use std::time::Duration;

use crate::Context;

/// Builder for starting a span with an explicit identity and/or display
/// threshold.
///
/// Created by [`Context::span()`]; the span only starts when
/// [`start()`](Self::start) is called.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use time_tree::Context;
///
/// let mut context = Context::new();
///
/// context
///     .span("fetch_row")
///     .identity("db.query")
///     .threshold(Duration::from_millis(5))
///     .start();
///
/// context.stop("fetch_row");
/// ```
#[derive(Debug)]
#[must_use = "the span only starts when start() is called"]
pub struct SpanStart<'c> {
    context: &'c mut Context,
    name: String,
    identity: Option<String>,
    threshold: Option<Duration>,
}

impl<'c> SpanStart<'c> {
    pub(crate) fn new(context: &'c mut Context, name: String) -> Self {
        Self {
            context,
            name,
            identity: None,
            threshold: None,
        }
    }

    /// Sets the identity tag used to group repeated calls to the same
    /// logical operation in reports. Defaults to the span name.
    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Sets the display threshold for this span, overriding the threshold
    /// it would otherwise inherit from its parent.
    pub fn threshold(mut self, threshold: Duration) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Starts the span, making it the context's currently open span.
    pub fn start(self) {
        self.context
            .start_span(self.name, self.identity, self.threshold);
    }
}
