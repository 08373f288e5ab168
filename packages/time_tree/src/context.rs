//! Per-context span stack with mismatch recovery.

use std::cell::Cell;
use std::fmt;
use std::panic::Location;
use std::time::Duration;

use crate::namer::{CallerNamer, LocationNamer};
use crate::pal::{Clock, ClockFacade};
use crate::span::{Failure, SpanId};
use crate::start_builder::SpanStart;
use crate::tree::SpanTree;
use crate::{Diagnostic, Report};

/// Display threshold applied to root spans started without an explicit one.
///
/// Child spans inherit their parent's effective threshold instead.
pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(20);

/// Tracks one execution context's tree of timed spans.
///
/// A context maintains a single mutable reference to the currently open
/// span. [`start`](Self::start) pushes a new span under the current one and
/// makes it current; a matching [`stop`](Self::stop) pops it. When the
/// outermost span is stopped the tree is complete and can be rendered with
/// [`to_report`](Self::to_report) or [`render`](Self::render).
///
/// One context belongs to one logical unit of work (for example, one
/// serviced request); independent units of work each get their own context
/// and never share it. Reused contexts must be [`clear`](Self::clear)ed
/// between units of work.
///
/// Start/stop calls are paired manually by the surrounding code and can be
/// mismatched (an early return or panic may skip a stop). The context
/// self-heals: stopping an ancestor force-closes any spans left open below
/// it, recording a [`Diagnostic::RecoveredMismatch`] for each. No condition
/// arising in here ever propagates to the instrumented caller.
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
/// context.span("request").threshold(Duration::ZERO).start();
/// context.start("load_user");
/// // ... work ...
/// context.stop("load_user");
/// context.stop("request");
///
/// assert!(context.is_root_complete());
/// println!("{}", context.render(8));
/// ```
#[derive(Debug)]
pub struct Context {
    tree: SpanTree,
    current: Option<SpanId>,
    clock: ClockFacade,
    namer: Box<dyn CallerNamer>,
    diagnostics: Vec<Diagnostic>,

    /// Whether the current tree has been rendered while complete. A new
    /// root started afterwards begins a fresh tree.
    rendered: Cell<bool>,
}

impl Context {
    /// Creates a new context using the real monotonic clock and the default
    /// location-based caller namer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_namer(Box::new(LocationNamer))
    }

    /// Creates a new context with a custom caller namer for the
    /// [`start_here`](Self::start_here) / [`stop_here`](Self::stop_here)
    /// convenience path.
    #[must_use]
    pub fn with_namer(namer: Box<dyn CallerNamer>) -> Self {
        Self {
            tree: SpanTree::new(),
            current: None,
            clock: ClockFacade::real(),
            namer,
            diagnostics: Vec::new(),
            rendered: Cell::new(false),
        }
    }

    /// Creates a new context with a specific clock.
    ///
    /// This method is used for testing purposes to inject a fake clock that
    /// does not rely on real time passing.
    #[cfg(test)]
    pub(crate) fn with_clock(clock: ClockFacade) -> Self {
        Self {
            tree: SpanTree::new(),
            current: None,
            clock,
            namer: Box::new(LocationNamer),
            diagnostics: Vec::new(),
            rendered: Cell::new(false),
        }
    }

    /// Starts a span with the given name as a child of the currently open
    /// span (or as a fresh root), inheriting the parent's display threshold.
    ///
    /// An empty name is invalid: the call is ignored and a
    /// [`Diagnostic::InvalidName`] is recorded, because the name is the join
    /// key that a later stop call matches against.
    pub fn start(&mut self, name: impl Into<String>) {
        self.start_span(name.into(), None, None);
    }

    /// Starts a span named after the calling code location, via the
    /// context's [`CallerNamer`].
    #[track_caller]
    pub fn start_here(&mut self) {
        let name = self.namer.derive_name(Location::caller());
        self.start_span(name, None, None);
    }

    /// Begins building a span with optional identity and threshold
    /// overrides; call [`start`](SpanStart::start) on the result.
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
    /// context.stop("fetch_row");
    /// ```
    pub fn span(&mut self, name: impl Into<String>) -> SpanStart<'_> {
        SpanStart::new(self, name.into())
    }

    pub(crate) fn start_span(
        &mut self,
        name: String,
        identity: Option<String>,
        threshold: Option<Duration>,
    ) {
        if name.is_empty() {
            self.report_diagnostic(Diagnostic::InvalidName);
            return;
        }

        // Starting a new root after the previous tree was fully closed and
        // rendered begins a fresh unit of work; the old tree is discarded.
        if let Some(current) = self.current {
            let record = self.tree.get(current);

            if record.parent.is_none() && !record.is_open() && self.rendered.get() {
                self.tree.clear();
                self.diagnostics.clear();
                self.current = None;
                self.rendered.set(false);
            }
        }

        let identity = identity.unwrap_or_else(|| name.clone());
        let started_at = self.clock.timestamp();
        let id = self
            .tree
            .add_child(name, identity, self.current, threshold, started_at);

        self.current = Some(id);

        log::trace!("started span '{}'", self.tree.get(id).name);
    }

    /// Stops the span with the given name and returns its elapsed time, or
    /// `None` if no span was closed.
    ///
    /// Resolution order:
    ///
    /// 1. No span is open: a diagnostic is recorded and nothing changes.
    /// 2. The currently open span's name matches: it is closed and its
    ///    parent becomes current (a closed root stays current so the
    ///    finished tree can be rendered).
    /// 3. The last child of the current span matches by identity: its
    ///    identity and failure are updated without repositioning the stack.
    /// 4. An ancestor's name matches: every open span between the current
    ///    one and that ancestor is force-closed (each recorded as a
    ///    [`Diagnostic::RecoveredMismatch`]), then the stop is retried
    ///    against the ancestor.
    /// 5. Nothing matches: a [`Diagnostic::UnmatchedStop`] is recorded and
    ///    state is left unchanged.
    pub fn stop(&mut self, name: &str) -> Option<Duration> {
        self.stop_span(name, None, None)
    }

    /// Stops the span with the given name, optionally updating its identity
    /// and attaching a captured failure.
    ///
    /// A span carrying a failure is always shown explicitly in reports,
    /// regardless of its threshold.
    pub fn stop_with(
        &mut self,
        name: &str,
        identity: Option<&str>,
        failure: Option<Failure>,
    ) -> Option<Duration> {
        self.stop_span(name, identity, failure)
    }

    /// Stops the span named after the calling code location, via the
    /// context's [`CallerNamer`].
    ///
    /// With the default namer the derived name depends only on the calling
    /// file, so this pairs with a [`start_here`](Self::start_here) issued
    /// anywhere in the same file.
    #[track_caller]
    pub fn stop_here(&mut self) -> Option<Duration> {
        let name = self.namer.derive_name(Location::caller());
        self.stop_span(&name, None, None)
    }

    fn stop_span(
        &mut self,
        name: &str,
        identity: Option<&str>,
        failure: Option<Failure>,
    ) -> Option<Duration> {
        if name.is_empty() {
            self.report_diagnostic(Diagnostic::InvalidName);
            return None;
        }

        let Some(current) = self.current else {
            self.report_diagnostic(Diagnostic::UnmatchedStop {
                name: name.to_string(),
            });
            return None;
        };

        if self.tree.get(current).name == name {
            let stopped_at = self.clock.timestamp();
            let record = self.tree.get_mut(current);
            record.stopped_at = Some(stopped_at);
            record.failure = failure;

            let elapsed = record.elapsed();

            if let Some(parent) = record.parent {
                self.current = Some(parent);
            }

            log::trace!("stopped span '{name}' after {elapsed:?}");

            return Some(elapsed);
        }

        // Narrow fallback inherited from the original design: the stop names
        // the already-closed last child of the current span. The child's
        // identity and failure are updated without repositioning the stack.
        // Reachable only under a race in manual stop/start pairing whose
        // necessity is unconfirmed, hence the warning.
        if let Some(last_child) = self.tree.get(current).last_child() {
            if self.tree.get(last_child).identity == name {
                log::warn!("stopping already-closed last child '{name}' of the current span");

                let record = self.tree.get_mut(last_child);

                if let Some(identity) = identity {
                    record.identity = identity.to_string();
                }

                record.failure = failure;

                return None;
            }
        }

        if let Some(ancestor) = self.tree.find_ancestor_by_name(current, name) {
            // Force-close everything between the current span and the
            // matching ancestor, most recently opened first.
            let mut walker = current;

            while walker != ancestor {
                let stopped_at = self.clock.timestamp();
                let record = self.tree.get_mut(walker);
                record.stopped_at = Some(stopped_at);

                let forced = record.name.clone();
                let parent = record.parent;

                self.report_diagnostic(Diagnostic::RecoveredMismatch {
                    stopping: name.to_string(),
                    forced,
                });

                walker =
                    parent.expect("the matching ancestor lies above this span, so a parent exists");
            }

            self.current = Some(ancestor);

            // The ancestor is now current, so this resolves as a plain stop.
            return self.stop_span(name, identity, failure);
        }

        self.report_diagnostic(Diagnostic::UnmatchedStop {
            name: name.to_string(),
        });

        None
    }

    /// Records a diagnostic on the context and emits a matching log event.
    ///
    /// Measurement is advisory, so this is the strongest reaction any
    /// tracking problem gets; nothing propagates to the instrumented caller.
    fn report_diagnostic(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::InvalidName => log::error!("{diagnostic}"),
            Diagnostic::UnmatchedStop { .. } | Diagnostic::RecoveredMismatch { .. } => {
                log::warn!("{diagnostic}");
            }
        }

        self.diagnostics.push(diagnostic);
    }

    /// Drops the context's tree, current-span pointer, and recorded
    /// diagnostics.
    ///
    /// Call this between independent units of work on a reused context;
    /// otherwise an abandoned open tree grows without bound.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.current = None;
        self.diagnostics.clear();
        self.rendered.set(false);
    }

    /// Whether the context currently points at a root span (no parent) that
    /// has been closed, meaning the tree is complete and ready to render.
    #[must_use]
    pub fn is_root_complete(&self) -> bool {
        self.current.is_some_and(|id| {
            let record = self.tree.get(id);
            record.parent.is_none() && !record.is_open()
        })
    }

    /// The diagnostics recorded since the context was created or last
    /// cleared, in occurrence order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Creates a report from a snapshot of the context's span tree.
    ///
    /// If the current span is mid-tree (open spans remain), the snapshot
    /// walks up to the true root, renders from there, and the report is
    /// marked incomplete.
    #[must_use]
    pub fn to_report(&self) -> Report {
        let Some(current) = self.current else {
            return Report::empty();
        };

        let complete = self.tree.get(current).parent.is_none();

        let root = if complete {
            current
        } else {
            log::warn!("report requested while spans are still open; rendering from the root");
            self.tree.find_root(current)
        };

        if complete && !self.tree.get(root).is_open() {
            self.rendered.set(true);
        }

        Report::from_tree(self.tree.clone(), root, complete)
    }

    /// Renders the report text down to the given tree level (the root is
    /// level zero).
    ///
    /// This is a convenience method equivalent to
    /// `self.to_report().render(max_depth)`.
    #[must_use]
    pub fn render(&self, max_depth: usize) -> String {
        self.to_report().render(max_depth)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate to Report's Display implementation for consistency.
        write!(f, "{}", self.to_report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::FakeClock;

    fn create_test_context() -> (Context, FakeClock) {
        let clock = FakeClock::new();
        let context = Context::with_clock(ClockFacade::fake(clock.clone()));
        (context, clock)
    }

    #[test]
    fn matched_calls_build_nested_tree() {
        let (mut context, clock) = create_test_context();

        context.start("outer");
        clock.advance(Duration::from_millis(10));
        context.start("inner");
        clock.advance(Duration::from_millis(30));

        let inner_elapsed = context.stop("inner");
        assert_eq!(inner_elapsed, Some(Duration::from_millis(30)));
        assert!(!context.is_root_complete());

        let outer_elapsed = context.stop("outer");
        assert_eq!(outer_elapsed, Some(Duration::from_millis(40)));
        assert!(context.is_root_complete());
        assert!(context.diagnostics().is_empty());
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let (mut context, _clock) = create_test_context();

        assert_eq!(context.stop("never_started"), None);
        assert!(!context.is_root_complete());
        assert_eq!(
            context.diagnostics(),
            [Diagnostic::UnmatchedStop {
                name: "never_started".to_string(),
            }]
        );
    }

    #[test]
    fn mismatched_stop_force_closes_intervening_spans() {
        let (mut context, clock) = create_test_context();

        context.start("a");
        clock.advance(Duration::from_millis(5));
        context.start("b");
        clock.advance(Duration::from_millis(5));

        // Stopping "a" while "b" is still open must close "b" first.
        let elapsed = context.stop("a");

        assert_eq!(elapsed, Some(Duration::from_millis(10)));
        assert!(context.is_root_complete());
        assert_eq!(
            context.diagnostics(),
            [Diagnostic::RecoveredMismatch {
                stopping: "a".to_string(),
                forced: "b".to_string(),
            }]
        );
    }

    #[test]
    fn recovery_closes_most_recently_opened_first() {
        let (mut context, clock) = create_test_context();

        context.start("a");
        context.start("b");
        context.start("c");
        clock.advance(Duration::from_millis(1));

        context.stop("a");

        // LIFO: "c" is force-closed before "b".
        assert_eq!(
            context.diagnostics(),
            [
                Diagnostic::RecoveredMismatch {
                    stopping: "a".to_string(),
                    forced: "c".to_string(),
                },
                Diagnostic::RecoveredMismatch {
                    stopping: "a".to_string(),
                    forced: "b".to_string(),
                },
            ]
        );
        assert!(context.is_root_complete());
    }

    #[test]
    fn unmatched_stop_leaves_state_unchanged() {
        let (mut context, _clock) = create_test_context();

        context.start("a");
        context.start("b");

        assert_eq!(context.stop("zzz"), None);

        // "b" is still the open span, so stopping it works normally.
        assert_eq!(
            context.diagnostics(),
            [Diagnostic::UnmatchedStop {
                name: "zzz".to_string(),
            }]
        );
        assert!(context.stop("b").is_some());
        assert!(context.stop("a").is_some());
        assert!(context.is_root_complete());
    }

    #[test]
    fn stop_of_closed_last_child_updates_it_in_place() {
        let (mut context, _clock) = create_test_context();

        context.start("parent");
        context.start("child");
        context.stop("child");

        // "parent" is current again; stopping "child" once more hits the
        // last-child fallback and attaches the failure without moving the
        // stack.
        let result = context.stop_with(
            "child",
            Some("child.retry"),
            Some(Failure::new("Timeout", "deadline exceeded")),
        );

        assert_eq!(result, None);
        assert!(!context.is_root_complete());
        assert!(context.stop("parent").is_some());
        assert!(context.is_root_complete());

        // The failure really landed on the child record: it pins the child
        // into the report regardless of its threshold.
        assert!(context.render(8).contains("child threw [Timeout]"));
    }

    #[test]
    fn stop_of_closed_last_child_regroups_it_by_identity() {
        let (mut context, _clock) = create_test_context();

        context.start("parent");
        context.span("a").identity("db.query").start();
        context.stop("a");
        context.span("b").identity("db.query").start();
        context.stop("b");
        context.start("child");
        context.stop("child");

        // Last-child fallback rewrites the child's identity in place.
        assert_eq!(context.stop_with("child", Some("db.query"), None), None);
        context.stop("parent");

        // All three fast children now share one identity, so the report
        // collapses them into a single summary line.
        assert!(context.render(8).contains("* 3 calls to db.query"));
    }

    #[test]
    fn empty_name_is_rejected_without_starting_a_span() {
        let (mut context, _clock) = create_test_context();

        context.start("");

        assert_eq!(context.diagnostics(), [Diagnostic::InvalidName]);
        assert!(!context.is_root_complete());
        assert_eq!(context.stop(""), None);
    }

    #[test]
    fn failure_is_attached_on_stop() {
        let (mut context, _clock) = create_test_context();

        context.start("flaky");
        let parse_error = "abc".parse::<u32>().unwrap_err();
        context.stop_with("flaky", None, Some(Failure::from_error(&parse_error)));

        let report = context.to_report();
        assert!(report.to_string().contains("threw [ParseIntError]"));
    }

    #[test]
    fn clear_resets_everything() {
        let (mut context, _clock) = create_test_context();

        context.start("work");
        context.stop("zzz"); // records a diagnostic
        context.clear();

        assert!(!context.is_root_complete());
        assert!(context.diagnostics().is_empty());
        assert!(context.to_report().is_empty());
    }

    #[test]
    fn closed_root_stays_current_for_rendering() {
        let (mut context, _clock) = create_test_context();

        context.start("root");
        context.stop("root");

        assert!(context.is_root_complete());
        assert!(!context.to_report().is_empty());
    }

    #[test]
    fn new_root_after_rendered_tree_starts_fresh() {
        let (mut context, clock) = create_test_context();

        context.start("first");
        clock.advance(Duration::from_millis(50));
        context.stop("first");

        // Rendering the completed tree marks it as consumed.
        let first_report = context.render(8);
        assert!(first_report.contains("first"));

        context.start("second");
        context.stop("second");

        let second_report = context.render(8);
        assert!(second_report.contains("second"));
        assert!(!second_report.contains("first"));
    }

    #[test]
    fn new_start_on_unrendered_complete_tree_extends_it() {
        let (mut context, clock) = create_test_context();

        context.start("root");
        clock.advance(Duration::from_millis(50));
        context.stop("root");

        // Never rendered, so the data must not be lost: the new span joins
        // the existing tree under its root.
        context.start("late");
        context.stop("late");

        let report = context.render(8);
        assert!(report.contains("root"));
        assert!(report.contains("late"));
    }

    #[test]
    fn start_here_and_stop_here_pair_with_the_default_namer() {
        let (mut context, _clock) = create_test_context();

        // The two calls sit on different lines, so pairing only works if
        // the derived name ignores the line number.
        context.start_here();
        let elapsed = context.stop_here();

        assert!(elapsed.is_some());
        assert!(context.is_root_complete());
        assert!(context.diagnostics().is_empty());
        assert!(context.render(8).contains("context"));
    }

    #[test]
    fn start_here_and_stop_here_pair_through_the_namer() {
        #[derive(Debug)]
        struct FixedNamer;

        impl CallerNamer for FixedNamer {
            fn derive_name(&self, _location: &Location<'_>) -> String {
                "unit.operation".to_string()
            }
        }

        let mut context = Context::with_namer(Box::new(FixedNamer));

        context.start_here();
        let elapsed = context.stop_here();

        assert!(elapsed.is_some());
        assert!(context.is_root_complete());
        assert!(context.render(8).contains("unit.operation"));
    }

    #[test]
    fn threshold_inherited_from_open_parent() {
        let (mut context, clock) = create_test_context();

        context
            .span("root")
            .threshold(Duration::from_millis(100))
            .start();
        context.start("child");
        clock.advance(Duration::from_millis(50));
        context.stop("child");
        clock.advance(Duration::from_millis(60));
        context.stop("root");

        // The child inherited the 100ms threshold, so at 50ms it collapses;
        // only the root (110ms >= 100ms) gets an explicit line.
        let report = context.render(8);
        assert!(report.contains("root"));
        assert!(report.contains("child"));

        context.clear();
        context
            .span("root")
            .threshold(Duration::from_millis(100))
            .start();
        context
            .span("child")
            .threshold(Duration::from_millis(10))
            .start();
        clock.advance(Duration::from_millis(50));
        context.stop("child");
        context.stop("root");

        // Explicit override beats inheritance: 50ms >= 10ms shows the child.
        let report = context.render(8);
        assert!(report.contains("child 50ms"));
    }

    static_assertions::assert_impl_all!(Context: Send);
}
