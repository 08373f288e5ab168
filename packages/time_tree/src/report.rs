//! Rendered reports of completed span trees.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::span::{SpanId, SpanRecord};
use crate::tree::SpanTree;

/// A snapshot of one context's span tree, rendered as indented report text.
///
/// One line per explicitly shown span, in the form
/// `<indent><name> [threw <FailureKind>] <elapsedMs>ms`. A span earns its
/// own line if it is the root, carries a failure, or its elapsed time
/// reaches its threshold. Fast, repeated children sharing an identity are
/// collapsed into one summary line
/// (`<indent>* <count> calls to <identity> <totalMs>ms`), and each shown
/// span with children closes with an `Other` line carrying the time not
/// attributed to any direct child.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use time_tree::Context;
///
/// let mut context = Context::new();
/// context.span("request").threshold(Duration::ZERO).start();
/// context.start("db.query");
/// context.stop("db.query");
/// context.stop("request");
///
/// let report = context.to_report();
/// assert!(report.is_complete());
/// report.print_to_stdout();
/// ```
#[derive(Clone, Debug)]
pub struct Report {
    tree: SpanTree,
    root: Option<SpanId>,
    complete: bool,
}

impl Report {
    /// Creates a report with no recorded spans.
    pub(crate) fn empty() -> Self {
        Self {
            tree: SpanTree::new(),
            root: None,
            complete: true,
        }
    }

    /// Creates a report from a snapshot of a context's tree.
    pub(crate) fn from_tree(tree: SpanTree, root: SpanId, complete: bool) -> Self {
        Self {
            tree,
            root: Some(root),
            complete,
        }
    }

    /// Whether there are no recorded spans in this report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Whether the snapshot was taken with the context pointing at a true
    /// root. `false` means spans were still open and the report was rendered
    /// from the discovered root of the partial tree.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Renders the report text down to the given tree level (the root is
    /// level zero). Children below the cutoff are omitted entirely, along
    /// with the summary and `Other` lines of spans at the cutoff.
    #[must_use]
    pub fn render(&self, max_depth: usize) -> String {
        let mut text = String::new();

        self.render_to(&mut text, max_depth)
            .expect("writing to a String never fails");

        text
    }

    /// Prints the report to stdout.
    ///
    /// Prints nothing if no spans were recorded, so that instrumented tools
    /// with strict output protocols stay silent when idle.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }

        print!("{self}");
    }

    fn render_to<W: fmt::Write>(&self, f: &mut W, max_depth: usize) -> fmt::Result {
        let Some(root) = self.root else {
            return writeln!(f, "No spans recorded.");
        };

        self.render_span(f, root, 0, max_depth, &HashMap::new())
    }

    fn render_span<W: fmt::Write>(
        &self,
        f: &mut W,
        id: SpanId,
        depth: usize,
        max_depth: usize,
        parent_residue: &HashMap<&str, Vec<SpanId>>,
    ) -> fmt::Result {
        let span = self.tree.get(id);
        let shown =
            span.parent.is_none() || span.failure.is_some() || span.elapsed() >= span.threshold;

        if !shown {
            // Collapsed spans summarized by the parent print nothing here; a
            // singleton identity is never silently hidden and keeps its line.
            let summarized = parent_residue
                .get(span.identity.as_str())
                .is_some_and(|group| group.len() > 1);

            if !summarized {
                Self::write_span_line(f, span, depth)?;
            }

            return Ok(());
        }

        Self::write_span_line(f, span, depth)?;

        if !span.has_children() || depth >= max_depth {
            return Ok(());
        }

        let child_depth = depth.saturating_add(1);

        // Children below their threshold (and without failures) are
        // candidates for collapsing, grouped by identity.
        let mut residue: HashMap<&str, Vec<SpanId>> = HashMap::new();

        for &child_id in &span.children {
            let child = self.tree.get(child_id);

            if child.elapsed() < child.threshold && child.failure.is_none() {
                residue
                    .entry(child.identity.as_str())
                    .or_default()
                    .push(child_id);
            }
        }

        // Unaccounted time is signed: clock skew can push it negative.
        let mut unaccounted_ms = whole_millis(span.elapsed());

        for &child_id in &span.children {
            unaccounted_ms =
                unaccounted_ms.saturating_sub(whole_millis(self.tree.get(child_id).elapsed()));

            self.render_span(f, child_id, child_depth, max_depth, &residue)?;
        }

        // One summary line per multi-member identity group, in the order the
        // first member of each group was started.
        let mut summarized: Vec<&str> = Vec::new();

        for &child_id in &span.children {
            let identity = self.tree.get(child_id).identity.as_str();

            if summarized.contains(&identity) {
                continue;
            }

            let Some(group) = residue.get(identity) else {
                continue;
            };

            if group.len() < 2 {
                continue;
            }

            summarized.push(identity);

            let total_ms: i128 = group
                .iter()
                .map(|&member| whole_millis(self.tree.get(member).elapsed()))
                .sum();

            writeln!(
                f,
                "{indent}* {count} calls to {identity} {total_ms}ms",
                indent = indent(child_depth),
                count = group.len(),
            )?;
        }

        writeln!(
            f,
            "{indent}Other {unaccounted_ms}ms",
            indent = indent(child_depth),
        )
    }

    fn write_span_line<W: fmt::Write>(f: &mut W, span: &SpanRecord, depth: usize) -> fmt::Result {
        let indent = indent(depth);
        let elapsed_ms = whole_millis(span.elapsed());

        match &span.failure {
            Some(failure) => writeln!(
                f,
                "{indent}{name} threw [{kind}] {elapsed_ms}ms",
                name = span.name,
                kind = failure.kind(),
            ),
            None => writeln!(f, "{indent}{name} {elapsed_ms}ms", name = span.name),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render_to(f, usize::MAX)
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn whole_millis(duration: Duration) -> i128 {
    i128::try_from(duration.as_millis())
        .expect("all realistic durations fit in i128 milliseconds")
}
