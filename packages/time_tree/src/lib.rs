//! Call-tree wall clock time tracking for finding where the time went.
//!
//! This package lets arbitrary code mark "start of operation" / "stop of
//! operation" boundaries and reconstructs, per logical execution context, a
//! nested tree of timed spans. The tree renders as a human-readable report
//! with automatic noise suppression: fast, repeated sub-operations collapse
//! into one summary line instead of drowning out the slow paths.
//!
//! The core functionality includes:
//! - [`Context`] - Per-unit-of-work span stack; start/stop operations with
//!   self-healing recovery from mismatched calls
//! - [`Report`] - Snapshot of a span tree, rendered with threshold pruning
//!   and residual grouping
//! - [`Failure`] - Captured error metadata that pins a span into the report
//! - [`Diagnostic`] - Fail-soft taxonomy of tracking problems
//! - [`CallerNamer`] - Pluggable best-effort naming for unnamed spans
//!
//! This package is not meant for use in production, serving only as a
//! development tool.
//!
//! # Simple usage
//!
//! ```
//! use std::time::Duration;
//!
//! use time_tree::Context;
//!
//! let mut context = Context::new();
//!
//! context.span("request").threshold(Duration::ZERO).start();
//! context.start("load_user");
//! // ... look the user up ...
//! context.stop("load_user");
//! context.stop("request");
//!
//! assert!(context.is_root_complete());
//! context.to_report().print_to_stdout();
//! ```
//!
//! # Grouping repeated operations
//!
//! Spans that finish below their display threshold and share an identity
//! tag are collapsed into one summary line:
//!
//! ```
//! use std::time::Duration;
//!
//! use time_tree::Context;
//!
//! let mut context = Context::new();
//!
//! context
//!     .span("report_page")
//!     .threshold(Duration::from_millis(50))
//!     .start();
//!
//! for row in 0..100 {
//!     context.span(format!("row_{row}")).identity("render_row").start();
//!     context.stop(&format!("row_{row}"));
//! }
//!
//! context.stop("report_page");
//!
//! // The hundred fast row renders become a single "* 100 calls to
//! // render_row ...ms" line in the report.
//! println!("{context}");
//! ```
//!
//! # Mismatch recovery
//!
//! Start/stop calls are paired manually and may be mismatched when an early
//! return or panic skips a stop. Stopping an enclosing span force-closes
//! whatever was left open below it, records a
//! [`Diagnostic::RecoveredMismatch`] per victim, and carries on - the tree
//! never becomes permanently corrupted and nothing propagates to the
//! instrumented caller:
//!
//! ```
//! use time_tree::Context;
//!
//! let mut context = Context::new();
//!
//! context.start("outer");
//! context.start("forgotten");
//! context.stop("outer"); // closes "forgotten" first, then "outer"
//!
//! assert!(context.is_root_complete());
//! assert_eq!(context.diagnostics().len(), 1);
//! ```
//!
//! # Threading
//!
//! A context belongs to one logical unit of work at a time; independent
//! units of work each use their own context, so no locking is involved.
//! Reused contexts must be [`Context::clear`]ed between units of work.

mod context;
mod diagnostics;
mod namer;
mod pal;
mod report;
mod span;
mod start_builder;
mod tree;

pub use context::{Context, DEFAULT_THRESHOLD};
pub use diagnostics::Diagnostic;
pub use namer::{CallerNamer, LocationNamer};
pub use report::Report;
pub use span::Failure;
pub use start_builder::SpanStart;
