//! Demonstrates threshold pruning, residual grouping, and failure display.
//!
//! A busy span tree usually contains hundreds of fast, repeated
//! sub-operations that would drown out the interesting slow paths. Spans
//! that finish below their display threshold and share an identity tag are
//! collapsed into one summary line per identity.
//!
//! Run with: `cargo run --example time_tree_report`.

use std::thread;
use std::time::Duration;

use time_tree::{Context, Failure};

fn main() {
    let mut context = Context::new();

    // Spans below 20ms collapse unless they recur under another identity.
    context
        .span("render_report_page")
        .threshold(Duration::from_millis(20))
        .start();

    // A hundred fast row renders: one summary line in the report.
    for row in 0..100 {
        context
            .span(format!("row_{row}"))
            .identity("render_row")
            .start();
        context.stop(&format!("row_{row}"));
    }

    // A one-off fast operation: unique identity, so it keeps its own line
    // instead of being silently hidden.
    context.start("load_stylesheet");
    thread::sleep(Duration::from_millis(2));
    context.stop("load_stylesheet");

    // A slow operation: shown explicitly with its own subtree.
    context.start("fetch_totals");
    thread::sleep(Duration::from_millis(40));
    context.stop("fetch_totals");

    // A failed operation: always shown, tagged with the failure kind, even
    // though it finished instantly.
    context.start("send_notification");
    let error = "not a number".parse::<u32>().unwrap_err();
    context.stop_with("send_notification", None, Some(Failure::from_error(&error)));

    context.stop("render_report_page");

    context.to_report().print_to_stdout();
}
