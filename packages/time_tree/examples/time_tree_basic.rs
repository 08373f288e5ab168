//! Simplified example demonstrating key `time_tree` types working together.
//!
//! This example shows how to use the main types in the `time_tree` package:
//! - `Context`: Per-unit-of-work span stack with start/stop operations
//! - `Report`: Rendered call tree with threshold pruning
//!
//! Run with: `cargo run --example time_tree_basic`.

use std::thread;
use std::time::Duration;

use time_tree::Context;

fn main() {
    println!("=== Call-Tree Time Tracking Example ===");
    println!();

    // One context per logical unit of work.
    let mut context = Context::new();

    // A zero threshold shows every span explicitly; see the other examples
    // for threshold-based collapsing.
    context.span("handle_request").threshold(Duration::ZERO).start();

    context.start("parse_input");
    thread::sleep(Duration::from_millis(15));
    context.stop("parse_input");

    context.start("load_data");
    {
        context.start("db.connect");
        thread::sleep(Duration::from_millis(30));
        context.stop("db.connect");

        context.start("db.query");
        thread::sleep(Duration::from_millis(45));
        context.stop("db.query");
    }
    context.stop("load_data");

    context.start("render_response");
    thread::sleep(Duration::from_millis(10));
    context.stop("render_response");

    context.stop("handle_request");

    assert!(context.is_root_complete());
    context.to_report().print_to_stdout();

    println!();
    println!("Each level is indented; 'Other' lines carry the time a span");
    println!("spent outside its children.");
}
