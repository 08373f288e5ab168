//! Example of a custom namer that memoizes derived names in a bounded
//! cache, so hot call sites do not re-derive their name on every start.

use std::panic::Location;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use shelf_life::Cache;
use time_tree::{CallerNamer, Context, LocationNamer};

/// Wraps another namer and caches its output per calling file.
///
/// The default derivation depends only on the file, so the wrapped namer
/// runs once per file and later calls are served from the cache until the
/// entry ages out or is evicted.
#[derive(Debug)]
struct MemoizingNamer {
    inner: LocationNamer,
    cache: Mutex<Cache<String, String>>,
}

impl MemoizingNamer {
    fn new() -> Self {
        Self {
            inner: LocationNamer,
            cache: Mutex::new(Cache::with_limits(256, Duration::from_secs(600))),
        }
    }
}

impl CallerNamer for MemoizingNamer {
    fn derive_name(&self, location: &Location<'_>) -> String {
        let key = location.file().to_string();

        let mut cache = self
            .cache
            .lock()
            .expect("namer cache lock should not be poisoned");

        if let Some(name) = cache.get(&key) {
            return name.clone();
        }

        let name = self.inner.derive_name(location);
        cache.insert(key, name.clone());
        name
    }
}

fn main() {
    let mut context = Context::with_namer(Box::new(MemoizingNamer::new()));

    context.start("handle");

    // Every iteration starts and stops a span named after this file; the
    // namer derives that name once and serves cache hits after that. The
    // iterations are fast, so the report groups them into a single
    // repeated-calls line under "handle".
    for _ in 0..3 {
        context.start_here();
        thread::sleep(Duration::from_millis(5));
        context.stop_here();
    }

    thread::sleep(Duration::from_millis(30));
    context.stop("handle");

    context.to_report().print_to_stdout();
}
