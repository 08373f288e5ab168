//! Best-effort caller identification for unnamed spans.

use std::fmt::Debug;
use std::panic::Location;
use std::path::Path;

/// Derives an operation name from the location of the calling code.
///
/// Explicit, caller-supplied names are the primary way to name spans;
/// implementations of this trait only serve the
/// [`start_here`](crate::Context::start_here) /
/// [`stop_here`](crate::Context::stop_here) convenience path and are
/// best-effort by design. Implementations must be pure, and because the
/// derived name is the join key matching a stop call to its start - two
/// calls that necessarily sit on different source lines - the derivation
/// must not depend on anything that differs between those two call sites,
/// such as the line number.
pub trait CallerNamer: Debug + Send {
    /// Derives an operation name for the given caller location.
    fn derive_name(&self, location: &Location<'_>) -> String;
}

/// Default namer deriving module-level names from the caller's source file
/// stem. A call anywhere in `checkout.rs` is named `checkout`.
///
/// The name deliberately excludes the line number: a start and its stop sit
/// on different lines of the same file, and both must derive the same name
/// for the pair to match up.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocationNamer;

impl CallerNamer for LocationNamer {
    fn derive_name(&self, location: &Location<'_>) -> String {
        let file = location.file();

        Path::new(file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file)
            .to_string()
    }
}
