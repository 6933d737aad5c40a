//! Caller identity captured at compile time.
//!
//! Every public logging method is `#[track_caller]`, so the file and line
//! recorded here are those of the immediate caller of the facade, resolved by
//! the compiler rather than by walking the stack at runtime. Helper functions
//! that forward to the facade can themselves be `#[track_caller]` to stay
//! transparent.

use std::fmt;
use std::panic::Location;

/// Stable identity of a call site: source file plus line number.
///
/// Used as the key for per-site fatal counters. The rendered form is
/// `"<file>(<line>)"`. The file path is relativized against this crate's
/// manifest directory when the compiler emitted it absolute; paths already
/// emitted workspace-relative pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerKey {
    file: &'static str,
    line: u32,
}

const MANIFEST_DIR: &str = env!("CARGO_MANIFEST_DIR");

impl CallerKey {
    /// Resolve the key for the current call site.
    #[track_caller]
    #[must_use]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    /// Build a key from an explicit location.
    #[must_use]
    pub fn from_location(location: &'static Location<'static>) -> Self {
        let file = location.file();
        let file = file
            .strip_prefix(MANIFEST_DIR)
            .map_or(file, |rest| rest.trim_start_matches(['/', '\\']));
        Self {
            file,
            line: location.line(),
        }
    }

    /// Source file path.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Line number within [`file`](Self::file).
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for CallerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.file, self.line)
    }
}
