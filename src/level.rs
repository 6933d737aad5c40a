//! Severity levels and their total order.

use std::fmt;
use std::str::FromStr;

/// Log severity, most severe first.
///
/// The derived order follows declaration order, so `Fatal` compares lowest.
/// Console-echo threshold checks rely on this: a level is echoed when
/// `level <= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Fatal,
    Error,
    Warn,
    Info,
    Trace,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 5] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Trace,
    ];

    /// Capitalized name, as used in the console echo prefix.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Level::Fatal => "Fatal",
            Level::Error => "Error",
            Level::Warn => "Warn",
            Level::Info => "Info",
            Level::Trace => "Trace",
        }
    }

    /// Upper-case name, as used by line-oriented targets.
    #[must_use]
    pub fn upper_name(self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Trace => "TRACE",
        }
    }

    /// Parse a level name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ParseLevelError`] if the string names no level.
    pub fn parse(s: &str) -> Result<Self, ParseLevelError> {
        match s.to_ascii_lowercase().as_str() {
            "fatal" => Ok(Level::Fatal),
            "error" => Ok(Level::Error),
            "warn" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            "trace" => Ok(Level::Trace),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }

    /// Map to the `log` crate's level for the bridge sink.
    ///
    /// `log` has no Fatal, so both `Fatal` and `Error` map to
    /// `log::Level::Error`.
    #[must_use]
    pub fn to_log_level(self) -> log::Level {
        match self {
            Level::Fatal | Level::Error => log::Level::Error,
            Level::Warn => log::Level::Warn,
            Level::Info => log::Level::Info,
            Level::Trace => log::Level::Trace,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::parse(s)
    }
}

/// Error type for level parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown level: {}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}
