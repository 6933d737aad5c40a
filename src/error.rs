//! Error taxonomy for lifecycle, sink resolution, and emission failures.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for logger operations.
#[derive(Debug)]
pub enum LogError {
    /// An operation was used before `initialize`.
    NotInitialized,
    /// `initialize` was called twice without an intervening shutdown.
    AlreadyInitialized,
    /// The sink has no target with the given name.
    TargetNotFound(String),
    /// The named target exists but is not file-backed.
    TargetTypeMismatch {
        target: String,
        kind: &'static str,
    },
    /// The target's file was still absent after one flush-and-recheck.
    FileMissingAfterFlush(PathBuf),
    /// The sink rejected a record or failed to flush.
    Emit(io::Error),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "Logger has not been initialized"),
            Self::AlreadyInitialized => write!(f, "Logger has already been initialized"),
            Self::TargetNotFound(name) => write!(f, "Could not find target named: {name}"),
            Self::TargetTypeMismatch { target, kind } => {
                write!(f, "Target {target} is not file-backed (kind: {kind})")
            }
            Self::FileMissingAfterFlush(path) => {
                write!(f, "Logfile {} does not exist even after flush", path.display())
            }
            Self::Emit(e) => write!(f, "Sink emission failed: {e}"),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Emit(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LogError {
    fn from(e: io::Error) -> Self {
        Self::Emit(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_target() {
        let err = LogError::TargetNotFound("logfile".to_string());
        assert!(err.to_string().contains("logfile"));
    }

    #[test]
    fn test_display_mismatch_names_kind() {
        let err = LogError::TargetTypeMismatch {
            target: "console".to_string(),
            kind: "console",
        };
        let msg = err.to_string();
        assert!(msg.contains("console"));
        assert!(msg.contains("not file-backed"));
    }

    #[test]
    fn test_emit_has_source() {
        use std::error::Error;
        let err = LogError::from(io::Error::new(io::ErrorKind::Other, "disk full"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_lifecycle_errors_have_no_source() {
        use std::error::Error;
        assert!(LogError::NotInitialized.source().is_none());
        assert!(LogError::AlreadyInitialized.source().is_none());
    }
}
