//! Process-wide logger slot with explicit initialize/shutdown lifecycle.
//!
//! Programs that wire the logger through their composition root can ignore
//! this module entirely and share a [`Logger`] by `Arc`. The registry exists
//! for the common case of one ambient logger per process: one slot, guarded
//! by one lock, so initialize, current, and shutdown are mutually exclusive
//! and a shutdown cannot interleave with a concurrent read of the instance.
//!
//! [`current`] hands out a clone of the `Arc`, so a handle obtained just
//! before a concurrent [`shutdown`] stays valid for its holder; what callers
//! must not do is cache a handle long-term and expect it to observe a
//! re-initialization.

use std::sync::{Arc, Mutex};

use crate::error::LogError;
use crate::level::Level;
use crate::logger::Logger;
use crate::sink::{LogBridge, Sink};
use crate::sync::lock_recover;

static SLOT: Mutex<Option<Arc<Logger>>> = Mutex::new(None);

/// Initialize the process-wide logger with a [`LogBridge`] sink.
///
/// # Errors
///
/// [`LogError::AlreadyInitialized`] if a live instance exists.
pub fn initialize(echo_threshold: Level) -> Result<Arc<Logger>, LogError> {
    initialize_with(Arc::new(LogBridge::new()), echo_threshold)
}

/// Initialize the process-wide logger with a caller-supplied sink.
///
/// # Errors
///
/// [`LogError::AlreadyInitialized`] if a live instance exists.
pub fn initialize_with(
    sink: Arc<dyn Sink>,
    echo_threshold: Level,
) -> Result<Arc<Logger>, LogError> {
    let mut slot = lock_recover(&SLOT);
    if slot.is_some() {
        return Err(LogError::AlreadyInitialized);
    }
    let logger = Arc::new(
        Logger::builder()
            .sink(sink)
            .echo_threshold(echo_threshold)
            .build(),
    );
    *slot = Some(Arc::clone(&logger));
    Ok(logger)
}

/// The live process-wide logger.
///
/// Not self-initializing: [`initialize`] must have been called. Fetch the
/// handle through this accessor at each use rather than caching it across a
/// potential shutdown boundary.
///
/// # Errors
///
/// [`LogError::NotInitialized`] before `initialize`.
pub fn current() -> Result<Arc<Logger>, LogError> {
    lock_recover(&SLOT)
        .as_ref()
        .map(Arc::clone)
        .ok_or(LogError::NotInitialized)
}

/// Flush the sink, then discard the process-wide instance.
///
/// # Errors
///
/// [`LogError::NotInitialized`] when no instance is live. A flush failure
/// propagates and leaves the instance registered, so the caller can retry.
pub fn shutdown() -> Result<(), LogError> {
    let mut slot = lock_recover(&SLOT);
    let logger = slot.as_ref().ok_or(LogError::NotInitialized)?;
    logger.flush()?;
    *slot = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemoryTarget, TargetSink};
    use serial_test::serial;

    fn reset() {
        *SLOT.lock().unwrap() = None;
    }

    #[test]
    #[serial]
    fn test_current_before_initialize_fails() {
        reset();
        assert!(matches!(current(), Err(LogError::NotInitialized)));
    }

    #[test]
    #[serial]
    fn test_double_initialize_fails() {
        reset();
        initialize(Level::Error).unwrap();
        assert!(matches!(
            initialize(Level::Warn),
            Err(LogError::AlreadyInitialized)
        ));
        shutdown().unwrap();
    }

    #[test]
    #[serial]
    fn test_initialize_shutdown_initialize_cycle() {
        reset();
        initialize(Level::Error).unwrap();
        shutdown().unwrap();
        initialize(Level::Trace).unwrap();
        assert_eq!(current().unwrap().echo_threshold(), Level::Trace);
        shutdown().unwrap();
    }

    #[test]
    #[serial]
    fn test_shutdown_uninitialized_is_defined_error() {
        reset();
        assert!(matches!(shutdown(), Err(LogError::NotInitialized)));
    }

    #[test]
    #[serial]
    fn test_current_returns_the_initialized_instance() {
        reset();
        let created = initialize(Level::Warn).unwrap();
        let fetched = current().unwrap();
        assert!(Arc::ptr_eq(&created, &fetched));
        shutdown().unwrap();
    }

    #[test]
    #[serial]
    fn test_handle_survives_shutdown() {
        reset();
        let memory = MemoryTarget::new();
        initialize_with(
            Arc::new(TargetSink::new().with_memory("memory", memory.clone())),
            Level::Error,
        )
        .unwrap();

        let handle = current().unwrap();
        shutdown().unwrap();

        // The registry slot is gone, but the reference-counted handle is
        // still a working logger.
        assert!(matches!(current(), Err(LogError::NotInitialized)));
        handle.info("after shutdown").unwrap();
        assert_eq!(memory.len(), 1);
    }

    #[test]
    #[serial]
    fn test_shutdown_flushes_file_target() {
        reset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shutdown.log");
        initialize_with(
            Arc::new(TargetSink::new().with_file("logfile", &path)),
            Level::Error,
        )
        .unwrap();

        current().unwrap().warn("buffered until shutdown").unwrap();
        assert!(!path.exists());

        shutdown().unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("buffered until shutdown"));
    }
}
