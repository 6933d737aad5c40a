//! Sink adapter and the concrete targets shipped with the crate.
//!
//! A [`Sink`] renders, persists, or ships records; the facade only ever calls
//! `emit`, `flush`, and `target_path`. Emission failures propagate to the
//! logging call unmodified, the facade never retries.
//!
//! Shipped sinks:
//! - [`TargetSink`]: fan-out over named targets (file, console, memory).
//! - [`LogBridge`]: forwards records to the global `log` facade.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::LogError;
use crate::record::LogRecord;
use crate::sync::lock_recover;

/// The external collaborator that renders and persists log records.
pub trait Sink: Send + Sync {
    /// Hand one record to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Emit`] if the sink rejects the record. The failure
    /// propagates to the logging call; nothing is retried.
    fn emit(&self, record: &LogRecord) -> Result<(), LogError>;

    /// Synchronously flush buffered output. May stall briefly on I/O.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Emit`] on an I/O failure.
    fn flush(&self) -> Result<(), LogError>;

    /// Resolve the on-disk path of a named file-backed target.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::TargetNotFound`] for an unknown name and
    /// [`LogError::TargetTypeMismatch`] for a target that is not file-backed.
    fn target_path(&self, name: &str) -> Result<PathBuf, LogError>;
}

// ============================================================================
// Targets
// ============================================================================

/// File-backed target. Lines are buffered in memory and written to the file
/// on `flush`, so the file may not exist on disk until the first flush
/// (mirrors an async-buffered backend target; the facade's flush-and-retry
/// path in `log_file_path` covers exactly this window).
pub struct FileTarget {
    path: PathBuf,
    pending: Mutex<Vec<String>>,
}

impl FileTarget {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn emit(&self, record: &LogRecord) -> Result<(), LogError> {
        lock_recover(&self.pending).push(record.render_line());
        Ok(())
    }

    fn flush(&self) -> Result<(), LogError> {
        let mut pending = lock_recover(&self.pending);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for line in pending.drain(..) {
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}

/// Console target: writes rendered lines immediately to a stream, stderr by
/// default.
pub struct ConsoleTarget {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleTarget {
    #[must_use]
    pub fn stderr() -> Self {
        Self::to_writer(Box::new(io::stderr()))
    }

    #[must_use]
    pub fn to_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn emit(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut out = lock_recover(&self.out);
        writeln!(out, "{}", record.render_line())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), LogError> {
        lock_recover(&self.out).flush()?;
        Ok(())
    }
}

/// Memory target: retains emitted records for inspection by tests and
/// tooling. Clones share the same backing store, so a handle kept by the
/// caller observes everything the sink receives.
#[derive(Clone, Default)]
pub struct MemoryTarget {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryTarget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in order.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        lock_recover(&self.records).clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock_recover(&self.records).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn emit(&self, record: &LogRecord) -> Result<(), LogError> {
        lock_recover(&self.records).push(record.clone());
        Ok(())
    }
}

enum Target {
    File(FileTarget),
    Console(ConsoleTarget),
    Memory(MemoryTarget),
}

impl Target {
    fn kind(&self) -> &'static str {
        match self {
            Target::File(_) => "file",
            Target::Console(_) => "console",
            Target::Memory(_) => "memory",
        }
    }

    fn emit(&self, record: &LogRecord) -> Result<(), LogError> {
        match self {
            Target::File(t) => t.emit(record),
            Target::Console(t) => t.emit(record),
            Target::Memory(t) => t.emit(record),
        }
    }

    fn flush(&self) -> Result<(), LogError> {
        match self {
            Target::File(t) => t.flush(),
            Target::Console(t) => t.flush(),
            Target::Memory(_) => Ok(()),
        }
    }
}

// ============================================================================
// TargetSink
// ============================================================================

/// Named-target sink: every record fans out to all registered targets.
///
/// ```rust
/// use caplog::sink::{MemoryTarget, TargetSink};
///
/// let memory = MemoryTarget::new();
/// let _sink = TargetSink::new()
///     .with_file("logfile", "/tmp/caplog-doc.log")
///     .with_memory("memory", memory.clone());
/// ```
#[derive(Default)]
pub struct TargetSink {
    targets: Vec<(String, Target)>,
}

impl TargetSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file-backed target.
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.targets
            .push((name.into(), Target::File(FileTarget::new(path))));
        self
    }

    /// Register a console target writing to stderr.
    #[must_use]
    pub fn with_console(mut self, name: impl Into<String>) -> Self {
        self.targets
            .push((name.into(), Target::Console(ConsoleTarget::stderr())));
        self
    }

    /// Register a console target with an explicit writer.
    #[must_use]
    pub fn with_console_writer(
        mut self,
        name: impl Into<String>,
        out: Box<dyn Write + Send>,
    ) -> Self {
        self.targets
            .push((name.into(), Target::Console(ConsoleTarget::to_writer(out))));
        self
    }

    /// Register a memory target. Keep a clone of `target` to inspect what the
    /// sink receives.
    #[must_use]
    pub fn with_memory(mut self, name: impl Into<String>, target: MemoryTarget) -> Self {
        self.targets.push((name.into(), Target::Memory(target)));
        self
    }
}

impl Sink for TargetSink {
    fn emit(&self, record: &LogRecord) -> Result<(), LogError> {
        for (_, target) in &self.targets {
            target.emit(record)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), LogError> {
        for (_, target) in &self.targets {
            target.flush()?;
        }
        Ok(())
    }

    fn target_path(&self, name: &str) -> Result<PathBuf, LogError> {
        let (_, target) = self
            .targets
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| LogError::TargetNotFound(name.to_string()))?;
        match target {
            Target::File(file) => Ok(file.path().to_path_buf()),
            other => Err(LogError::TargetTypeMismatch {
                target: name.to_string(),
                kind: other.kind(),
            }),
        }
    }
}

// ============================================================================
// LogBridge
// ============================================================================

/// Sink that forwards every record to the global `log` facade, with the
/// caller's file and line attached. Whatever logger the host application
/// installed does the rendering.
#[derive(Default)]
pub struct LogBridge;

impl LogBridge {
    /// Create the bridge, raising the `log` facade's max level so records are
    /// not filtered before the installed logger sees them.
    #[must_use]
    pub fn new() -> Self {
        log::set_max_level(log::LevelFilter::Trace);
        Self
    }
}

impl Sink for LogBridge {
    fn emit(&self, record: &LogRecord) -> Result<(), LogError> {
        let caller = record.caller();
        let level = record.level().to_log_level();
        match record.context_id() {
            Some(id) => log::logger().log(
                &log::Record::builder()
                    .args(format_args!("{} ctx={id}", record.message()))
                    .level(level)
                    .target("caplog")
                    .file(Some(caller.file()))
                    .line(Some(caller.line()))
                    .build(),
            ),
            None => log::logger().log(
                &log::Record::builder()
                    .args(format_args!("{}", record.message()))
                    .level(level)
                    .target("caplog")
                    .file(Some(caller.file()))
                    .line(Some(caller.line()))
                    .build(),
            ),
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), LogError> {
        log::logger().flush();
        Ok(())
    }

    fn target_path(&self, name: &str) -> Result<PathBuf, LogError> {
        // The bridge owns no named targets; file resolution is the business
        // of whatever backend the host installed.
        Err(LogError::TargetNotFound(name.to_string()))
    }
}
