//! The facade core: severity dispatch, console echo, and fatal capping.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use crate::caller::CallerKey;
use crate::echo::ConsoleEcho;
use crate::error::LogError;
use crate::level::Level;
use crate::record::LogRecord;
use crate::sink::{LogBridge, Sink};
use crate::sync::{lock_recover, read_recover, write_recover};

/// Rate-capped logging facade.
///
/// Every call resolves the caller's source location (via `#[track_caller]`),
/// optionally echoes the message to the console, and forwards a [`LogRecord`]
/// to the sink. `fatal_capped` additionally limits how many Fatal-severity
/// emissions one call site may produce before further ones are downgraded to
/// Error, so a fatal inside a loop cannot flood downstream notification
/// channels.
///
/// A `Logger` is explicitly constructed (see [`Logger::builder`]) and is meant
/// to be owned by the application's composition root and shared by `Arc`. The
/// [`crate::registry`] module offers a process-wide slot for programs that
/// want a single ambient instance.
///
/// Messages are `impl Display`, so call sites pass either plain strings or
/// compiler-checked `format_args!` values:
///
/// ```rust
/// use caplog::{Level, Logger};
/// use caplog::sink::{MemoryTarget, TargetSink};
/// use std::sync::Arc;
///
/// let memory = MemoryTarget::new();
/// let logger = Logger::builder()
///     .sink(Arc::new(TargetSink::new().with_memory("memory", memory.clone())))
///     .echo_threshold(Level::Error)
///     .build();
///
/// let port = 8080;
/// logger.info(format_args!("listening on port {port}")).unwrap();
/// assert_eq!(memory.records()[0].message(), "listening on port 8080");
/// ```
pub struct Logger {
    sink: Arc<dyn Sink>,
    echo: ConsoleEcho,
    echo_threshold: RwLock<Level>,
    fatal_cap_default: Option<u64>,
    // Keyed by call site; bounded by the number of distinct fatal_capped
    // lines in the program, so never evicted.
    fatal_counts: Mutex<HashMap<CallerKey, u64>>,
}

impl Logger {
    /// Start building a logger. Defaults: [`LogBridge`] sink, `Error` echo
    /// threshold, echo to stdout.
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Change the console-echo threshold at runtime.
    pub fn set_echo_threshold(&self, level: Level) {
        *write_recover(&self.echo_threshold) = level;
    }

    /// The current console-echo threshold.
    #[must_use]
    pub fn echo_threshold(&self) -> Level {
        *read_recover(&self.echo_threshold)
    }

    /// Flush the sink. Synchronous; may stall briefly on I/O.
    ///
    /// # Errors
    ///
    /// Propagates the sink's flush failure.
    pub fn flush(&self) -> Result<(), LogError> {
        self.sink.flush()
    }

    /// Number of fatal-capped calls seen so far from `caller`.
    #[must_use]
    pub fn fatal_count(&self, caller: CallerKey) -> u64 {
        lock_recover(&self.fatal_counts)
            .get(&caller)
            .copied()
            .unwrap_or(0)
    }

    /// Resolve the on-disk path of a named file-backed target.
    ///
    /// If the file does not exist yet (buffered writes), the sink is flushed
    /// once and the check repeated.
    ///
    /// # Errors
    ///
    /// [`LogError::TargetNotFound`] or [`LogError::TargetTypeMismatch`] from
    /// the sink, or [`LogError::FileMissingAfterFlush`] if the file is still
    /// absent after the flush.
    pub fn log_file_path(&self, target: &str) -> Result<PathBuf, LogError> {
        let path = self.sink.target_path(target)?;
        if !path.exists() {
            self.sink.flush()?;
            if !path.exists() {
                return Err(LogError::FileMissingAfterFlush(path));
            }
        }
        Ok(path)
    }

    // ------------------------------------------------------------------
    // Fatal
    // ------------------------------------------------------------------

    /// Log at Fatal severity. No counter interaction.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Fatal, false, None, &message, CallerKey::caller())
    }

    /// Log at Fatal severity with a context id.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn fatal_ctx(&self, context_id: i64, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(
            Level::Fatal,
            false,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    /// Log at Fatal severity, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn fatal_console(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Fatal, true, None, &message, CallerKey::caller())
    }

    /// Log at Fatal severity with a context id, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn fatal_console_ctx(
        &self,
        context_id: i64,
        message: impl fmt::Display,
    ) -> Result<(), LogError> {
        self.dispatch(
            Level::Fatal,
            true,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    /// Log at Fatal severity while the caller's counter is below `cap`, at
    /// Error severity afterwards.
    ///
    /// The counter is keyed by the call site, incremented on every call,
    /// and never reset. Useful when a fatal can fire inside a loop and
    /// fatal records feed a notification channel.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn fatal_capped(&self, cap: u64, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch_capped(cap, None, &message, CallerKey::caller())
    }

    /// [`fatal_capped`](Self::fatal_capped) with a context id.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn fatal_capped_ctx(
        &self,
        cap: u64,
        context_id: i64,
        message: impl fmt::Display,
    ) -> Result<(), LogError> {
        self.dispatch_capped(cap, Some(context_id), &message, CallerKey::caller())
    }

    /// [`fatal_capped`](Self::fatal_capped) with the cap configured at build
    /// time. Behaves as plain [`fatal`](Self::fatal) when no default cap was
    /// configured.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn fatal_capped_default(&self, message: impl fmt::Display) -> Result<(), LogError> {
        let caller = CallerKey::caller();
        match self.fatal_cap_default {
            Some(cap) => self.dispatch_capped(cap, None, &message, caller),
            None => self.dispatch(Level::Fatal, false, None, &message, caller),
        }
    }

    /// [`fatal_capped_default`](Self::fatal_capped_default) with a context id.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn fatal_capped_default_ctx(
        &self,
        context_id: i64,
        message: impl fmt::Display,
    ) -> Result<(), LogError> {
        let caller = CallerKey::caller();
        match self.fatal_cap_default {
            Some(cap) => self.dispatch_capped(cap, Some(context_id), &message, caller),
            None => self.dispatch(Level::Fatal, false, Some(context_id), &message, caller),
        }
    }

    // ------------------------------------------------------------------
    // Error
    // ------------------------------------------------------------------

    /// Log at Error severity.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Error, false, None, &message, CallerKey::caller())
    }

    /// Log at Error severity with a context id.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn error_ctx(&self, context_id: i64, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(
            Level::Error,
            false,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    /// Log at Error severity, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn error_console(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Error, true, None, &message, CallerKey::caller())
    }

    /// Log at Error severity with a context id, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn error_console_ctx(
        &self,
        context_id: i64,
        message: impl fmt::Display,
    ) -> Result<(), LogError> {
        self.dispatch(
            Level::Error,
            true,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    // ------------------------------------------------------------------
    // Warn
    // ------------------------------------------------------------------

    /// Log at Warn severity.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Warn, false, None, &message, CallerKey::caller())
    }

    /// Log at Warn severity with a context id.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn warn_ctx(&self, context_id: i64, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(
            Level::Warn,
            false,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    /// Log at Warn severity, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn warn_console(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Warn, true, None, &message, CallerKey::caller())
    }

    /// Log at Warn severity with a context id, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn warn_console_ctx(
        &self,
        context_id: i64,
        message: impl fmt::Display,
    ) -> Result<(), LogError> {
        self.dispatch(
            Level::Warn,
            true,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    // ------------------------------------------------------------------
    // Info
    // ------------------------------------------------------------------

    /// Log at Info severity.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Info, false, None, &message, CallerKey::caller())
    }

    /// Log at Info severity with a context id.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn info_ctx(&self, context_id: i64, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(
            Level::Info,
            false,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    /// Log at Info severity, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn info_console(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Info, true, None, &message, CallerKey::caller())
    }

    /// Log at Info severity with a context id, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn info_console_ctx(
        &self,
        context_id: i64,
        message: impl fmt::Display,
    ) -> Result<(), LogError> {
        self.dispatch(
            Level::Info,
            true,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    // ------------------------------------------------------------------
    // Trace
    // ------------------------------------------------------------------

    /// Log at Trace severity.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn trace(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Trace, false, None, &message, CallerKey::caller())
    }

    /// Log at Trace severity with a context id.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn trace_ctx(&self, context_id: i64, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(
            Level::Trace,
            false,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    /// Log at Trace severity, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn trace_console(&self, message: impl fmt::Display) -> Result<(), LogError> {
        self.dispatch(Level::Trace, true, None, &message, CallerKey::caller())
    }

    /// Log at Trace severity with a context id, forcing console echo.
    ///
    /// # Errors
    ///
    /// Propagates the sink's emission failure.
    #[track_caller]
    pub fn trace_console_ctx(
        &self,
        context_id: i64,
        message: impl fmt::Display,
    ) -> Result<(), LogError> {
        self.dispatch(
            Level::Trace,
            true,
            Some(context_id),
            &message,
            CallerKey::caller(),
        )
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// The one parameterized path every entry point funnels into.
    fn dispatch(
        &self,
        level: Level,
        force_echo: bool,
        context_id: Option<i64>,
        message: &dyn fmt::Display,
        caller: CallerKey,
    ) -> Result<(), LogError> {
        let message = message.to_string();
        if force_echo || level <= self.echo_threshold() {
            self.echo.write_line(level, &message, context_id);
        }
        let record = LogRecord::new(level, message, caller, context_id);
        self.sink.emit(&record)
    }

    fn dispatch_capped(
        &self,
        cap: u64,
        context_id: Option<i64>,
        message: &dyn fmt::Display,
        caller: CallerKey,
    ) -> Result<(), LogError> {
        // Check and increment under one lock so two racing calls cannot both
        // pass the cap on a stale count. The increment is unconditional.
        let level = {
            let mut counts = lock_recover(&self.fatal_counts);
            let count = counts.entry(caller).or_insert(0);
            let level = if *count < cap {
                Level::Fatal
            } else {
                Level::Error
            };
            *count += 1;
            level
        };
        self.dispatch(level, false, context_id, message, caller)
    }
}

/// Builder for [`Logger`].
#[derive(Default)]
pub struct LoggerBuilder {
    sink: Option<Arc<dyn Sink>>,
    echo_threshold: Option<Level>,
    echo_writer: Option<Box<dyn Write + Send>>,
    fatal_cap_default: Option<u64>,
}

impl LoggerBuilder {
    /// Use the given sink instead of the default [`LogBridge`].
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Initial console-echo threshold. Defaults to `Error`.
    #[must_use]
    pub fn echo_threshold(mut self, level: Level) -> Self {
        self.echo_threshold = Some(level);
        self
    }

    /// Echo to the given writer instead of stdout.
    #[must_use]
    pub fn echo_writer(mut self, out: Box<dyn Write + Send>) -> Self {
        self.echo_writer = Some(out);
        self
    }

    /// Cap used by [`Logger::fatal_capped_default`]. Fixed once built.
    #[must_use]
    pub fn fatal_cap_default(mut self, cap: u64) -> Self {
        self.fatal_cap_default = Some(cap);
        self
    }

    #[must_use]
    pub fn build(self) -> Logger {
        Logger {
            sink: self.sink.unwrap_or_else(|| Arc::new(LogBridge::new())),
            echo: self
                .echo_writer
                .map_or_else(ConsoleEcho::stdout, ConsoleEcho::to_writer),
            echo_threshold: RwLock::new(self.echo_threshold.unwrap_or(Level::Error)),
            fatal_cap_default: self.fatal_cap_default,
            fatal_counts: Mutex::new(HashMap::new()),
        }
    }
}
