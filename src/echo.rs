//! Console echo: mirroring records to an interactive stream, independent of
//! the sink.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::level::Level;
use crate::sync::lock_recover;

/// Writes `"<Level> :<message>"` lines to a console stream.
///
/// The facade decides *whether* to echo (threshold check or forced); this type
/// only formats and writes. Echo is best-effort: a failed write to the
/// console never fails the logging call, the record still reaches the sink.
///
/// The writer defaults to stdout and can be swapped for a capture buffer in
/// tests via [`ConsoleEcho::to_writer`].
pub struct ConsoleEcho {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEcho {
    /// Echo to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::to_writer(Box::new(io::stdout()))
    }

    /// Echo to an arbitrary writer.
    #[must_use]
    pub fn to_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Write one echo line. A context id is appended as a `:<id>` suffix.
    pub(crate) fn write_line(&self, level: Level, message: &str, context_id: Option<i64>) {
        let mut out = lock_recover(&self.out);
        let result = match context_id {
            Some(id) => writeln!(out, "{level} :{message}:{id}"),
            None => writeln!(out, "{level} :{message}"),
        };
        let _ = result.and_then(|()| out.flush());
    }
}

impl Default for ConsoleEcho {
    fn default() -> Self {
        Self::stdout()
    }
}
