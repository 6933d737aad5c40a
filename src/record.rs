//! The unit handed to sinks: one fully-formed log record.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use time::OffsetDateTime;
use time::format_description::OwnedFormatItem;

use crate::caller::CallerKey;
use crate::level::Level;

static LINE_TIME_FORMAT: Lazy<Option<OwnedFormatItem>> = Lazy::new(|| {
    time::format_description::parse_owned::<2>(
        "[year]-[month]-[day] [hour]:[minute]:[second]",
    )
    .ok()
});

/// An immutable record: severity, rendered message, caller identity, optional
/// context id, and capture timestamp.
///
/// The message is rendered before the record is built, so sinks never see
/// format templates or argument lists.
#[derive(Debug, Clone)]
pub struct LogRecord {
    level: Level,
    message: String,
    caller: CallerKey,
    context_id: Option<i64>,
    timestamp: OffsetDateTime,
}

impl LogRecord {
    /// Build a record, stamping it with the current time.
    ///
    /// Local time is used when the local offset is available, UTC otherwise.
    #[must_use]
    pub fn new(
        level: Level,
        message: String,
        caller: CallerKey,
        context_id: Option<i64>,
    ) -> Self {
        let timestamp =
            OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self {
            level,
            message,
            caller,
            context_id,
            timestamp,
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn caller(&self) -> CallerKey {
        self.caller
    }

    /// Numeric identifier correlating this record to a business entity.
    #[must_use]
    pub fn context_id(&self) -> Option<i64> {
        self.context_id
    }

    #[must_use]
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// Render the record as a single log line, the form used by the
    /// line-oriented targets:
    ///
    /// ```text
    /// 2026-08-30 12:00:00 ERROR src/main.rs(42) something broke ctx=7
    /// ```
    #[must_use]
    pub fn render_line(&self) -> String {
        let ts = LINE_TIME_FORMAT
            .as_ref()
            .and_then(|fmt| self.timestamp.format(fmt).ok())
            .unwrap_or_else(|| self.timestamp.to_string());

        let mut line = format!(
            "{ts} {level:<5} {caller} {message}",
            level = self.level.upper_name(),
            caller = self.caller,
            message = self.message,
        );
        if let Some(id) = self.context_id {
            let _ = write!(line, " ctx={id}");
        }
        line
    }
}
