//! # caplog
//!
//! A rate-capped logging facade: five ordered severities, per-level console
//! echo above a configurable threshold, per-call-site capping of
//! Fatal-severity emissions, and caller-location tagging captured at compile
//! time via `#[track_caller]`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use caplog::prelude::*;
//!
//! let logger = caplog::initialize(Level::Warn)?;
//! logger.info("not echoed, still recorded")?;
//! logger.error_console("echoed no matter the threshold")?;
//! for _ in 0..100 {
//!     // First 3 emit Fatal, the rest downgrade to Error.
//!     logger.fatal_capped(3, "probe offline")?;
//! }
//! caplog::shutdown()?;
//! ```
//!
//! ## Core Concepts
//!
//! - **Logger**: the facade; resolves caller identity, applies the fatal cap,
//!   echoes, and forwards to a sink
//! - **Sink**: the external backend that renders/persists records
//! - **CallerKey**: stable (file, line) identity of a call site
//! - **Registry**: optional process-wide slot with an explicit
//!   initialize/shutdown lifecycle

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod caller;
pub mod echo;
pub mod error;
pub mod level;
pub mod logger;
pub mod record;
pub mod registry;
pub mod sink;

mod sync;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::caller::CallerKey;
    pub use crate::error::LogError;
    pub use crate::level::Level;
    pub use crate::logger::{Logger, LoggerBuilder};
    pub use crate::record::LogRecord;
    pub use crate::registry::{current, initialize, initialize_with, shutdown};
    pub use crate::sink::{LogBridge, MemoryTarget, Sink, TargetSink};
}

// Re-export key types at crate root
pub use caller::CallerKey;
pub use error::LogError;
pub use level::Level;
pub use logger::{Logger, LoggerBuilder};
pub use record::LogRecord;
pub use registry::{current, initialize, initialize_with, shutdown};
pub use sink::Sink;
