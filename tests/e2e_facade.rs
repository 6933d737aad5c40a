//! End-to-end tests for the logging facade.
//!
//! These drive the public API the way an application would: an explicitly
//! constructed `Logger` with a capture writer for the console echo and a
//! memory target for the sink, asserting on both streams.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use caplog::prelude::*;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn harness(threshold: Level) -> (Logger, MemoryTarget, Capture) {
    let memory = MemoryTarget::new();
    let echo = Capture::default();
    let logger = Logger::builder()
        .sink(Arc::new(
            TargetSink::new().with_memory("memory", memory.clone()),
        ))
        .echo_threshold(threshold)
        .echo_writer(Box::new(echo.clone()))
        .build();
    (logger, memory, echo)
}

#[track_caller]
fn capped(logger: &Logger, cap: u64, message: &str) -> CallerKey {
    let key = CallerKey::caller();
    logger.fatal_capped(cap, message).unwrap();
    key
}

#[test]
fn e2e_threshold_warn_scenario() {
    let (logger, memory, echo) = harness(Level::Warn);

    // info below the Warn threshold: recorded, not echoed.
    logger.info("x").unwrap();
    assert_eq!(echo.contents(), "");
    {
        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level(), Level::Info);
        assert_eq!(records[0].message(), "x");
    }

    // error_console: echoed regardless, recorded at Error.
    logger.error_console("y").unwrap();
    assert_eq!(echo.lines(), ["Error :y"]);
    assert_eq!(memory.records()[1].level(), Level::Error);

    // fatal_capped(2) three times from one site: Fatal, Fatal, Error.
    for _ in 0..3 {
        capped(&logger, 2, "z");
    }
    let levels: Vec<Level> = memory.records()[2..]
        .iter()
        .map(LogRecord::level)
        .collect();
    assert_eq!(levels, [Level::Fatal, Level::Fatal, Level::Error]);

    // All three "z" emissions are at or above Warn, so all echoed.
    assert_eq!(
        echo.lines(),
        ["Error :y", "Fatal :z", "Fatal :z", "Error :z"]
    );
}

#[test]
fn e2e_capped_counter_reaches_total_calls() {
    let (logger, memory, _echo) = harness(Level::Error);

    let cap: u64 = 4;
    let extra: u64 = 3;
    let mut key = None;
    for _ in 0..(cap + extra) {
        key = Some(capped(&logger, cap, "repeated failure"));
    }

    let records = memory.records();
    let fatal = records.iter().filter(|r| r.level() == Level::Fatal).count();
    let error = records.iter().filter(|r| r.level() == Level::Error).count();
    assert_eq!(fatal as u64, cap);
    assert_eq!(error as u64, extra);
    assert_eq!(logger.fatal_count(key.unwrap()), cap + extra);
}

#[test]
fn e2e_two_sites_do_not_interfere() {
    let (logger, _memory, _echo) = harness(Level::Error);

    let noisy = {
        let mut key = None;
        for _ in 0..10 {
            key = Some(capped(&logger, 2, "noisy site"));
        }
        key.unwrap()
    };

    // A fresh site still gets its full fatal budget.
    let quiet = capped(&logger, 2, "quiet site");
    assert_eq!(logger.fatal_count(noisy), 10);
    assert_eq!(logger.fatal_count(quiet), 1);
}

#[test]
fn e2e_caller_tags_point_into_this_file() {
    let (logger, memory, _echo) = harness(Level::Error);
    logger.warn("where am I").unwrap();

    let caller = memory.records()[0].caller();
    assert!(
        caller.file().ends_with("e2e_facade.rs"),
        "unexpected caller file: {}",
        caller.file()
    );
    assert!(caller.to_string().contains("e2e_facade.rs("));
}

#[test]
fn e2e_log_file_path_query() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("active.log");
    let logger = Logger::builder()
        .sink(Arc::new(
            TargetSink::new()
                .with_file("logfile", &path)
                .with_console_writer("console", Box::new(Capture::default())),
        ))
        .echo_writer(Box::new(Capture::default()))
        .build();

    logger.error_ctx(7, "persisted").unwrap();

    // Unknown and non-file targets fail with distinct conditions.
    assert!(matches!(
        logger.log_file_path("nope"),
        Err(LogError::TargetNotFound(_))
    ));
    assert!(matches!(
        logger.log_file_path("console"),
        Err(LogError::TargetTypeMismatch { .. })
    ));

    // The file target resolves after the query's own flush.
    let resolved = logger.log_file_path("logfile").unwrap();
    let contents = std::fs::read_to_string(resolved).unwrap();
    assert!(contents.contains("ERROR"));
    assert!(contents.contains("persisted"));
    assert!(contents.contains("ctx=7"));
}

#[test]
fn e2e_shared_logger_across_threads() {
    use std::thread;

    let (logger, memory, _echo) = harness(Level::Fatal);
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0i64..8)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..50 {
                    logger
                        .info_ctx(worker, format_args!("iteration {i}"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(memory.len(), 400);
}
