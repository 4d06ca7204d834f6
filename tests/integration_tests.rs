//! Integration tests for the logging facade
//!
//! These tests verify:
//! - Level gating across every level pair
//! - Typed and loose fields, including malformed loose input
//! - Derivation isolation and naming
//! - Verbosity loggers
//! - Panic/Fatal effects through an injected terminator
//! - File output and log injection prevention
//! - Sink failure accounting and error output
//! - Context carrier lookups

use parking_lot::Mutex;
use rust_log_facade::prelude::*;
use rust_log_facade::{kv, Caller, MALFORMED_KEY, KEY_REQUEST_ID, KEY_USERNAME};
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingTerminator {
    calls: Mutex<Vec<(Level, String)>>,
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, level: Level, message: &str) {
        self.calls.lock().push((level, message.to_string()));
    }
}

/// Appender that rejects every record
struct FailingAppender;

impl Appender for FailingAppender {
    fn append(&mut self, _record: &Record) -> Result<()> {
        Err(LoggerError::writer("disk full"))
    }

    fn flush(&mut self) -> Result<()> {
        Err(LoggerError::writer("disk full"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct PanickingAppender;

impl Appender for PanickingAppender {
    fn append(&mut self, _record: &Record) -> Result<()> {
        panic!("appender bug");
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// Error output that keeps what it receives
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn memory_logger(level: Level) -> (Logger, MemoryAppender) {
    let memory = MemoryAppender::new();
    let logger = Logger::builder()
        .min_level(level)
        .appender(memory.clone())
        .build();
    (logger, memory)
}

fn field_keys(record: &Record) -> Vec<&str> {
    record.fields.iter().map(|f| f.key.as_str()).collect()
}

#[test]
fn test_level_gating_for_every_pair() {
    // Panic and Fatal have terminal effects and are covered separately.
    let emitting = [Level::Debug, Level::Info, Level::Warn, Level::Error];
    for threshold in Level::ALL {
        let (logger, memory) = memory_logger(threshold);
        for level in emitting {
            logger.log(level, level.as_str(), &[]);
        }
        let expected: Vec<String> = emitting
            .iter()
            .filter(|level| **level >= threshold)
            .map(|level| level.as_str().to_string())
            .collect();
        assert_eq!(memory.messages(), expected, "threshold {}", threshold);
    }
}

#[test]
fn test_loose_odd_count() {
    let (logger, memory) = memory_logger(Level::Info);
    logger.infow("m", &kv!["k1", 1, "k2"]);

    let records = memory.records();
    let emitted = records.last().unwrap();
    assert_eq!(emitted.message, "m");
    assert_eq!(field_keys(emitted), ["k1", MALFORMED_KEY]);
    assert!(emitted.field("k2").is_none());
}

#[test]
fn test_loose_non_string_key() {
    let (logger, memory) = memory_logger(Level::Info);
    logger.warnw("m", &kv![42, "v"]);

    let records = memory.records();
    assert_eq!(records.len(), 2);
    let diagnostic = &records[0];
    assert_eq!(diagnostic.level, Level::Error);
    assert!(diagnostic.message.contains("non-string key"));

    let emitted = &records[1];
    assert_eq!(emitted.level, Level::Warn);
    assert_eq!(field_keys(emitted), [MALFORMED_KEY]);
}

#[test]
fn test_loose_disabled_level_skips_validation() {
    let (logger, memory) = memory_logger(Level::Error);
    logger.infow("m", &kv!["dangling"]);
    assert!(memory.is_empty());
    assert_eq!(logger.metrics().malformed_calls(), 0);
}

#[test]
fn test_with_values_chain() {
    let (logger, memory) = memory_logger(Level::Info);
    let first = logger.with_values(&kv!["a", 1]);
    let second = first.with_values(&kv!["b", 2]);

    assert_eq!(
        second.fields(),
        [Field::new("a", 1), Field::new("b", 2)]
    );
    assert_eq!(first.fields(), [Field::new("a", 1)]);
    assert!(logger.fields().is_empty());

    second.info("done", &[Field::bool("ok", true)]);
    assert_eq!(field_keys(&memory.records()[0]), ["a", "b", "ok"]);
}

#[test]
fn test_with_name_chain() {
    let (logger, memory) = memory_logger(Level::Info);
    let x = logger.with_name("x");
    let xy = x.with_name("y");

    assert_eq!(xy.name(), Some("x.y"));
    assert_eq!(x.name(), Some("x"));
    assert!(logger.name().is_none());

    xy.info("named", &[]);
    assert_eq!(memory.records()[0].logger_name.as_deref(), Some("x.y"));
}

#[test]
fn test_disabled_verbosity() {
    let (logger, memory) = memory_logger(Level::Info);
    let v2 = logger.v(2);
    assert!(!v2.enabled());
    v2.info("hidden", &[]);
    v2.infof(format_args!("hidden {}", 1));
    v2.infow("hidden", &kv!["a", 1]);
    assert!(memory.is_empty());
}

#[test]
fn test_enabled_verbosity_levels() {
    let (logger, memory) = memory_logger(Level::Debug);
    logger.v(0).info("v0", &[]);
    logger.v(1).info("v1", &[]);
    assert!(!logger.v(2).enabled());

    let levels: Vec<Level> = memory.records().iter().map(|r| r.level).collect();
    assert_eq!(levels, [Level::Info, Level::Debug]);
}

#[test]
fn test_panic_and_fatal_use_terminator() {
    let memory = MemoryAppender::new();
    let terminator = Arc::new(RecordingTerminator::default());
    let logger = Logger::builder()
        .appender(memory.clone())
        .terminator(terminator.clone())
        .build();

    logger.panicw("bad state", &kv!["id", 7]);
    logger.fatal("cannot continue", &[]);

    assert_eq!(memory.messages(), ["bad state", "cannot continue"]);
    assert_eq!(
        *terminator.calls.lock(),
        vec![
            (Level::Panic, "bad state".to_string()),
            (Level::Fatal, "cannot continue".to_string()),
        ]
    );
    assert_eq!(memory.flush_count(), 1);
}

#[test]
fn test_default_terminator_unwinds_on_panic() {
    let (logger, memory) = memory_logger(Level::Info);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        logger.panic("unrecoverable", &[])
    }));
    assert!(result.is_err());
    assert_eq!(memory.messages(), ["unrecoverable"]);
}

#[test]
fn test_file_output_text() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let logger = Logger::builder()
        .appender(FileAppender::new(&log_file).expect("Failed to create appender"))
        .build()
        .with_name("api");

    logger.info("request served", &[Field::int32("status", 200), Field::string("path", "/a b")]);
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let columns: Vec<&str> = content.trim_end().split('\t').collect();
    assert_eq!(columns[1].trim(), "INFO");
    assert_eq!(columns[2], "api");
    assert!(columns[3].starts_with("integration_tests.rs:"));
    assert_eq!(columns[4], "request served");
    assert_eq!(columns[5], "status=200 path=\"/a b\"");
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection_test.log");

    let logger = Logger::builder()
        .appender(FileAppender::new(&log_file).expect("Failed to create appender"))
        .build();

    let malicious_message = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    logger.info(malicious_message, &[]);
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("\\n"));
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");

    let named_file = temp_dir.path().join("injection_name_test.log");
    let named = Logger::builder()
        .appender(FileAppender::new(&named_file).expect("Failed to create appender"))
        .build()
        .with_name("svc\nFAKE\tERROR\tforged");
    named.info("real", &[]);
    named.flush().expect("Failed to flush");

    let content = fs::read_to_string(&named_file).expect("Failed to read log file");
    assert!(content.contains("svc\\nFAKE"));
    assert_eq!(content.lines().count(), 1, "Logger name must not start a new line");
}

#[test]
fn test_file_output_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.json");

    let encoder = OutputFormat::Json.encoder(EncoderConfig::new());
    let logger = Logger::builder()
        .appender(FileAppender::with_encoder(&log_file, encoder).expect("Failed to create appender"))
        .add_caller(false)
        .build();

    logger
        .with_fields(&[Field::string("service", "billing")])
        .errorw("charge failed", &kv!["amount", 12.5, "retry", false]);
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let line: serde_json::Value = serde_json::from_str(content.trim()).expect("valid JSON");
    assert_eq!(line["level"], "ERROR");
    assert_eq!(line["message"], "charge failed");
    assert_eq!(line["service"], "billing");
    assert_eq!(line["amount"], 12.5);
    assert_eq!(line["retry"], false);
    assert!(line.get("caller").is_none());
}

#[test]
fn test_sink_failure_is_counted_and_reported() {
    let memory = MemoryAppender::new();
    let errors = SharedBuffer::default();
    let logger = Logger::builder()
        .appender(FailingAppender)
        .appender(memory.clone())
        .error_output(errors.clone())
        .build();

    logger.info("still delivered", &[]);

    assert_eq!(memory.messages(), ["still delivered"]);
    assert_eq!(logger.metrics().dropped_count(), 1);
    assert_eq!(logger.metrics().total_logged(), 0);
    assert!(errors.contents().contains("appender 'failing' failed"));

    assert!(logger.flush().is_err());
    assert!(errors.contents().contains("flush failed"));
}

#[test]
fn test_appender_panic_is_isolated() {
    let memory = MemoryAppender::new();
    let errors = SharedBuffer::default();
    let logger = Logger::builder()
        .appender(PanickingAppender)
        .appender(memory.clone())
        .error_output(errors.clone())
        .build();

    logger.warn("first", &[]);
    logger.warn("second", &[]);

    assert_eq!(memory.messages(), ["first", "second"]);
    assert_eq!(logger.metrics().dropped_count(), 2);
    assert!(errors.contents().contains("panicked: appender bug"));
}

#[test]
fn test_sampling_drops_repeats() {
    let memory = MemoryAppender::new();
    let logger = Logger::builder()
        .appender(memory.clone())
        .sampling(SamplingConfig {
            initial: 2,
            thereafter: 3,
            tick_ms: 3_600_000,
        })
        .build();

    for _ in 0..8 {
        logger.info("hot path", &[]);
    }
    logger.info("other message", &[]);

    // 1, 2, then 5 and 8
    assert_eq!(memory.len(), 5);
    let metrics = logger.sampler_metrics().unwrap();
    assert_eq!(metrics.dropped_count(), 4);
}

#[test]
fn test_caller_reports_this_file() {
    let (logger, memory) = memory_logger(Level::Info);
    let line = line!() + 1;
    logger.errorf(format_args!("at {}", "call site"));

    let caller = memory.records()[0].caller.clone().unwrap();
    assert_eq!(caller, Caller::new("tests/integration_tests.rs", line));
}

#[test]
fn test_context_request_fields() {
    let (logger, memory) = memory_logger(Level::Info);
    let ctx = Context::background()
        .with_value(KEY_REQUEST_ID, "req-1".to_string())
        .with_value(KEY_USERNAME, "alice".to_string());
    let ctx = logger.with_name("http").with_context(&ctx);

    let request_logger = ctx.logger().unwrap().with_request_fields(&ctx);
    request_logger.info("handled", &[]);

    let record = &memory.records()[0];
    assert_eq!(record.logger_name.as_deref(), Some("http"));
    assert_eq!(
        record.fields,
        [Field::string(KEY_REQUEST_ID, "req-1"), Field::string(KEY_USERNAME, "alice")]
    );
}

#[test]
fn test_request_fields_default_to_empty() {
    let (logger, _memory) = memory_logger(Level::Info);
    let derived = logger.with_request_fields(&Context::background());
    assert_eq!(
        derived.fields(),
        [Field::string(KEY_REQUEST_ID, ""), Field::string(KEY_USERNAME, "")]
    );
}

#[test]
fn test_io_write_adapter() {
    let (mut logger, memory) = memory_logger(Level::Info);
    logger.write_all(b"third-party output\n").unwrap();
    logger.flush().unwrap();
    assert_eq!(memory.messages(), ["third-party output"]);
    assert_eq!(memory.flush_count(), 1);
}
