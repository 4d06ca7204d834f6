//! Bridge from the `log` crate
//!
//! After [`init_log_bridge`], records emitted through `log::info!` and friends
//! (by this program or its dependencies) are written by the current default
//! logger. The `log` target travels as a `target` field and the `log` call
//! site becomes the record's caller.

use crate::core::{Caller, Field, Level, LoggerError, Result};
use crate::global;

struct LogBridge;

static BRIDGE: LogBridge = LogBridge;

/// `log` levels onto facade levels; `Trace` folds into `Debug`
pub fn level_from_log(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        global::enabled(level_from_log(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = level_from_log(record.level());
        let logger = global::default_logger();
        if !logger.enabled(level) {
            return;
        }

        let caller = match (record.file(), record.line()) {
            (Some(file), Some(line)) if logger.engine().adds_caller() => Some(Caller::new(file, line)),
            _ => None,
        };
        let fields = [Field::string("target", record.target())];
        logger.emit(level, record.args().to_string(), &fields, caller);
    }

    fn flush(&self) {
        let _ = global::flush();
    }
}

/// Route the `log` facade to the default logger.
///
/// Fails if another `log` implementation is already installed.
pub fn init_log_bridge(max_level: log::LevelFilter) -> Result<()> {
    log::set_logger(&BRIDGE).map_err(|e| LoggerError::config("log bridge", e.to_string()))?;
    log::set_max_level(max_level);
    Ok(())
}
