//! Process-wide default logger
//!
//! Every free function here delegates to the current default logger. The
//! handle is read without locking; [`init`] and [`replace`] swap it under a
//! mutex that only serializes writers. Loggers derived before a swap keep the
//! engine they were derived from.
//!
//! # Example
//!
//! ```
//! use rust_log_facade::{global, kv, Field};
//!
//! global::infow("service starting", &kv!["version", "1.4.2"]);
//! let db = global::with_name("db");
//! db.debug("pool created", &[Field::int32("size", 8)]);
//! ```

use crate::core::{
    Arg, Context, Field, InfoLogger, Level, Logger, LoggerError, Options, Result,
};
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

static DEFAULT: Lazy<ArcSwap<Logger>> = Lazy::new(|| ArcSwap::from_pointee(initial_logger()));

static REPLACE_LOCK: Mutex<()> = parking_lot::const_mutex(());

fn initial_logger() -> Logger {
    Options::default().build().unwrap_or_else(|e| {
        eprintln!("[LOGGER ERROR] Failed to build default logger: {}", e);
        Logger::new()
    })
}

/// Validate `options`, build a logger from them and make it the default.
///
/// On invalid options every violation is returned in
/// [`LoggerError::InvalidOptions`] and the current default stays in place.
pub fn init(options: &Options) -> Result<()> {
    let errors = options.validate();
    if !errors.is_empty() {
        return Err(LoggerError::InvalidOptions(errors));
    }
    replace(options.build()?);
    Ok(())
}

/// Install `logger` as the default, returning the one it replaces
pub fn replace(logger: Logger) -> Logger {
    let _guard = REPLACE_LOCK.lock();
    let previous = DEFAULT.swap(Arc::new(logger));
    Arc::try_unwrap(previous).unwrap_or_else(|shared| (*shared).clone())
}

/// Handle to the current default logger
pub fn default_logger() -> Logger {
    Logger::clone(&DEFAULT.load())
}

/// Logger attached to `ctx`, or the default logger
pub fn from_context(ctx: &Context) -> Logger {
    ctx.logger().cloned().unwrap_or_else(default_logger)
}

macro_rules! global_level_functions {
    ($($level:ident => $plain:ident, $fmt:ident, $loose:ident;)*) => {
        $(
            #[doc = concat!("Log at `", stringify!($level), "` through the default logger")]
            #[track_caller]
            pub fn $plain(message: &str, fields: &[Field]) {
                DEFAULT.load().log(Level::$level, message, fields);
            }

            #[track_caller]
            pub fn $fmt(args: fmt::Arguments<'_>) {
                DEFAULT.load().logf(Level::$level, args);
            }

            #[track_caller]
            pub fn $loose(message: &str, keys_and_values: &[Arg]) {
                DEFAULT.load().logw(Level::$level, message, keys_and_values);
            }
        )*
    };
}

global_level_functions! {
    Debug => debug, debugf, debugw;
    Info => info, infof, infow;
    Warn => warn, warnf, warnw;
    Error => error, errorf, errorw;
    Panic => panic, panicf, panicw;
    Fatal => fatal, fatalf, fatalw;
}

pub fn v(verbosity: i32) -> Box<dyn InfoLogger> {
    DEFAULT.load().v(verbosity)
}

#[track_caller]
pub fn with_values(keys_and_values: &[Arg]) -> Logger {
    DEFAULT.load().with_values(keys_and_values)
}

pub fn with_fields(fields: &[Field]) -> Logger {
    DEFAULT.load().with_fields(fields)
}

pub fn with_name(name: &str) -> Logger {
    DEFAULT.load().with_name(name)
}

/// New context carrying the default logger
pub fn with_context(ctx: &Context) -> Context {
    DEFAULT.load().with_context(ctx)
}

/// Logger from `ctx` (or the default) carrying the request id and user name
pub fn with_request_fields(ctx: &Context) -> Logger {
    from_context(ctx).with_request_fields(ctx)
}

pub fn enabled(level: Level) -> bool {
    DEFAULT.load().enabled(level)
}

pub fn level() -> Level {
    DEFAULT.load().level()
}

pub fn set_level(level: Level) {
    DEFAULT.load().set_level(level);
}

pub fn flush() -> Result<()> {
    DEFAULT.load().flush()
}
