//! Logging macros for ergonomic log message formatting.
//!
//! The `*f!` macros forward `format_args!` to the printf-style methods, so the
//! message is only formatted when the level is enabled. [`kv!`](crate::kv)
//! builds a loose key-value list for the `*w` methods.
//!
//! # Examples
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::{infof, kv};
//!
//! let logger = Logger::builder().appender(MemoryAppender::new()).build();
//!
//! // With format arguments
//! let port = 8080;
//! infof!(logger, "Server listening on port {}", port);
//!
//! // Loose key-value pairs
//! logger.infow("User logged in", &kv!["user_id", 42, "action", "login"]);
//! ```

/// Build a loose key-value list for the `*w` methods.
///
/// Every element is converted with `Arg::from`; the result is an array, so
/// pass it by reference.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// use rust_log_facade::kv;
/// let args = kv!["method", "GET", "status", 200, "cached", false];
/// assert_eq!(args.len(), 6);
/// ```
#[macro_export]
macro_rules! kv {
    () => {{
        let empty: [$crate::Arg; 0] = [];
        empty
    }};
    ($($arg:expr),+ $(,)?) => {
        [$($crate::Arg::from($arg)),+]
    };
}

/// Log a formatted message at the given level.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().build();
/// use rust_log_facade::logf;
/// logf!(logger, Level::Info, "Simple message");
/// logf!(logger, Level::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, format_args!($($arg)+))
    };
}

/// Log a formatted debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_facade::prelude::*;
/// # let logger = Logger::builder().min_level(Level::Debug).build();
/// use rust_log_facade::debugf;
/// debugf!(logger, "Entering function: calculate()");
/// debugf!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// Log a formatted panic-level message, then run the logger's terminator
#[macro_export]
macro_rules! panicf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panicf(format_args!($($arg)+))
    };
}

/// Log a formatted fatal-level message, flush, then run the logger's terminator
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}
