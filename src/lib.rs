//! # Rust Log Facade
//!
//! A structured, leveled logging facade with a process-wide default logger.
//!
//! ## Features
//!
//! - **Typed and loose fields**: `Field` constructors, or alternating keys and
//!   values built with [`kv!`] that are validated without ever failing a call
//! - **Cheap derivation**: `with_fields`, `with_values` and `with_name` return
//!   new loggers sharing one engine; the parent is never modified
//! - **Numeric verbosity**: `v(n)` hands out an Info-only logger, or a no-op
//!   one when the level filters it out
//! - **Process-wide default**: free functions in [`global`] delegate to a
//!   default logger that `init` or `replace` swaps atomically
//! - **Context carrier**: attach a logger or request values to a [`Context`]
//!
//! ## Example
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::kv;
//!
//! let memory = MemoryAppender::new();
//! let logger = Logger::builder()
//!     .appender(memory.clone())
//!     .build()
//!     .with_name("api");
//!
//! let request = logger.with_values(&kv!["request_id", "r-42"]);
//! request.info("handled", &[Field::int32("status", 200)]);
//!
//! let record = &memory.records()[0];
//! assert_eq!(record.logger_name.as_deref(), Some("api"));
//! assert_eq!(record.fields.len(), 2);
//! ```

pub mod appenders;
pub mod bridge;
pub mod core;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, ConsoleStream, FileAppender, MemoryAppender};
    pub use crate::core::{
        Appender, Arg, Context, Encoder, EncoderConfig, Field, FieldValue, InfoLogger, Level,
        LogSampler, Logger, LoggerBuilder, LoggerError, LoggerMetrics, Options, OutputFormat,
        Record, Result, SamplerMetrics, SamplingConfig, Terminator, TimestampFormat,
    };
}

pub use appenders::{ConsoleAppender, ConsoleStream, FileAppender, MemoryAppender};
pub use crate::core::{
    sweeten, Appender, Arg, Caller, Context, Encoder, EncoderConfig, Field, FieldValue,
    InfoLogger, JsonEncoder, Level, LeveledInfoLogger, LogSampler, Logger, LoggerBuilder,
    LoggerError, LoggerMetrics, LooseFields, NoopInfoLogger, Options, OutputFormat,
    ProcessTerminator, Record, Result, SamplerMetrics, SamplingConfig, Terminator, TextEncoder,
    TimestampFormat, KEY_REQUEST_ID, KEY_USERNAME, MALFORMED_KEY,
};
pub use global::{default_logger, from_context, init, replace};
