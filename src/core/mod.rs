//! Core logger types and traits

pub mod appender;
pub mod context;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod field;
pub mod info_logger;
pub mod level;
pub mod logger;
pub mod metrics;
pub mod options;
pub mod record;
pub mod sampling;
pub mod terminator;
pub mod timestamp;

pub use appender::Appender;
pub use context::{Context, KEY_REQUEST_ID, KEY_USERNAME};
pub use encoder::{Encoder, EncoderConfig, JsonEncoder, OutputFormat, TextEncoder};
pub use engine::Engine;
pub use error::{LoggerError, Result};
pub use field::{sweeten, Arg, Field, FieldValue, LooseFields, MALFORMED_KEY};
pub use info_logger::{InfoLogger, LeveledInfoLogger, NoopInfoLogger};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use options::Options;
pub use record::{Caller, Record};
pub use sampling::{LogSampler, SamplerMetrics, SamplingConfig};
pub use terminator::{ProcessTerminator, Terminator};
pub use timestamp::TimestampFormat;
