//! Logger configuration
//!
//! [`Options`] is the serializable description of a logger: level, format,
//! destinations and the optional behaviors. Keys use kebab-case, so the same
//! struct loads from TOML and prints as JSON.
//!
//! # Example
//!
//! ```
//! use rust_log_facade::{Level, Options};
//!
//! let options = Options::from_toml_str(r#"
//!     level = "debug"
//!     format = "json"
//!     output-paths = ["stderr"]
//!     name = "worker"
//! "#).unwrap();
//!
//! assert!(options.validate().is_empty());
//! let logger = options.build().unwrap();
//! assert_eq!(logger.level(), Level::Debug);
//! assert_eq!(logger.name(), Some("worker"));
//! ```

use super::{
    encoder::{EncoderConfig, OutputFormat},
    error::{LoggerError, Result},
    level::Level,
    logger::Logger,
    sampling::SamplingConfig,
    timestamp::TimestampFormat,
};
use crate::appenders;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Options {
    /// Minimum level; parsed case-insensitively
    pub level: String,

    /// `console` or `json`
    pub format: String,

    /// Color level names on console outputs
    pub enable_color: bool,

    pub disable_caller: bool,

    pub disable_stacktrace: bool,

    /// `stdout`, `stderr`, or file paths
    pub output_paths: Vec<String>,

    /// Where the logger reports its own failures
    pub error_output_paths: Vec<String>,

    /// Development mode captures stacktraces from Warn upwards
    pub development: bool,

    /// Name of the root logger; empty for none
    pub name: String,

    /// Per-message sampling; `None` keeps every record
    pub sampling: Option<SamplingConfig>,

    pub timestamp_format: TimestampFormat,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: Level::Info.as_str().to_lowercase(),
            format: OutputFormat::Console.as_str().to_string(),
            enable_color: false,
            disable_caller: false,
            disable_stacktrace: false,
            output_paths: vec!["stdout".to_string()],
            error_output_paths: vec!["stderr".to_string()],
            development: false,
            name: String::new(),
            sampling: Some(SamplingConfig::default()),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from TOML; absent keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                format!("reading options file {}", path.display()),
                e.to_string(),
                e,
            )
        })?;
        Self::from_toml_str(&text)
    }

    /// Every violation in this option set; empty when valid
    pub fn validate(&self) -> Vec<LoggerError> {
        let mut errors = Vec::new();

        if let Err(e) = self.level.parse::<Level>() {
            errors.push(e);
        }
        if let Err(e) = self.format.parse::<OutputFormat>() {
            errors.push(e);
        }
        if self.output_paths.is_empty() {
            errors.push(LoggerError::config(
                "output-paths",
                "at least one output path is required",
            ));
        }
        if let Some(ref sampling) = self.sampling {
            if sampling.tick_ms == 0 {
                errors.push(LoggerError::config("sampling", "tick-ms must be positive"));
            }
        }

        errors
    }

    /// Level this option set builds with; unparseable text means Info
    pub fn effective_level(&self) -> Level {
        self.level.parse().unwrap_or_default()
    }

    /// Format this option set builds with; unparseable text means console
    pub fn effective_format(&self) -> OutputFormat {
        self.format.parse().unwrap_or_default()
    }

    fn stacktrace_level(&self) -> Option<Level> {
        match (self.disable_stacktrace, self.development) {
            (true, _) => None,
            (false, true) => Some(Level::Warn),
            (false, false) => Some(Level::Panic),
        }
    }

    /// Build a logger.
    ///
    /// A bad level or format falls back to its default; only an output that
    /// cannot be opened makes this fail.
    pub fn build(&self) -> Result<Logger> {
        let format = self.effective_format();
        let encoder_config = EncoderConfig::new().with_timestamp_format(self.timestamp_format.clone());

        let mut builder = Logger::builder()
            .min_level(self.effective_level())
            .add_caller(!self.disable_caller)
            .stacktrace_level(self.stacktrace_level());

        for path in &self.output_paths {
            let is_console = path == "stdout" || path == "stderr";
            let config = encoder_config.clone().with_color(self.enable_color && is_console);
            builder = builder.boxed_appender(appenders::for_path(path, format.encoder(config))?);
        }
        for path in &self.error_output_paths {
            builder = builder.boxed_error_output(appenders::error_output_for_path(path)?);
        }
        if let Some(ref sampling) = self.sampling {
            builder = builder.sampling(sampling.clone());
        }
        if !self.name.is_empty() {
            builder = builder.name(self.name.as_str());
        }

        Ok(builder.build())
    }
}

/// Renders as JSON
impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
