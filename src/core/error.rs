//! Error types for the logging facade
//!
//! Errors fall in three groups: configuration errors (returned from
//! [`Options::validate`](super::Options::validate) and `build`), malformed
//! loose key-value input (recovered inside the logger, never returned to a
//! log call site), and sink errors (counted and reported to the error output).

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Level text that does not name a known level
    #[error("unrecognized level: {text:?}")]
    InvalidLevel { text: String },

    /// Output format selector that is neither console nor json
    #[error("not a valid log format: {format:?}")]
    InvalidFormat { format: String },

    /// Odd number of loose key-value arguments
    #[error("odd number of arguments passed as key-value pairs for logging, ignored key {ignored:?}")]
    MalformedFields { ignored: String },

    /// Non-string key in a loose key-value list
    #[error("non-string key argument passed to logging, ignoring all later arguments: {key}")]
    InvalidKey { key: String },

    /// A typed field passed through the loose key-value path
    #[error("strongly-typed field {key:?} passed to loose key-value logging")]
    MisplacedTypedField { key: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Every violation found while validating an option set
    #[error("invalid logger options: {}", join_errors(.0))]
    InvalidOptions(Vec<LoggerError>),

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML options parse error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),
}

fn join_errors(errors: &[LoggerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    pub fn invalid_level(text: impl Into<String>) -> Self {
        LoggerError::InvalidLevel { text: text.into() }
    }

    pub fn invalid_format(format: impl Into<String>) -> Self {
        LoggerError::InvalidFormat {
            format: format.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Whether this error came from malformed loose key-value input
    pub fn is_malformed_call(&self) -> bool {
        matches!(
            self,
            LoggerError::MalformedFields { .. }
                | LoggerError::InvalidKey { .. }
                | LoggerError::MisplacedTypedField { .. }
        )
    }
}
