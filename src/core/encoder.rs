//! Record encoders
//!
//! An [`Encoder`] turns a [`Record`] into the bytes written by an appender.
//! Two encoders ship with the crate:
//! - [`TextEncoder`]: tab-separated human-readable lines, optionally colored
//! - [`JsonEncoder`]: one JSON object per line

use super::error::{LoggerError, Result};
use super::field::FieldValue;
use super::record::Record;
use super::timestamp::TimestampFormat;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MESSAGE_KEY: &str = "message";
pub const LEVEL_KEY: &str = "level";
pub const TIME_KEY: &str = "timestamp";
pub const NAME_KEY: &str = "logger";
pub const CALLER_KEY: &str = "caller";
pub const STACKTRACE_KEY: &str = "stacktrace";

/// Output format selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text (default)
    ///
    /// Example: `2025-01-08T10:30:45.123Z	INFO	api	main.rs:12	Request processed	status=200`
    #[default]
    Console,

    /// JSON, one object per line
    ///
    /// Example: `{"level":"INFO","message":"Request processed","status":200,...}`
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Console => "console",
            OutputFormat::Json => "json",
        }
    }

    /// Build the encoder for this format
    pub fn encoder(&self, config: EncoderConfig) -> Box<dyn Encoder> {
        match self {
            OutputFormat::Console => Box::new(TextEncoder::new(config)),
            OutputFormat::Json => Box::new(JsonEncoder::new(config)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" | "text" | "plain" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            _ => Err(LoggerError::invalid_format(s)),
        }
    }
}

/// Settings shared by the encoders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderConfig {
    pub timestamp_format: TimestampFormat,
    /// Color the level name; only honored by [`TextEncoder`]
    pub color: bool,
}

impl EncoderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Turns a record into bytes
pub trait Encoder: Send + Sync {
    /// Append the encoded record, including its line ending, to `buf`
    fn encode(&self, record: &Record, buf: &mut Vec<u8>) -> Result<()>;

    fn name(&self) -> &str;
}

/// Escape characters that would let a message forge extra log lines
fn sanitize(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

pub struct TextEncoder {
    config: EncoderConfig,
}

impl TextEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    fn format_value(value: &FieldValue) -> String {
        match value {
            FieldValue::String(s) | FieldValue::Error(s) => {
                if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '"' || c == '=') {
                    format!("{:?}", s)
                } else {
                    s.clone()
                }
            }
            other => sanitize(&other.to_string()),
        }
    }
}

impl Encoder for TextEncoder {
    fn encode(&self, record: &Record, buf: &mut Vec<u8>) -> Result<()> {
        let mut parts = Vec::with_capacity(6);
        parts.push(self.config.timestamp_format.format(&record.timestamp));

        let level = format!("{:5}", record.level.as_str());
        if self.config.color {
            parts.push(level.color(record.level.color_code()).to_string());
        } else {
            parts.push(level);
        }

        if let Some(ref name) = record.logger_name {
            parts.push(sanitize(name));
        }
        if let Some(ref caller) = record.caller {
            parts.push(sanitize(&caller.to_string()));
        }
        parts.push(sanitize(&record.message));

        if !record.fields.is_empty() {
            parts.push(
                record
                    .fields
                    .iter()
                    .map(|f| format!("{}={}", sanitize(&f.key), Self::format_value(&f.value)))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }

        let mut line = parts.join("\t");
        if let Some(ref stacktrace) = record.stacktrace {
            line.push('\n');
            line.push_str(stacktrace.trim_end());
        }
        line.push('\n');

        buf.extend_from_slice(line.as_bytes());
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, record: &Record, buf: &mut Vec<u8>) -> Result<()> {
        let mut json_obj = serde_json::Map::new();

        json_obj.insert(
            TIME_KEY.to_string(),
            self.config.timestamp_format.to_json_value(&record.timestamp),
        );
        json_obj.insert(
            LEVEL_KEY.to_string(),
            serde_json::Value::String(record.level.as_str().to_string()),
        );
        if let Some(ref name) = record.logger_name {
            json_obj.insert(NAME_KEY.to_string(), serde_json::Value::String(name.clone()));
        }
        if let Some(ref caller) = record.caller {
            json_obj.insert(
                CALLER_KEY.to_string(),
                serde_json::Value::String(caller.to_string()),
            );
        }
        json_obj.insert(
            MESSAGE_KEY.to_string(),
            serde_json::Value::String(record.message.clone()),
        );

        // Later duplicates overwrite earlier ones.
        for field in &record.fields {
            json_obj.insert(field.key.clone(), field.value.to_json_value());
        }

        if let Some(ref stacktrace) = record.stacktrace {
            json_obj.insert(
                STACKTRACE_KEY.to_string(),
                serde_json::Value::String(stacktrace.clone()),
            );
        }

        serde_json::to_writer(&mut *buf, &serde_json::Value::Object(json_obj))?;
        buf.push(b'\n');
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Caller, Field, Level};

    fn encode(encoder: &dyn Encoder, record: &Record) -> String {
        let mut buf = Vec::new();
        encoder.encode(record, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_format() {
        let record = Record::new(Level::Info, "Test message")
            .with_logger_name(Some("api.users".into()))
            .with_caller(Caller::new("src/handlers.rs", 42));
        let line = encode(&TextEncoder::new(EncoderConfig::new()), &record);

        assert!(line.contains("INFO"));
        assert!(line.contains("api.users"));
        assert!(line.contains("handlers.rs:42"));
        assert!(line.contains("Test message"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_text_format_with_fields() {
        let record = Record::new(Level::Info, "User logged in").with_fields(vec![
            Field::int32("user_id", 123),
            Field::string("action", "login"),
            Field::string("note", "two words"),
        ]);
        let line = encode(&TextEncoder::new(EncoderConfig::new()), &record);

        assert!(line.contains("user_id=123"));
        assert!(line.contains("action=login"));
        assert!(line.contains("note=\"two words\""));
    }

    #[test]
    fn test_text_escapes_injection() {
        let record = Record::new(Level::Info, "login\nERROR fake entry");
        let line = encode(&TextEncoder::new(EncoderConfig::new()), &record);

        assert!(line.contains("\\n"));
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_text_escapes_logger_name() {
        let record = Record::new(Level::Info, "real")
            .with_logger_name(Some("svc\nFAKE\tERROR\tforged".into()));
        let line = encode(&TextEncoder::new(EncoderConfig::new()), &record);

        assert!(line.contains("svc\\nFAKE\\tERROR\\tforged"));
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_json_format() {
        let record = Record::new(Level::Error, "Error occurred")
            .with_fields(vec![Field::string("request_id", "abc-123"), Field::int64("latency_ms", 42)]);
        let line = encode(&JsonEncoder::new(EncoderConfig::new()), &record);

        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["level"], "ERROR");
        assert_eq!(parsed["message"], "Error occurred");
        assert_eq!(parsed["request_id"], "abc-123");
        assert_eq!(parsed["latency_ms"], 42);
        assert!(parsed["timestamp"].is_string());
        assert!(parsed.get("logger").is_none());
    }

    #[test]
    fn test_json_duplicate_keys_last_wins() {
        let record = Record::new(Level::Info, "dup")
            .with_fields(vec![Field::int32("k", 1), Field::int32("k", 2)]);
        let line = encode(&JsonEncoder::new(EncoderConfig::new()), &record);

        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["k"], 2);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("console".parse::<OutputFormat>().unwrap(), OutputFormat::Console);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Console);
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(LoggerError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Console);
    }
}
