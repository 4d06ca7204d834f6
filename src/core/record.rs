//! Log record structure

use super::field::Field;
use super::level::Level;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Call-site location, trimmed to the file's basename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(file: &str, line: u32) -> Self {
        let short = file.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(file);
        Self {
            file: short.to_string(),
            line,
        }
    }

    pub(crate) fn from_location(location: &std::panic::Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single log event, built fresh by every emitting call
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    /// Accumulated logger fields first, then call-site fields
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<Caller>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<String>,
    pub thread_id: String,
    pub thread_name: Option<String>,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields: Vec::new(),
            logger_name: None,
            caller: None,
            stacktrace: None,
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_logger_name(mut self, name: Option<String>) -> Self {
        self.logger_name = name;
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Look up a field by key; the last occurrence wins
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().rev().find(|f| f.key == key)
    }
}
