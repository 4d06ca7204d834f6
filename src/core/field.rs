//! Structured fields
//!
//! This module provides:
//! - `FieldValue`: the typed value carried by a field
//! - `Field`: a key plus a typed value, built with typed constructors
//! - `Arg` and [`sweeten`]: the loose key-value path, which validates a flat
//!   alternating key/value sequence and converts it into typed fields

use super::error::LoggerError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Key of the marker field appended to a record whose loose key-value input
/// was malformed.
pub const MALFORMED_KEY: &str = "!malformed";

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Encoded as fractional milliseconds
    Duration(Duration),
    /// Display text of an error value
    Error(String),
    /// Opaque value, encoded as-is
    Any(serde_json::Value),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
            FieldValue::Error(e) => write!(f, "{}", e),
            FieldValue::Any(v) => write!(f, "{}", v),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) | FieldValue::Error(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::UInt(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => float_value(*f),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Duration(d) => float_value(d.as_secs_f64() * 1000.0),
            FieldValue::Any(v) => v.clone(),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    /// Short description used in diagnostics about misplaced arguments
    fn describe(&self) -> String {
        match self {
            FieldValue::String(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

fn float_value(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl Serialize for FieldValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::UInt(u64::from(u))
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Any(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A single structured key-value datum
///
/// Keys are never empty. The loose path rejects empty keys at runtime; the
/// typed constructors leave the key to the caller and only check it in debug
/// builds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        debug_assert!(!key.is_empty(), "field key must not be empty");
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int32(key: impl Into<String>, value: i32) -> Self {
        Self::new(key, FieldValue::Int(i64::from(value)))
    }

    pub fn int64(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint64(key: impl Into<String>, value: u64) -> Self {
        Self::new(key, FieldValue::UInt(value))
    }

    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    /// Error field under the conventional `error` key
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::named_error("error", err)
    }

    pub fn named_error(key: impl Into<String>, err: &dyn std::error::Error) -> Self {
        Self::new(key, FieldValue::Error(err.to_string()))
    }

    /// Any serializable value, encoded opaquely
    ///
    /// A value that fails to serialize is recorded as a string describing the
    /// failure rather than dropped.
    pub fn any<T: Serialize + ?Sized>(key: impl Into<String>, value: &T) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|e| serde_json::Value::String(format!("<unencodable: {}>", e)));
        Self::new(key, FieldValue::Any(value))
    }

    pub fn null(key: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Null)
    }

    /// Marker substituted for malformed loose key-value input
    pub(crate) fn malformed(err: &LoggerError) -> Self {
        Self::string(MALFORMED_KEY, err.to_string())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// One element of a loose key-value list
///
/// Build lists with the [`kv!`](crate::kv) macro, which converts every element
/// with `Arg::from`.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(FieldValue),
    /// A typed field; not valid in a loose list
    Field(Field),
}

impl From<Field> for Arg {
    fn from(field: Field) -> Self {
        Arg::Field(field)
    }
}

impl<T: Into<FieldValue>> From<T> for Arg {
    fn from(value: T) -> Self {
        Arg::Value(value.into())
    }
}

/// Result of converting a loose key-value list
#[derive(Debug, Default)]
pub struct LooseFields {
    /// Fields converted before any failure point
    pub fields: Vec<Field>,
    /// Why conversion stopped early, if it did
    pub error: Option<LoggerError>,
}

impl LooseFields {
    /// Converted fields, followed by the malformed marker if conversion failed
    pub fn into_fields(self) -> Vec<Field> {
        let mut fields = self.fields;
        if let Some(ref err) = self.error {
            fields.push(Field::malformed(err));
        }
        fields
    }
}

/// Convert alternating keys and values into typed fields.
///
/// Stops at the first typed field, odd trailing key, or non-string key; the
/// pairs converted before that point are kept.
pub fn sweeten<I>(args: I) -> LooseFields
where
    I: IntoIterator<Item = Arg>,
{
    let mut iter = args.into_iter();
    let mut out = LooseFields {
        fields: Vec::with_capacity(iter.size_hint().0 / 2),
        error: None,
    };

    while let Some(key) = iter.next() {
        let key = match key {
            Arg::Field(field) => {
                out.error = Some(LoggerError::MisplacedTypedField { key: field.key });
                break;
            }
            Arg::Value(FieldValue::String(key)) if !key.is_empty() => key,
            Arg::Value(other) => {
                let described = other.describe();
                if iter.next().is_none() {
                    // A lone trailing element is an odd count, whatever its type.
                    out.error = Some(LoggerError::MalformedFields { ignored: described });
                } else {
                    out.error = Some(LoggerError::InvalidKey { key: described });
                }
                break;
            }
        };

        match iter.next() {
            Some(Arg::Value(value)) => out.fields.push(Field { key, value }),
            Some(Arg::Field(field)) => {
                out.error = Some(LoggerError::MisplacedTypedField { key: field.key });
                break;
            }
            None => {
                out.error = Some(LoggerError::MalformedFields { ignored: key });
                break;
            }
        }
    }

    out
}
