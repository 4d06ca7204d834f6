//! Appender trait for log output destinations

use super::{error::Result, record::Record};

/// A sink that receives fully built records
///
/// Errors returned from `append` or `flush` never reach the logging call
/// site; the engine counts them and reports them to its error outputs.
pub trait Appender: Send {
    fn append(&mut self, record: &Record) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
