//! Final step of Panic and Fatal records
//!
//! The engine hands the record to its appenders first, then calls the
//! terminator. The process terminator unwinds (Panic) or exits (Fatal); tests
//! install their own to observe the call without ending the test process.

use super::level::Level;

pub trait Terminator: Send + Sync {
    /// Called once the Panic or Fatal record has been written
    fn terminate(&self, level: Level, message: &str);
}

/// Panics on `Level::Panic`, exits with status 1 on `Level::Fatal`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn terminate(&self, level: Level, message: &str) {
        match level {
            Level::Fatal => std::process::exit(1),
            _ => std::panic::panic_any(message.to_string()),
        }
    }
}
