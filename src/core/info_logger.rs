//! Verbosity-gated Info emission
//!
//! [`Logger::v`](crate::Logger::v) hands out an [`InfoLogger`]: either one
//! bound to a numeric verbosity that passed the level gate, or the no-op
//! [`NoopInfoLogger`] that discards everything without allocating.

use super::field::{sweeten, Arg, Field};
use super::level::Level;
use super::logger::Logger;
use std::fmt;
use std::panic::Location;

/// Info-only emission plus an enablement check
pub trait InfoLogger: Send + Sync {
    #[track_caller]
    fn info(&self, message: &str, fields: &[Field]);

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>);

    #[track_caller]
    fn infow(&self, message: &str, keys_and_values: &[Arg]);

    /// Whether anything emitted through this value would be written
    fn enabled(&self) -> bool;
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInfoLogger;

impl InfoLogger for NoopInfoLogger {
    fn info(&self, _message: &str, _fields: &[Field]) {}

    fn infof(&self, _args: fmt::Arguments<'_>) {}

    fn infow(&self, _message: &str, _keys_and_values: &[Arg]) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Emits Info-style calls at the level derived from a verbosity
#[derive(Debug, Clone)]
pub struct LeveledInfoLogger {
    logger: Logger,
    severity: i32,
    level: Level,
}

impl LeveledInfoLogger {
    pub(crate) fn new(logger: Logger, severity: i32) -> Self {
        Self {
            logger,
            severity,
            level: Level::from_severity(severity).min(Level::Error),
        }
    }

    /// Level records are written at
    pub fn level(&self) -> Level {
        self.level
    }
}

impl InfoLogger for LeveledInfoLogger {
    #[track_caller]
    fn info(&self, message: &str, fields: &[Field]) {
        if self.enabled() {
            let caller = self.logger.caller_for(Location::caller());
            self.logger.emit(self.level, message.to_owned(), fields, caller);
        }
    }

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        if self.enabled() {
            let caller = self.logger.caller_for(Location::caller());
            self.logger.emit(self.level, fmt::format(args), &[], caller);
        }
    }

    #[track_caller]
    fn infow(&self, message: &str, keys_and_values: &[Arg]) {
        if self.enabled() {
            let caller = self.logger.caller_for(Location::caller());
            let fields = self.logger.checked_fields(sweeten(keys_and_values.iter().cloned()), &caller);
            self.logger.emit(self.level, message.to_owned(), &fields, caller);
        }
    }

    fn enabled(&self) -> bool {
        self.logger.engine().admits_severity(self.severity)
    }
}
