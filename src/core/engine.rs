//! Shared encoder/sink pipeline
//!
//! One [`Engine`] sits behind every logger derived from the same build. It
//! owns the appenders, the minimum level, the sampler, the error outputs and
//! the terminator. Loggers only decide *what* to write; the engine decides
//! whether a record survives sampling, attaches stacktraces, and shields the
//! call site from sink failures.

use super::{
    appender::Appender,
    error::{LoggerError, Result},
    level::Level,
    metrics::LoggerMetrics,
    record::{Caller, Record},
    sampling::{LogSampler, SamplerMetrics},
    terminator::Terminator,
};
use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

pub struct Engine {
    level: AtomicU8,
    appenders: Mutex<Vec<Box<dyn Appender>>>,
    error_outputs: Mutex<Vec<Box<dyn Write + Send>>>,
    sampler: Option<LogSampler>,
    add_caller: bool,
    stacktrace_level: Option<Level>,
    terminator: Arc<dyn Terminator>,
    metrics: LoggerMetrics,
}

impl Engine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        level: Level,
        appenders: Vec<Box<dyn Appender>>,
        error_outputs: Vec<Box<dyn Write + Send>>,
        sampler: Option<LogSampler>,
        add_caller: bool,
        stacktrace_level: Option<Level>,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        Self {
            level: AtomicU8::new(level as u8),
            appenders: Mutex::new(appenders),
            error_outputs: Mutex::new(error_outputs),
            sampler,
            add_caller,
            stacktrace_level,
            terminator,
            metrics: LoggerMetrics::new(),
        }
    }

    #[inline]
    pub fn level(&self) -> Level {
        match self.level.load(Ordering::Relaxed) {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            3 => Level::Error,
            4 => Level::Panic,
            _ => Level::Fatal,
        }
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Whether a signed verbosity severity passes the level gate
    #[inline]
    pub fn admits_severity(&self, severity: i32) -> bool {
        severity >= i32::from(self.level().severity())
    }

    #[inline]
    pub fn adds_caller(&self) -> bool {
        self.add_caller
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn sampler_metrics(&self) -> Option<&SamplerMetrics> {
        self.sampler.as_ref().map(LogSampler::metrics)
    }

    /// Write a record that already passed the level gate.
    ///
    /// Panic and Fatal records are handed to the terminator afterwards; Fatal
    /// flushes every appender first.
    pub fn write(&self, mut record: Record) {
        if let Some(ref sampler) = self.sampler {
            if !sampler.should_sample(record.level, &record.message) {
                return;
            }
        }

        if self
            .stacktrace_level
            .is_some_and(|threshold| record.level >= threshold)
        {
            record.stacktrace = Some(Backtrace::force_capture().to_string());
        }

        self.dispatch(&record);

        match record.level {
            Level::Panic => self.terminator.terminate(Level::Panic, &record.message),
            Level::Fatal => {
                let _ = self.flush();
                self.terminator.terminate(Level::Fatal, &record.message);
            }
            _ => {}
        }
    }

    /// Run the terminal effect of a Panic record the level gate filtered out
    pub(crate) fn terminate_filtered(&self, level: Level, message: &str) {
        if level >= Level::Panic {
            self.terminator.terminate(level, message);
        }
    }

    /// Report malformed loose key-value input.
    ///
    /// Always written at `Error`, independent of the caller's level and of the
    /// engine's level gate, and never sampled.
    pub(crate) fn diagnose(&self, err: &LoggerError, logger_name: Option<String>, caller: Option<Caller>) {
        self.metrics.record_malformed();

        let mut record = Record::new(Level::Error, err.to_string()).with_logger_name(logger_name);
        record.caller = caller;
        self.dispatch(&record);
    }

    /// Hand a record to every appender, isolating failures and panics per appender
    fn dispatch(&self, record: &Record) {
        let mut has_error = false;
        let mut appenders = self.appenders.lock();

        for appender in appenders.iter_mut() {
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(record)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    self.report_error(format_args!("appender '{}' failed: {}", appender.name(), e));
                    has_error = true;
                }
                Err(panic_info) => {
                    self.report_error(format_args!(
                        "appender '{}' panicked: {}",
                        appender.name(),
                        panic_message(&*panic_info)
                    ));
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_dropped();
        } else {
            self.metrics.record_logged();
        }
    }

    /// Flush every appender; the first failure is returned after all were tried
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        let mut appenders = self.appenders.lock();

        for appender in appenders.iter_mut() {
            if let Err(e) = appender.flush() {
                self.report_error(format_args!("appender '{}' flush failed: {}", appender.name(), e));
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Write a line about the engine's own failures to the error outputs
    fn report_error(&self, message: fmt::Arguments<'_>) {
        let line = format!(
            "{} logger error: {}\n",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            message
        );

        let mut outputs = self.error_outputs.lock();
        if outputs.is_empty() {
            eprint!("{}", line);
            return;
        }
        for output in outputs.iter_mut() {
            let _ = output.write_all(line.as_bytes());
            let _ = output.flush();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("level", &self.level())
            .field("appenders", &self.appenders.lock().len())
            .field("sampler", &self.sampler)
            .field("add_caller", &self.add_caller)
            .field("stacktrace_level", &self.stacktrace_level)
            .finish()
    }
}
