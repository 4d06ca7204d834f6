//! Main logger implementation
//!
//! A [`Logger`] is a cheap, cloneable handle: a shared [`Engine`], the fields
//! accumulated by derivation, and an optional dotted name. Deriving (with
//! fields, values, or a name) copies the handle and extends it; the receiver
//! never changes, so derived loggers can be handed to other threads freely.

use super::{
    appender::Appender,
    context::{Context, KEY_REQUEST_ID, KEY_USERNAME},
    engine::Engine,
    error::Result,
    field::{sweeten, Arg, Field, LooseFields},
    info_logger::{InfoLogger, LeveledInfoLogger, NoopInfoLogger},
    level::Level,
    metrics::LoggerMetrics,
    record::{Caller, Record},
    sampling::{LogSampler, SamplerMetrics, SamplingConfig},
    terminator::{ProcessTerminator, Terminator},
};
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Logger {
    engine: Arc<Engine>,
    fields: Arc<[Field]>,
    name: Option<Arc<str>>,
}

/// Generates the plain, printf-style and loose variants for one level
macro_rules! level_methods {
    ($($level:ident => $plain:ident, $fmt:ident, $loose:ident;)*) => {
        $(
            #[doc = concat!("Log at `", stringify!($level), "` with typed fields")]
            #[track_caller]
            #[inline]
            pub fn $plain(&self, message: &str, fields: &[Field]) {
                self.log(Level::$level, message, fields);
            }

            #[doc = concat!("Log a formatted message at `", stringify!($level), "`")]
            #[track_caller]
            #[inline]
            pub fn $fmt(&self, args: fmt::Arguments<'_>) {
                self.logf(Level::$level, args);
            }

            #[doc = concat!("Log at `", stringify!($level), "` with alternating keys and values")]
            #[track_caller]
            #[inline]
            pub fn $loose(&self, message: &str, keys_and_values: &[Arg]) {
                self.logw(Level::$level, message, keys_and_values);
            }
        )*
    };
}

impl Logger {
    /// Info-level logger writing colored text to stdout
    pub fn new() -> Self {
        Self::builder()
            .appender(crate::appenders::ConsoleAppender::new())
            .build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    fn from_engine(engine: Arc<Engine>, fields: Vec<Field>, name: Option<String>) -> Self {
        Self {
            engine,
            fields: fields.into(),
            name: name.filter(|n| !n.is_empty()).map(Arc::from),
        }
    }

    level_methods! {
        Debug => debug, debugf, debugw;
        Info => info, infof, infow;
        Warn => warn, warnf, warnw;
        Error => error, errorf, errorw;
        Panic => panic, panicf, panicw;
        Fatal => fatal, fatalf, fatalw;
    }

    /// Log at `level` with typed fields.
    ///
    /// Panic records unwind and Fatal records exit the process once written,
    /// unless the logger was built with another [`Terminator`].
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: &[Field]) {
        if !self.engine.enabled(level) {
            self.engine.terminate_filtered(level, message);
            return;
        }
        let caller = self.caller_for(Location::caller());
        self.emit(level, message.to_owned(), fields, caller);
    }

    /// Log a formatted message at `level`
    #[track_caller]
    pub fn logf(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.engine.enabled(level) {
            if level >= Level::Panic {
                self.engine.terminate_filtered(level, &fmt::format(args));
            }
            return;
        }
        let caller = self.caller_for(Location::caller());
        self.emit(level, fmt::format(args), &[], caller);
    }

    /// Log at `level` with a loose, alternating key/value list.
    ///
    /// Malformed input is reported through a separate Error record and the
    /// converted prefix is written with a `!malformed` marker field.
    #[track_caller]
    pub fn logw(&self, level: Level, message: &str, keys_and_values: &[Arg]) {
        if !self.engine.enabled(level) {
            self.engine.terminate_filtered(level, message);
            return;
        }
        let caller = self.caller_for(Location::caller());
        let fields = self.checked_fields(sweeten(keys_and_values.iter().cloned()), &caller);
        self.emit(level, message.to_owned(), &fields, caller);
    }

    /// Info-only logger for a numeric verbosity.
    ///
    /// `v(0)` is Info and `v(1)` is Debug. A verbosity the engine's level
    /// filters out yields a [`NoopInfoLogger`].
    pub fn v(&self, verbosity: i32) -> Box<dyn InfoLogger> {
        let severity = verbosity.saturating_neg();
        if self.engine.admits_severity(severity) {
            Box::new(LeveledInfoLogger::new(self.clone(), severity))
        } else {
            Box::new(NoopInfoLogger)
        }
    }

    /// Derived logger carrying additional typed fields
    #[must_use]
    pub fn with_fields(&self, fields: &[Field]) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }
        let mut accumulated = Vec::with_capacity(self.fields.len() + fields.len());
        accumulated.extend_from_slice(&self.fields);
        accumulated.extend_from_slice(fields);
        Logger {
            engine: Arc::clone(&self.engine),
            fields: accumulated.into(),
            name: self.name.clone(),
        }
    }

    /// Derived logger carrying additional loose key/value pairs
    #[must_use]
    #[track_caller]
    pub fn with_values(&self, keys_and_values: &[Arg]) -> Logger {
        let caller = self.caller_for(Location::caller());
        let fields = self.checked_fields(sweeten(keys_and_values.iter().cloned()), &caller);
        self.with_fields(&fields)
    }

    /// Derived logger whose name gains a `.`-separated segment
    #[must_use]
    pub fn with_name(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        let name: Arc<str> = match self.name {
            Some(ref parent) => Arc::from(format!("{}.{}", parent, name)),
            None => Arc::from(name),
        };
        Logger {
            engine: Arc::clone(&self.engine),
            fields: Arc::clone(&self.fields),
            name: Some(name),
        }
    }

    /// New context carrying this logger; `ctx` is unchanged
    pub fn with_context(&self, ctx: &Context) -> Context {
        ctx.with_logger(self.clone())
    }

    /// Derived logger with the request id and user name found in `ctx`.
    ///
    /// Both fields are always added; a missing value becomes an empty string.
    #[must_use]
    pub fn with_request_fields(&self, ctx: &Context) -> Logger {
        self.with_fields(&[
            Field::string(KEY_REQUEST_ID, ctx.string_value(KEY_REQUEST_ID).unwrap_or_default()),
            Field::string(KEY_USERNAME, ctx.string_value(KEY_USERNAME).unwrap_or_default()),
        ])
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.engine.enabled(level)
    }

    pub fn level(&self) -> Level {
        self.engine.level()
    }

    /// Change the minimum level for every logger sharing this engine
    pub fn set_level(&self, level: Level) {
        self.engine.set_level(level);
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Fields attached by derivation, oldest first
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.engine.metrics()
    }

    pub fn sampler_metrics(&self) -> Option<&SamplerMetrics> {
        self.engine.sampler_metrics()
    }

    /// Whether both loggers write through the same engine
    pub fn shares_engine(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.engine, &other.engine)
    }

    pub fn flush(&self) -> Result<()> {
        self.engine.flush()
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    pub(crate) fn caller_for(&self, location: &Location<'_>) -> Option<Caller> {
        self.engine
            .adds_caller()
            .then(|| Caller::from_location(location))
    }

    /// Report a conversion failure, then return the fields to attach
    pub(crate) fn checked_fields(&self, loose: LooseFields, caller: &Option<Caller>) -> Vec<Field> {
        if let Some(ref err) = loose.error {
            self.engine
                .diagnose(err, self.name.as_deref().map(String::from), caller.clone());
        }
        loose.into_fields()
    }

    /// Build the record for an enabled call and hand it to the engine
    pub(crate) fn emit(&self, level: Level, message: String, fields: &[Field], caller: Option<Caller>) {
        let mut all = Vec::with_capacity(self.fields.len() + fields.len());
        all.extend_from_slice(&self.fields);
        all.extend_from_slice(fields);

        let mut record = Record::new(level, message)
            .with_fields(all)
            .with_logger_name(self.name.as_deref().map(String::from));
        record.caller = caller;
        self.engine.write(record);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl InfoLogger for Logger {
    #[track_caller]
    fn info(&self, message: &str, fields: &[Field]) {
        Logger::info(self, message, fields);
    }

    #[track_caller]
    fn infof(&self, args: fmt::Arguments<'_>) {
        Logger::infof(self, args);
    }

    #[track_caller]
    fn infow(&self, message: &str, keys_and_values: &[Arg]) {
        Logger::infow(self, message, keys_and_values);
    }

    fn enabled(&self) -> bool {
        Logger::enabled(self, Level::Info)
    }
}

/// Each write becomes one Info record, trailing newlines trimmed
///
/// Writer records carry no caller even when caller capture is on: writes
/// usually arrive through another writer (`writeln!`, `BufWriter`, a
/// redirected library), so the location would be that adapter's.
impl Write for Logger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.engine.enabled(Level::Info) {
            let text = String::from_utf8_lossy(buf);
            let message = text.trim_end_matches(|c| c == '\r' || c == '\n');
            self.emit(Level::Info, message.to_owned(), &[], None);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.engine
            .flush()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_log_facade::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(Level::Debug)
///     .appender(ConsoleAppender::new())
///     .sampling(SamplingConfig::default())
///     .name("api")
///     .build();
///
/// assert!(logger.enabled(Level::Debug));
/// assert_eq!(logger.name(), Some("api"));
/// ```
pub struct LoggerBuilder {
    min_level: Level,
    appenders: Vec<Box<dyn Appender>>,
    error_outputs: Vec<Box<dyn Write + Send>>,
    sampling: Option<SamplingConfig>,
    add_caller: bool,
    stacktrace_level: Option<Level>,
    terminator: Arc<dyn Terminator>,
    name: Option<String>,
    fields: Vec<Field>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: Level::Info,
            appenders: Vec::new(),
            error_outputs: Vec::new(),
            sampling: None,
            add_caller: true,
            stacktrace_level: Some(Level::Panic),
            terminator: Arc::new(ProcessTerminator),
            name: None,
            fields: Vec::new(),
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Destination for the engine's own failure reports; stderr if none is set
    #[must_use = "builder methods return a new value"]
    pub fn error_output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.error_outputs.push(Box::new(output));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_error_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.error_outputs.push(output);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sampling(mut self, config: SamplingConfig) -> Self {
        self.sampling = Some(config);
        self
    }

    /// Record the call site on every record (on by default)
    #[must_use = "builder methods return a new value"]
    pub fn add_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    /// Minimum level that captures a stacktrace; `None` disables capture
    #[must_use = "builder methods return a new value"]
    pub fn stacktrace_level(mut self, level: Option<Level>) -> Self {
        self.stacktrace_level = level;
        self
    }

    /// What happens after a Panic or Fatal record is written
    #[must_use = "builder methods return a new value"]
    pub fn terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fields carried by every record of the built logger
    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn build(self) -> Logger {
        let engine = Engine::new(
            self.min_level,
            self.appenders,
            self.error_outputs,
            self.sampling.map(LogSampler::new),
            self.add_caller,
            self.stacktrace_level,
            self.terminator,
        );
        Logger::from_engine(Arc::new(engine), self.fields, self.name)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemoryAppender;
    use crate::core::field::{FieldValue, MALFORMED_KEY};
    use crate::kv;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingTerminator {
        calls: Mutex<Vec<(Level, String)>>,
    }

    impl Terminator for RecordingTerminator {
        fn terminate(&self, level: Level, message: &str) {
            self.calls.lock().push((level, message.to_string()));
        }
    }

    fn memory_logger(level: Level) -> (Logger, MemoryAppender) {
        let memory = MemoryAppender::new();
        let logger = Logger::builder()
            .min_level(level)
            .appender(memory.clone())
            .build();
        (logger, memory)
    }

    #[test]
    fn test_builder_basic() {
        let logger = Logger::builder().min_level(Level::Debug).build();
        assert_eq!(logger.level(), Level::Debug);
        assert!(logger.name().is_none());
        assert!(logger.fields().is_empty());
        assert!(logger.sampler_metrics().is_none());
    }

    #[test]
    fn test_level_gating() {
        let (logger, memory) = memory_logger(Level::Warn);
        logger.debug("d", &[]);
        logger.info("i", &[]);
        logger.warn("w", &[]);
        logger.error("e", &[]);
        assert_eq!(memory.messages(), ["w", "e"]);
    }

    #[test]
    fn test_printf_style() {
        let (logger, memory) = memory_logger(Level::Info);
        logger.infof(format_args!("listening on {}:{}", "localhost", 8080));
        assert_eq!(memory.messages(), ["listening on localhost:8080"]);
    }

    #[test]
    fn test_accumulated_fields_precede_call_fields() {
        let (logger, memory) = memory_logger(Level::Info);
        let child = logger.with_fields(&[Field::string("service", "api")]);
        child.info("m", &[Field::int32("attempt", 2)]);

        let record = &memory.records()[0];
        let keys: Vec<_> = record.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["service", "attempt"]);
    }

    #[test]
    fn test_derivation_leaves_parent_untouched() {
        let (logger, memory) = memory_logger(Level::Info);
        let child = logger.with_values(&kv!["k", "v"]);
        assert!(logger.fields().is_empty());
        assert_eq!(child.fields().len(), 1);
        assert!(child.shares_engine(&logger));

        logger.info("parent", &[]);
        assert!(memory.records()[0].fields.is_empty());
    }

    #[test]
    fn test_with_name_joins_segments() {
        let logger = Logger::builder().build();
        let named = logger.with_name("db").with_name("pool");
        assert_eq!(named.name(), Some("db.pool"));
        assert_eq!(named.with_name("").name(), Some("db.pool"));
        assert!(logger.name().is_none());
    }

    #[test]
    fn test_loose_malformed_writes_diagnostic_and_marker() {
        let (logger, memory) = memory_logger(Level::Info);
        logger.infow("user login", &kv!["user", "alice", "dangling"]);

        let records = memory.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Level::Error);
        assert_eq!(records[1].message, "user login");
        assert_eq!(
            records[1].field("user").map(|f| &f.value),
            Some(&FieldValue::String("alice".into()))
        );
        assert!(records[1].field(MALFORMED_KEY).is_some());
        assert_eq!(logger.metrics().malformed_calls(), 1);
    }

    #[test]
    fn test_diagnostic_bypasses_level_gate() {
        let (logger, memory) = memory_logger(Level::Fatal);
        let child = logger.with_values(&kv![1, 2]);
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.records()[0].level, Level::Error);
        assert_eq!(child.fields()[0].key, MALFORMED_KEY);
    }

    #[test]
    fn test_verbosity() {
        let (logger, memory) = memory_logger(Level::Info);
        assert!(logger.v(0).enabled());
        assert!(!logger.v(1).enabled());
        logger.v(1).info("too chatty", &[]);
        logger.v(0).info("shown", &[]);
        assert_eq!(memory.messages(), ["shown"]);
        assert_eq!(memory.records()[0].level, Level::Info);
    }

    #[test]
    fn test_caller_points_at_call_site() {
        let (logger, memory) = memory_logger(Level::Info);
        let line = line!() + 1;
        logger.info("here", &[]);

        let caller = memory.records()[0].caller.clone().unwrap();
        assert_eq!(caller.file, "logger.rs");
        assert_eq!(caller.line, line);
    }

    #[test]
    fn test_caller_disabled() {
        let memory = MemoryAppender::new();
        let logger = Logger::builder()
            .appender(memory.clone())
            .add_caller(false)
            .build();
        logger.info("m", &[]);
        assert!(memory.records()[0].caller.is_none());
    }

    #[test]
    fn test_panic_writes_then_terminates() {
        let memory = MemoryAppender::new();
        let terminator = Arc::new(RecordingTerminator::default());
        let logger = Logger::builder()
            .appender(memory.clone())
            .terminator(terminator.clone())
            .build();

        logger.panic("invariant broken", &[]);

        assert_eq!(memory.messages(), ["invariant broken"]);
        assert!(memory.records()[0].stacktrace.is_some());
        assert_eq!(
            *terminator.calls.lock(),
            vec![(Level::Panic, "invariant broken".to_string())]
        );
    }

    #[test]
    fn test_fatal_flushes_before_terminating() {
        let memory = MemoryAppender::new();
        let terminator = Arc::new(RecordingTerminator::default());
        let logger = Logger::builder()
            .appender(memory.clone())
            .terminator(terminator.clone())
            .stacktrace_level(None)
            .build();

        logger.fatalf(format_args!("cannot bind {}", 443));

        assert_eq!(memory.flush_count(), 1);
        assert!(memory.records()[0].stacktrace.is_none());
        assert_eq!(terminator.calls.lock()[0].0, Level::Fatal);
    }

    #[test]
    fn test_io_write_trims_newline() {
        let (mut logger, memory) = memory_logger(Level::Info);
        logger.write_all(b"from a writer\n").unwrap();
        assert_eq!(memory.messages(), ["from a writer"]);
    }

    #[test]
    fn test_io_write_records_no_caller() {
        let (mut logger, memory) = memory_logger(Level::Info);
        assert!(logger.engine().adds_caller());
        logger.write_all(b"redirected\r\n").unwrap();
        logger.info("direct", &[]);

        let records = memory.records();
        assert!(records[0].caller.is_none());
        assert!(records[1].caller.is_some());
    }

    #[test]
    fn test_set_level_shared_by_derived_loggers() {
        let (logger, memory) = memory_logger(Level::Info);
        let child = logger.with_name("child");
        logger.set_level(Level::Debug);
        child.debug("now visible", &[]);
        assert_eq!(memory.len(), 1);
    }
}
