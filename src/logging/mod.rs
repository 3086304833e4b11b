//! Thread-safe logging service.
//!
//! A [`Logger`] serialises messages from any number of threads into a single
//! [`LogSink`]. Every line carries a sequence number, a timestamp, the
//! severity and the label the calling thread registered for itself.
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU8, Ordering},
    },
    thread::{self, ThreadId},
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use tracing::warn;

use crate::{
    config::{LoggingConfig, SinkKind},
    error::{ErrorInfo, ErrorKind},
    expected::Expected,
    propagate,
    registry::ServiceRegistry,
};

pub mod sink;

pub use sink::{ConsoleSink, FileSink, LogSink, MemorySink, TracingSink};

/// Label used for threads that never registered one and have no std name.
pub const UNNAMED_THREAD: &str = "unnamed";

/// Message severity, ordered from least to most severe.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    #[strum(serialize = "debug")]
    Debug = 0,
    #[default]
    #[strum(serialize = "info")]
    Info = 1,
    #[strum(serialize = "warning", serialize = "warn")]
    Warning = 2,
    #[strum(serialize = "error")]
    Error = 3,
    #[strum(serialize = "critical")]
    Critical = 4,
}

impl Severity {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Severity::Debug,
            1 => Severity::Info,
            2 => Severity::Warning,
            3 => Severity::Error,
            _ => Severity::Critical,
        }
    }

    /// Fixed-width upper-case tag used in log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One message on its way to the sink.
#[derive(Debug, Clone)]
pub struct LogMessage {
    pub severity: Severity,
    pub text: String,
    pub thread_label: String,
    pub timestamp: DateTime<Local>,
}

impl LogMessage {
    fn render(&self, sequence: u64) -> String {
        format!(
            "{sequence:06} {} {:<8} [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.severity.tag(),
            self.thread_label,
            self.text
        )
    }
}

struct LoggerState {
    sink: Option<Box<dyn LogSink>>,
    thread_labels: HashMap<ThreadId, String>,
    next_sequence: u64,
    reported_failure: bool,
}

/// Process-wide logger with a pluggable sink.
///
/// All sink writes and label updates go through one mutex, so lines from
/// different threads never interleave and lines from a single thread keep
/// their order.
pub struct Logger {
    state: Mutex<LoggerState>,
    min_severity: AtomicU8,
    fatal_on_sink_error: bool,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_severity", &self.min_severity())
            .field("fatal_on_sink_error", &self.fatal_on_sink_error)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(sink: Box<dyn LogSink>) -> Self {
        Self {
            state: Mutex::new(LoggerState {
                sink: Some(sink),
                thread_labels: HashMap::new(),
                next_sequence: 1,
                reported_failure: false,
            }),
            min_severity: AtomicU8::new(Severity::Debug as u8),
            fatal_on_sink_error: false,
        }
    }

    /// Builds a logger from the `logging` section of the configuration.
    pub fn from_config(config: &LoggingConfig) -> Expected<Self> {
        let sink: Box<dyn LogSink> = match config.sink {
            SinkKind::File => Box::new(propagate!(FileSink::open(&config.path, config.append))),
            SinkKind::Console => Box::new(ConsoleSink),
            SinkKind::Tracing => Box::new(TracingSink),
        };

        Expected::success(
            Logger::new(sink)
                .with_min_severity(config.min_severity)
                .with_fatal_sink_errors(config.fatal_on_sink_error),
        )
    }

    pub fn with_min_severity(self, severity: Severity) -> Self {
        self.set_min_severity(severity);
        self
    }

    /// Makes sink failures panic instead of being returned.
    pub fn with_fatal_sink_errors(mut self, fatal: bool) -> Self {
        self.fatal_on_sink_error = fatal;
        self
    }

    pub fn min_severity(&self) -> Severity {
        Severity::from_u8(self.min_severity.load(Ordering::Relaxed))
    }

    pub fn set_min_severity(&self, severity: Severity) {
        self.min_severity.store(severity as u8, Ordering::Relaxed);
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.min_severity()
    }

    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Names the calling thread in all of its subsequent messages.
    ///
    /// The label is kept until [`Logger::unregister_thread_label`] is called
    /// from the same thread.
    pub fn register_thread_label(&self, label: impl Into<String>) {
        let id = thread::current().id();
        self.lock().thread_labels.insert(id, label.into());
    }

    /// Drops the calling thread's label. Short-lived workers should call this
    /// before they exit.
    pub fn unregister_thread_label(&self) {
        let id = thread::current().id();
        self.lock().thread_labels.remove(&id);
    }

    /// The label messages from the calling thread are tagged with.
    pub fn thread_label(&self) -> String {
        let current = thread::current();
        self.lock()
            .thread_labels
            .get(&current.id())
            .cloned()
            .unwrap_or_else(|| current.name().unwrap_or(UNNAMED_THREAD).to_string())
    }

    /// Replaces the destination. The previous sink is flushed first.
    pub fn set_sink_policy(&self, sink: Box<dyn LogSink>) -> Expected<()> {
        let mut state = self.lock();
        let flushed = match state.sink.as_mut() {
            Some(previous) => previous.flush(),
            None => Expected::success(()),
        };
        state.sink = Some(sink);
        state.reported_failure = false;
        flushed
    }

    pub fn log(&self, severity: Severity, text: &str) -> Expected<()> {
        if !self.enabled(severity) {
            return Expected::success(());
        }
        self.write(severity, text.to_string())
    }

    /// Like [`Logger::log`], but only formats `args` when `severity` passes
    /// the filter.
    pub fn log_args(&self, severity: Severity, args: fmt::Arguments<'_>) -> Expected<()> {
        if !self.enabled(severity) {
            return Expected::success(());
        }
        self.write(severity, args.to_string())
    }

    pub fn debug(&self, text: &str) -> Expected<()> {
        self.log(Severity::Debug, text)
    }

    pub fn info(&self, text: &str) -> Expected<()> {
        self.log(Severity::Info, text)
    }

    pub fn warning(&self, text: &str) -> Expected<()> {
        self.log(Severity::Warning, text)
    }

    pub fn error(&self, text: &str) -> Expected<()> {
        self.log(Severity::Error, text)
    }

    pub fn critical(&self, text: &str) -> Expected<()> {
        self.log(Severity::Critical, text)
    }

    fn write(&self, severity: Severity, text: String) -> Expected<()> {
        let current = thread::current();
        let outcome = {
            let mut state = self.lock();
            let thread_label = state
                .thread_labels
                .get(&current.id())
                .cloned()
                .unwrap_or_else(|| current.name().unwrap_or(UNNAMED_THREAD).to_string());
            let message = LogMessage {
                severity,
                text,
                thread_label,
                timestamp: Local::now(),
            };

            let sequence = state.next_sequence;
            let outcome = match state.sink.as_mut() {
                Some(sink) => sink.append(severity, &message.render(sequence)),
                None => Expected::failure(ErrorInfo::with_kind(
                    ErrorKind::SinkWriteFailure,
                    "logger is closed",
                )),
            };

            match &outcome {
                Expected::Success(()) => state.next_sequence += 1,
                Expected::Failure(err) if !state.reported_failure => {
                    state.reported_failure = true;
                    warn!("log sink failed: {}", err.report());
                }
                Expected::Failure(_) => {}
            }
            outcome
        };

        if self.fatal_on_sink_error
            && let Expected::Failure(err) = &outcome
        {
            panic!("fatal log sink failure: {}", err.report());
        }
        outcome
    }

    pub fn flush(&self) -> Expected<()> {
        match self.lock().sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Expected::success(()),
        }
    }

    /// Flushes and detaches the sink. Later writes fail with
    /// `SinkWriteFailure`.
    pub fn close(&self) -> Expected<()> {
        let mut state = self.lock();
        match state.sink.take() {
            Some(mut sink) => sink.flush(),
            None => Expected::success(()),
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Creates the logger described by `config`, labels the calling thread and
/// provides the logger into `registry`.
pub fn start_logging_service(
    config: &LoggingConfig,
    registry: &ServiceRegistry,
) -> Expected<Arc<Logger>> {
    let logger = Arc::new(propagate!(Logger::from_config(config)));
    logger.register_thread_label(config.main_thread_label.clone());
    propagate!(registry.provide(Arc::clone(&logger)));

    let _ = logger.info("The logging service was started successfully.");
    Expected::success(logger)
}
