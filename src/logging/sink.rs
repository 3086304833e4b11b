//! Destinations for formatted log lines.
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    error::{ErrorInfo, ErrorKind},
    expected::Expected,
    logging::Severity,
};

/// An append-only, ordered destination for log lines.
///
/// The logger serialises all calls, so implementations do not need their own
/// locking. Failures are reported back as `SinkWriteFailure`.
pub trait LogSink: Send {
    /// Appends one complete, already formatted line (without trailing newline).
    fn append(&mut self, severity: Severity, line: &str) -> Expected<()>;

    /// Pushes buffered lines to the underlying medium.
    fn flush(&mut self) -> Expected<()> {
        Expected::success(())
    }
}

fn sink_failure(what: &str, err: io::Error) -> ErrorInfo {
    ErrorInfo::with_kind(ErrorKind::SinkWriteFailure, what.to_string())
        .caused_by(ErrorInfo::from_error(&err))
}

/// Writes lines to a file on disk.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Opens `path`, creating parent directories. Existing content is kept
    /// when `append` is set and truncated otherwise.
    pub fn open(path: &Path, append: bool) -> Expected<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(err) = fs::create_dir_all(parent)
        {
            return Expected::failure(sink_failure(
                &format!("unable to create log directory {}", parent.display()),
                err,
            ));
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        match options.open(path) {
            Ok(file) => Expected::success(Self {
                path: path.to_path_buf(),
                writer: BufWriter::new(file),
            }),
            Err(err) => Expected::failure(sink_failure(
                &format!("unable to open log file {}", path.display()),
                err,
            )),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn append(&mut self, _severity: Severity, line: &str) -> Expected<()> {
        writeln!(self.writer, "{line}")
            .map_err(|err| sink_failure(&format!("unable to write to {}", self.path.display()), err))
            .into()
    }

    fn flush(&mut self) -> Expected<()> {
        self.writer
            .flush()
            .map_err(|err| sink_failure(&format!("unable to flush {}", self.path.display()), err))
            .into()
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Writes lines to standard error.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn append(&mut self, _severity: Severity, line: &str) -> Expected<()> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{line}")
            .map_err(|err| sink_failure("unable to write to stderr", err))
            .into()
    }

    fn flush(&mut self) -> Expected<()> {
        io::stderr()
            .flush()
            .map_err(|err| sink_failure("unable to flush stderr", err))
            .into()
    }
}

/// Forwards lines into the process-wide `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&mut self, severity: Severity, line: &str) -> Expected<()> {
        match severity {
            Severity::Debug => tracing::debug!(target: "appframe::log", "{line}"),
            Severity::Info => tracing::info!(target: "appframe::log", "{line}"),
            Severity::Warning => tracing::warn!(target: "appframe::log", "{line}"),
            Severity::Error | Severity::Critical => {
                tracing::error!(target: "appframe::log", "{line}")
            }
        }
        Expected::success(())
    }
}

/// Keeps lines in a shared in-memory buffer.
///
/// Clones share the same buffer, so a test can hand one clone to the logger
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
    fail_writes: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every write fails, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines whose text contains `needle`.
    pub fn matching(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(needle))
            .collect()
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, _severity: Severity, line: &str) -> Expected<()> {
        if self.fail_writes {
            return Expected::failure(sink_failure(
                "memory sink rejected the write",
                io::Error::new(io::ErrorKind::StorageFull, "sink is full"),
            ));
        }
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Expected::success(())
    }
}
