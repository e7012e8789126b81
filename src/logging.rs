//! Verbosity-gated progress output through an injected sink.
//!
//! The trainer never writes to an ambient stream: all progress goes
//! through the [`LogSink`] supplied by the configuration, which defaults
//! to standard error.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// How much progress output the trainer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Start and finish summary lines.
    Info,
    /// Per-worker progress in addition to the summary.
    Debug,
}

/// Cloneable handle to a shared, thread-safe log sink.
#[derive(Clone)]
pub struct LogSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl LogSink {
    /// Wrap an arbitrary writer.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// A sink writing to standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Write one line. Sink failures are swallowed: logging must never
    /// abort training.
    pub(crate) fn line(&self, message: fmt::Arguments<'_>) {
        if let Ok(mut writer) = self.inner.lock() {
            let _ = writeln!(writer, "{message}");
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogSink")
    }
}

/// Pairs a sink with a verbosity threshold.
#[derive(Debug, Clone)]
pub struct TrainingLogger {
    sink: LogSink,
    verbosity: Verbosity,
}

impl TrainingLogger {
    pub fn new(sink: LogSink, verbosity: Verbosity) -> Self {
        Self { sink, verbosity }
    }

    /// Emit a summary line at `Info` and above.
    pub fn info(&self, message: fmt::Arguments<'_>) {
        if self.verbosity >= Verbosity::Info {
            self.sink.line(message);
        }
    }

    /// Emit a progress line at `Debug` only.
    pub fn debug(&self, message: fmt::Arguments<'_>) {
        if self.verbosity >= Verbosity::Debug {
            self.sink.line(message);
        }
    }
}
