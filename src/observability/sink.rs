//! Output and diagnostic sinks.
//!
//! # Responsibilities
//! - Carry rendered messages to any byte stream (stdout by default)
//! - Report the logger's own faults without disturbing the exchange

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Prefix written before each diagnostic line.
pub const DIAGNOSTIC_PREFIX: &str = " [request/response logger] ";

/// Shared byte sink. Each message is written and flushed under one lock so
/// concurrent exchanges never interleave within a message.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl std::fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSink").finish_non_exhaustive()
    }
}

impl OutputSink {
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::from_writer(io::stderr())
    }

    /// Append to the file at `path`, creating it if needed.
    pub fn file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(file))
    }

    /// Write one complete message and flush it.
    pub fn write_message(&self, message: &[u8]) -> io::Result<()> {
        let mut writer = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output sink lock poisoned"))?;
        writer.write_all(message)?;
        writer.flush()
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Line-oriented sink for the logger's own errors.
///
/// Every line is also emitted as a `tracing` warning. Failures writing a
/// diagnostic are dropped.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    sink: OutputSink,
    prefix: String,
}

impl Diagnostics {
    pub fn new(sink: OutputSink, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
        }
    }

    /// Diagnostics sharing `sink` with the default prefix.
    pub fn for_sink(sink: &OutputSink) -> Self {
        Self::new(sink.clone(), DIAGNOSTIC_PREFIX)
    }

    pub fn report(&self, message: &str) {
        tracing::warn!(target: "reqlog::diagnostics", "{}", message);
        let line = format!("{}{}\n", self.prefix, message);
        let _ = self.sink.write_message(line.as_bytes());
    }
}

/// Cloneable in-memory writer; every clone sees the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().map(|b| b.is_empty()).unwrap_or(true)
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.buf.lock() {
            buf.clear();
        }
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink lock poisoned"))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
