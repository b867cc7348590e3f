use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use tracing::{debug, warn};

use crate::LogError;

/// Locator naming the process's standard error stream.
pub const STDERR: &str = "stderr";
/// Locator naming the process's standard output stream.
pub const STDOUT: &str = "stdout";

/// Destination of log lines.
pub enum Sink {
    /// A writer supplied by the caller. The logger flushes it but never
    /// releases it.
    Writer(Box<dyn Write + Send>),
    /// `stderr`, `stdout` or a file path, opened in append mode on the
    /// first emitted record.
    Locator(String),
}

impl Sink {
    pub fn writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self::Writer(Box::new(writer))
    }

    pub fn locator(locator: impl Into<String>) -> Result<Self, LogError> {
        let locator = locator.into();
        if locator.trim().is_empty() {
            return Err(LogError::Config("sink locator must not be empty".to_string()));
        }
        Ok(Self::Locator(locator))
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::Locator(STDERR.to_string())
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sink::Writer(_) => f.write_str("Sink::Writer(..)"),
            Sink::Locator(locator) => f.debug_tuple("Sink::Locator").field(locator).finish(),
        }
    }
}

/// Stream the logger opened itself from a locator.
pub(crate) enum OwnedStream {
    Stderr(io::Stderr),
    Stdout(io::Stdout),
    File(File),
}

impl OwnedStream {
    fn open(locator: &str) -> Result<Self, LogError> {
        match locator {
            STDERR => Ok(Self::Stderr(io::stderr())),
            STDOUT => Ok(Self::Stdout(io::stdout())),
            path => OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(Self::File)
                .map_err(|source| {
                    warn!(locator = path, error = %source, "Unable to open log sink");
                    LogError::SinkOpen {
                        locator: path.to_string(),
                        source,
                    }
                }),
        }
    }
}

impl Write for OwnedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stderr(s) => s.write(buf),
            Self::Stdout(s) => s.write(buf),
            Self::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stderr(s) => s.flush(),
            Self::Stdout(s) => s.flush(),
            Self::File(f) => f.flush(),
        }
    }
}

/// Sink state guarded by the logger's lock, tagged by who owns the handle.
pub(crate) enum SinkState {
    Borrowed(Box<dyn Write + Send>),
    Owned {
        locator: String,
        stream: Option<OwnedStream>,
    },
}

impl SinkState {
    pub(crate) fn new(sink: Sink) -> Self {
        match sink {
            Sink::Writer(writer) => Self::Borrowed(writer),
            Sink::Locator(locator) => Self::Owned {
                locator,
                stream: None,
            },
        }
    }

    /// Open the sink if it is not open yet and return the writable handle.
    ///
    /// A failed open leaves the state untouched, so the next record retries.
    pub(crate) fn ensure_open(&mut self) -> Result<&mut dyn Write, LogError> {
        match self {
            Self::Borrowed(writer) => Ok(writer.as_mut()),
            Self::Owned { locator, stream } => {
                let opened = match stream.take() {
                    Some(opened) => opened,
                    None => {
                        let opened = OwnedStream::open(locator)?;
                        debug!(locator = %locator, "Opened log sink");
                        opened
                    }
                };
                Ok(stream.insert(opened) as &mut dyn Write)
            }
        }
    }

    /// Write one complete line with a single call, then flush.
    pub(crate) fn write_line(&mut self, line: &str) -> Result<(), LogError> {
        let writer = self.ensure_open()?;
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Flush the sink; an owned stream is also released.
    pub(crate) fn close(&mut self) -> Result<(), LogError> {
        match self {
            Self::Borrowed(writer) => writer.flush()?,
            Self::Owned { locator, stream } => {
                if let Some(mut opened) = stream.take() {
                    opened.flush()?;
                    debug!(locator = %locator, "Closed log sink");
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        match self {
            Self::Borrowed(_) => true,
            Self::Owned { stream, .. } => stream.is_some(),
        }
    }
}
