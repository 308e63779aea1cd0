//! Observability: structured logging via `tracing`.
//!
//! Metrics are emitted through the `metrics` facade (`triple_store_puts_total`,
//! `triple_store_queries_total`, `llm_requests_total`,
//! `graph_index_chunks_total`). No recorder is installed here; the calls are
//! no-ops unless the embedding application installs one.

mod logging;

pub use logging::{LogFormat, LoggingConfig};

use crate::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

static LOGGING_INSTALLED: OnceLock<()> = OnceLock::new();

/// Output layer installed on the registry.
type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global `tracing` subscriber.
///
/// Events go to stderr unless a log file is configured, so stdout stays
/// reserved for command output.
///
/// # Errors
///
/// Returns an error if logging was already installed or the log file cannot
/// be opened.
pub fn init(config: LoggingConfig) -> Result<()> {
    if LOGGING_INSTALLED.get().is_some() {
        return Err(init_failed("logging already installed"));
    }

    let to_file = config.file.is_some();
    let writer = match &config.file {
        Some(path) => BoxMakeWriter::new(open_log_file(path)?),
        None => BoxMakeWriter::new(io::stderr),
    };

    tracing_subscriber::registry()
        .with(output_layer(config.format, writer, to_file))
        .with(config.filter)
        .try_init()
        .map_err(|e| init_failed(&e.to_string()))?;

    LOGGING_INSTALLED
        .set(())
        .map_err(|()| init_failed("logging installed concurrently"))
}

/// Builds the formatting layer. Files never get ANSI colors.
fn output_layer(format: LogFormat, writer: BoxMakeWriter, to_file: bool) -> OutputLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true);
    match format {
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty if to_file => layer.with_ansi(false).boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    }
}

fn init_failed(cause: &str) -> Error {
    Error::OperationFailed {
        operation: "logging_init".to_string(),
        cause: cause.to_string(),
    }
}

/// Thread-safe file writer for logging.
#[derive(Clone)]
struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Opens a log file for appending.
fn open_log_file(path: &Path) -> Result<LogFileWriter> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_log_dir".to_string(),
            cause: e.to_string(),
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::OperationFailed {
            operation: "open_log_file".to_string(),
            cause: format!("{}: {}", path.display(), e),
        })?;

    Ok(LogFileWriter {
        file: Arc::new(Mutex::new(file)),
    })
}
