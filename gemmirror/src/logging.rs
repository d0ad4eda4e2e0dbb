//! Logging infrastructure for gemmirror.
//!
//! Provides structured logging with file output and console output:
//! - Writes to `<log_dir>/gemmirror.log` (cleared on session start)
//! - Mirrors warnings and errors to stderr so they show up next to progress bars
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize logging with a log file and a stderr layer.
///
/// Creates the log directory if needed, clears the previous log file,
/// and writes every event accepted by `RUST_LOG` (default `info`) to the file.
/// Only warnings and errors are echoed to stderr.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or the log file
/// cannot be cleared.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, io::Error> {
    prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_timer(LocalTime::rfc_3339())
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(stderr_layer())
        .init();

    Ok(LoggingGuard {
        _file_guard: Some(file_guard),
    })
}

/// Create `log_dir` if needed and truncate `log_file` inside it.
///
/// Returns the full path of the log file.
pub fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(log_file);
    fs::write(&path, "")?;
    Ok(path)
}

/// Initialize stderr-only logging.
///
/// Used when the user opts out of the log file.
pub fn init_stderr_logging() -> LoggingGuard {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer())
        .init();

    LoggingGuard { _file_guard: None }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn stderr_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(true)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN)
}

/// Get default log file name.
pub fn default_log_file() -> &'static str {
    "gemmirror.log"
}
