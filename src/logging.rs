//! Logging setup for embedding processes.
//!
//! Dual output: a non-blocking log file plus stdout, filtered via
//! `RUST_LOG` (default `info`). The library itself only emits `tracing`
//! events; calling this is optional and belongs to whatever binary embeds
//! the crate.

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the non-blocking file writer alive.
///
/// Dropping the guard flushes and closes the log file, so the embedding
/// process must hold it for its lifetime.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

/// Initializes the global tracing subscriber.
///
/// Creates `log_dir` if needed and truncates a previous `log_file`.
/// May only be called once per process.
pub fn init_logging(log_dir: &str, log_file: &str) -> Result<LogGuard, io::Error> {
    fs::create_dir_all(log_dir)?;
    fs::write(Path::new(log_dir).join(log_file), "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .compact();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .compact();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Default log directory.
pub fn default_log_dir() -> &'static str {
    "logs"
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "fightfeed.log"
}
