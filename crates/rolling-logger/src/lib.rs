//! Rolling Logger
//!
//! Installs a global `tracing` subscriber writing to a size-rotated log file
//! and keeps the most recent lines in memory for in-app display. `log`
//! records are bridged into the same subscriber.

mod writer;

use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub use writer::{active_path, rotated_path, LineBuffer, RollingWriter};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("logger already initialized: {0}")]
    Init(String),
}

#[derive(Debug, Clone, Copy)]
pub struct LoggerConfig {
    pub max_bytes: u64,
    pub max_files: usize,
    /// Lines kept in the in-memory circular buffer
    pub buffer_lines: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
        }
    }
}

/// Handle to the installed logger
#[derive(Clone)]
pub struct LogHandle {
    buffer: LineBuffer,
}

impl LogHandle {
    /// Recent log lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        self.buffer
            .lock()
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Initialize with default rotation settings
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<LogHandle, LoggerError> {
    init_logger_with(log_dir, app_name, LoggerConfig::default())
}

/// Initialize the global subscriber. Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    config: LoggerConfig,
) -> Result<LogHandle, LoggerError> {
    let writer = RollingWriter::open(
        log_dir.as_ref(),
        app_name,
        config.max_bytes,
        config.max_files,
        config.buffer_lines,
    )?;
    let handle = LogHandle { buffer: writer.buffer() };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(writer))
        .try_init()
        .map_err(|e| LoggerError::Init(e.to_string()))?;

    info(&format!("{} logging to {}", app_name, active_path(log_dir.as_ref(), app_name).display()));
    Ok(handle)
}

/// Log a message at info level
pub fn info(msg: &str) {
    log::info!("{}", msg);
}

/// Log a message at error level
pub fn error(msg: &str) {
    log::error!("{}", msg);
}
