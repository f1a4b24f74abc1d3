//! # Logging Utilities
//!
//! Logging infrastructure for Ferroscope using `tracing`.
//!
//! Standard output belongs to the JSON payloads the renderer reads, so
//! console logs always go to **stderr**. A log file can be added on top.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferroscope_utils::init_logging;
//!
//! // Keep the guard alive for as long as logs should reach the file
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter (e.g. `RUST_LOG=debug`, `RUST_LOG=ferroscope_core=trace`)
//! - `FERROSCOPE_LOG_FORMAT`: `json` or `pretty` (default: `pretty`)
//! - `FERROSCOPE_LOG_FILE`: Optional log file. A directory gets a dated file
//!   `YYYY-MM-DD-ferroscope.log` inside it.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use ferroscope_utils::{LogFormat, LogLevel, init_logging_with_level};
//!
//! // An explicit level (from `--log-level`) wins over RUST_LOG
//! let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Json)
//!     .expect("Failed to initialize logging");
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format
pub const LOG_FORMAT_VAR: &str = "FERROSCOPE_LOG_FORMAT";
/// Environment variable naming the log file
pub const LOG_FILE_VAR: &str = "FERROSCOPE_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Human-readable lines (default)
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default)
    Warn,
    /// Info level: one line per request
    Info,
    /// Debug level: classification decisions and recovered read failures
    Debug,
    /// Trace level: every emitted node
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Keeps the file writer flushing; logs stop reaching the file once dropped
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
    /// File receiving logs, if any
    pub log_file: Option<PathBuf>,
}

/// Initialize logging from the environment
///
/// Reads `RUST_LOG`, `FERROSCOPE_LOG_FORMAT` and `FERROSCOPE_LOG_FILE`.
/// Without `RUST_LOG` only warnings and errors are shown.
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `FERROSCOPE_LOG_FORMAT` is set to an unknown format
/// - The log file directory cannot be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    let format = match env::var(LOG_FORMAT_VAR) {
        Ok(value) => value.parse()?,
        Err(_) => LogFormat::default(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()));
    init(format, filter)
}

/// Initialize logging with an explicit level, ignoring `RUST_LOG`
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file
/// directory cannot be created.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    init(format, EnvFilter::new(Level::from(level).to_string()))
}

fn init(format: LogFormat, filter: EnvFilter) -> Result<LoggingGuard, LoggingError>
{
    let log_file = env::var_os(LOG_FILE_VAR).map(|raw| log_file_path(Path::new(&raw)));

    let mut layers: Vec<BoxedLayer> = vec![event_layer(format, io::stderr, true)];
    let mut file_guard = None;
    if let Some(path) = &log_file {
        let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        std::fs::create_dir_all(directory)?;
        let file_name = path.file_name().unwrap_or_default();
        // The date is already in the name when we picked it
        let appender = tracing_appender::rolling::never(directory, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(event_layer(format, writer, false));
        file_guard = Some(guard);
    }

    Registry::default()
        .with(layers.with_filter(filter))
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;

    Ok(LoggingGuard {
        _file: file_guard,
        log_file,
    })
}

/// One formatting layer writing to `writer`
fn event_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339());

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).boxed(),
        LogFormat::Json => layer.json().with_current_span(true).with_span_list(true).boxed(),
    }
}

/// Where file logs go: `raw` itself, or a dated file inside `raw` if it is a directory
fn log_file_path(raw: &Path) -> PathBuf
{
    if raw.is_dir() {
        let today = Utc::now().format("%Y-%m-%d");
        raw.join(format!("{today}-ferroscope.log"))
    } else {
        raw.to_path_buf()
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Unknown log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Unknown log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// A global subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        let err = LogLevel::from_str("loud").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_log_file_path_for_directory_is_dated()
    {
        let dir = env::temp_dir();
        let path = log_file_path(&dir);
        assert_eq!(path.parent(), Some(dir.as_path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("-ferroscope.log"));
        assert_eq!(name.len(), "YYYY-MM-DD-ferroscope.log".len());
    }

    #[test]
    fn test_log_file_path_for_file_is_unchanged()
    {
        let path = Path::new("/nonexistent/ferroscope/run.log");
        assert_eq!(log_file_path(path), path.to_path_buf());
    }
}
