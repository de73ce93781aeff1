//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the configuration is loaded.

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Where the log level comes from when both a level and `RUST_LOG` exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSource {
    /// The given level wins; `RUST_LOG` only covers an invalid level.
    /// Used when the level came from `-v` flags.
    Explicit,
    /// `RUST_LOG` wins; the given level is the fallback.
    /// Used when the level came from the config file.
    Configured,
}

/// Build the filter for `level`, consulting `rust_log` according to `source`.
///
/// `rust_log` is passed in rather than read here so the precedence rules can
/// be tested without touching the process environment.
pub fn build_filter(
    level: &str,
    source: LevelSource,
    rust_log: Option<&str>,
) -> Result<EnvFilter, AppError> {
    let from_env = || {
        rust_log
            .ok_or_else(|| "RUST_LOG not set".to_string())
            .and_then(|v| EnvFilter::try_new(v).map_err(|e| e.to_string()))
    };
    match source {
        LevelSource::Explicit => EnvFilter::try_new(level).or_else(|level_err| {
            from_env().map_err(|env_err| {
                AppError::Logger(format!(
                    "invalid log level '{level}': {level_err}; RUST_LOG fallback failed: {env_err}"
                ))
            })
        }),
        LevelSource::Configured => from_env()
            .or_else(|_| EnvFilter::try_new(level))
            .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}"))),
    }
}

/// Initialise the global tracing subscriber.
///
/// Output goes to `log_file` (append mode) when given, otherwise stderr.
pub fn init(level: &str, source: LevelSource, log_file: Option<&Path>) -> Result<(), AppError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(level, source, rust_log.as_deref())?;

    let writer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AppError::Logger(format!("failed to open log file '{}': {e}", path.display()))
                })?;
            BoxMakeWriter::new(file)
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

/// Parse a plain level name (`off`, `error` ... `trace`, any case).
///
/// Config resolution uses this to reject a bad `log_level` before the
/// logger is initialised. Empty input is rejected even though tracing would
/// read it as `error`.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.trim().is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}
