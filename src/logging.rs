//! Structured logging for trainforge
//!
//! Console output goes to stderr so exports piped from stdout stay clean.
//! An optional JSON log file rotates daily.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{EngineError, ErrorSeverity};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: LogLevel,

    /// Output format (pretty, json, compact)
    pub format: LogFormat,

    /// Log file path (None for console only)
    pub file_path: Option<PathBuf>,

    /// Rotate the log file daily
    pub rotation: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            file_path: None,
            rotation: true,
        }
    }
}

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }

    pub fn to_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Raise the level by `-v` count: 1 → info, 2 → debug, 3+ → trace.
    /// Never lowers a level that is already more verbose.
    pub fn with_verbosity(self, verbose: u8) -> LogLevel {
        let requested = match verbose {
            0 => return self,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        };
        self.max(requested)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format with colors
    Pretty,
    /// JSON lines
    Json,
    /// Single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Filter directive used when `RUST_LOG` is not set
pub fn default_directive(level: LogLevel) -> String {
    format!("trainforge={}", level.to_filter())
}

/// Initialize the global subscriber
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.level)));

    let console_layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(console_layer);

    if let Some(file_path) = &config.file_path {
        let directory = file_path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(directory)?;

        if config.rotation {
            let file_name = file_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("trainforge.log");
            let file_appender = tracing_appender::rolling::daily(directory, file_name);

            let file_layer = fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_target(true);
            subscriber.with(file_layer).try_init()?;
        } else {
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;

            let file_layer = fmt::layer().json().with_writer(file).with_target(true);
            subscriber.with(file_layer).try_init()?;
        }
    } else {
        subscriber.try_init()?;
    }

    tracing::debug!(
        level = ?config.level,
        format = ?config.format,
        file = ?config.file_path,
        "Logging initialized"
    );

    Ok(())
}

/// Log an engine error at the level its severity maps to
pub fn log_error(err: &EngineError) {
    match err.severity() {
        ErrorSeverity::Error => tracing::error!(error = %err, "Operation failed"),
        ErrorSeverity::Warning => tracing::warn!(error = %err, "Operation failed"),
        ErrorSeverity::Info => tracing::info!(error = %err, "Operation failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(LogLevel::Warn.with_verbosity(0), LogLevel::Warn);
        assert_eq!(LogLevel::Warn.with_verbosity(1), LogLevel::Info);
        assert_eq!(LogLevel::Warn.with_verbosity(2), LogLevel::Debug);
        assert_eq!(LogLevel::Warn.with_verbosity(7), LogLevel::Trace);
        assert_eq!(LogLevel::Trace.with_verbosity(1), LogLevel::Trace);
    }

    #[test]
    fn test_default_directive_targets_crate() {
        assert_eq!(default_directive(LogLevel::Debug), "trainforge=debug");
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: LogConfig = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.rotation);
    }
}
