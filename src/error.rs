//! Unified error hierarchy for trainforge
//!
//! Catalog and export failures keep their own types and convert into
//! [`EngineError`] at the library boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::duration::DurationRange;
use crate::export::ExportError;
use crate::models::WorkoutType;

/// Top-level error type for all trainforge operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// Pattern payload could not be used
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Rendering or writing an export failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// No catalog variant fits the requested category and duration
    #[error("No {workout_type} workout fits the {range} range")]
    NoFittingVariant {
        workout_type: WorkoutType,
        range: DurationRange,
    },

    /// Request outside the accepted ranges
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pattern file could not be read
    #[error("Could not read patterns from {path}: {source}")]
    PatternFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for trainforge operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// A retry with the same request may succeed, or a different range will
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::NoFittingVariant { .. } | EngineError::Io(_))
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::NoFittingVariant { .. } => ErrorSeverity::Info,
            EngineError::Validation(_) => ErrorSeverity::Warning,
            EngineError::Catalog(_) => ErrorSeverity::Warning,
            EngineError::PatternFile { .. } => ErrorSeverity::Warning,
            EngineError::Configuration(_) => ErrorSeverity::Error,
            EngineError::Export(_) | EngineError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            EngineError::NoFittingVariant { workout_type, range } => format!(
                "No {} workout fits {}. Try again or pick another duration.",
                workout_type.display_name(),
                range.label()
            ),
            EngineError::Catalog(_) => {
                "The workout pattern file is invalid; the built-in catalog will be used.".to_string()
            }
            EngineError::PatternFile { path, .. } => {
                format!("Could not read workout patterns from {}", path.display())
            }
            EngineError::Validation(reason) => reason.clone(),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}
