//! Structured workout generation: a catalog of %FTP interval patterns,
//! duration fitting with anti-repeat selection, training-load metrics, and
//! `.zwo`/JSON/text exports that agree on their numbers.

pub mod bias;
pub mod catalog;
pub mod config;
pub mod duration;
pub mod error;
pub mod export;
pub mod generator;
pub mod logging;
pub mod models;
pub mod signature;
pub mod tss;
pub mod zones;

// Re-export commonly used types for convenience
pub use bias::{apply_bias, biased_workout, LoadSummary};
pub use catalog::{load_or_bundled, parse_pattern_payload, CatalogError, PatternPayload, PatternSet};
pub use duration::DurationRange;
pub use error::{EngineError, Result};
pub use export::{ExportArtifact, ExportFormat, ExportManager};
pub use generator::{generate_workout, generate_workout_with_rng, try_generate_workout};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use signature::make_signature;
pub use tss::TssCalculator;
pub use zones::{Zone, ZoneCalculator};
