use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::bias::NEUTRAL_BIAS_PCT;
use crate::catalog::{load_or_bundled, CatalogLoad, PatternPayload};
use crate::error::EngineError;
use crate::export::DEFAULT_AUTHOR;
use crate::logging::LogConfig;
use crate::models::{MAX_FTP, MIN_FTP};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Defaults for workout generation
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Export preferences
    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Workout generation defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// FTP used when none is given on the command line
    pub default_ftp: u32,

    /// Bias applied to display and exports when none is given
    pub default_bias_pct: i32,

    /// Pattern payload replacing the bundled catalog
    pub patterns_path: Option<PathBuf>,
}

/// Export preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Author written into structured workout files
    pub author: String,

    /// Directory exports are written to
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            metadata: ConfigMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                created_at: now,
                updated_at: now,
            },
            generator: GeneratorSettings::default(),
            export: ExportSettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            default_ftp: 250,
            default_bias_pct: NEUTRAL_BIAS_PCT,
            patterns_path: None,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.as_ref().display()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        info!(path = %path.as_ref().display(), "Configuration saved");
        Ok(())
    }

    /// `~/.trainforge/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".trainforge")
            .join("config.toml")
    }

    /// Load the configuration for a run. An explicitly given file must load;
    /// the default location falls back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match explicit_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::load_or_default()),
        }
    }

    /// Load from the default location, falling back to defaults
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(&Self::default_config_path())
    }

    /// A missing file silently yields defaults; an unreadable or invalid one
    /// yields defaults with a warning on stderr
    pub fn load_or_default_from(config_path: &Path) -> Self {
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from_file(config_path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!(
                    "Warning: ignoring config file {}: {:#}",
                    config_path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Reject settings the generator cannot work with
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        if !(MIN_FTP..=MAX_FTP).contains(&self.generator.default_ftp) {
            return Err(EngineError::Configuration(format!(
                "default_ftp must be between {} and {} watts, got {}",
                MIN_FTP, MAX_FTP, self.generator.default_ftp
            )));
        }
        if self.generator.default_bias_pct < 0 {
            return Err(EngineError::Configuration(format!(
                "default_bias_pct must not be negative, got {}",
                self.generator.default_bias_pct
            )));
        }
        Ok(())
    }

    /// Pattern catalog to generate from: the configured payload when set,
    /// with fallback to the bundled catalog if that payload is invalid
    pub fn load_patterns(&self) -> std::result::Result<CatalogLoad, EngineError> {
        let Some(path) = &self.generator.patterns_path else {
            return Ok(CatalogLoad {
                payload: PatternPayload::bundled(),
                fallback_reason: None,
            });
        };

        let json = fs::read_to_string(path).map_err(|source| EngineError::PatternFile {
            path: path.clone(),
            source,
        })?;
        Ok(load_or_bundled(&json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BUNDLED_VERSION;
    use tempfile::TempDir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("default_ftp = 250"));
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.generator.default_ftp = 310;
        config.export.author = "Coach".to_string();
        config.save_to_file(&config_path).unwrap();

        let loaded = AppConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.generator.default_ftp, 310);
        assert_eq!(loaded.export.author, "Coach");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let toml_str = r#"
            [metadata]
            version = "0.1.0"
            created_at = "2024-01-01T00:00:00Z"
            updated_at = "2024-01-01T00:00:00Z"

            [generator]
            default_ftp = 200
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generator.default_ftp, 200);
        assert_eq!(config.generator.default_bias_pct, 100);
        assert_eq!(config.export.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_invalid_ftp_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.generator.default_ftp = 20;
        config.save_to_file(&config_path).unwrap();

        assert!(AppConfig::load_from_file(&config_path).is_err());
        // default location falls back instead of failing
        let fallback = AppConfig::load_or_default_from(&config_path);
        assert_eq!(fallback.generator.default_ftp, 250);
    }

    #[test]
    fn test_explicit_invalid_config_is_reported() {
        let temp_dir = TempDir::new().unwrap();

        let out_of_range = temp_dir.path().join("ftp.toml");
        let mut config = AppConfig::default();
        config.generator.default_ftp = 900;
        config.save_to_file(&out_of_range).unwrap();

        let err = AppConfig::load(Some(&out_of_range)).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Invalid configuration"));
        assert!(message.contains("default_ftp must be between 50 and 500"));

        let malformed = temp_dir.path().join("broken.toml");
        fs::write(&malformed, "[generator\ndefault_ftp = ").unwrap();
        let err = AppConfig::load(Some(&malformed)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse TOML configuration"));

        let missing = temp_dir.path().join("missing.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_missing_default_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default_from(&temp_dir.path().join("config.toml"));
        assert_eq!(config.generator, GeneratorSettings::default());
    }

    #[test]
    fn test_load_patterns_defaults_to_bundled() {
        let load = AppConfig::default().load_patterns().unwrap();
        assert!(!load.used_fallback());
        assert_eq!(load.payload.version, BUNDLED_VERSION);
    }

    #[test]
    fn test_load_patterns_falls_back_on_invalid_payload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("patterns.json");
        fs::write(&path, r#"{"version": "x", "patterns": {"tempo": []}}"#).unwrap();

        let mut config = AppConfig::default();
        config.generator.patterns_path = Some(path);

        let load = config.load_patterns().unwrap();
        assert!(load.used_fallback());
        assert_eq!(load.payload.version, BUNDLED_VERSION);
    }

    #[test]
    fn test_load_patterns_missing_file() {
        let mut config = AppConfig::default();
        config.generator.patterns_path = Some(PathBuf::from("/nonexistent/patterns.json"));
        assert!(matches!(
            config.load_patterns(),
            Err(EngineError::PatternFile { .. })
        ));
    }
}
