use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::bias::LoadSummary;
use crate::models::Workout;

pub mod json;
pub mod text;
pub mod zwo;

/// Author written into structured workout files when none is configured
pub const DEFAULT_AUTHOR: &str = "trainforge";

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Zwift-style structured XML
    Zwo,
    Json,
    Text,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Zwo, ExportFormat::Json, ExportFormat::Text];

    pub fn from_str(s: &str) -> Result<Self, ExportError> {
        match s.to_lowercase().as_str() {
            "zwo" | "xml" => Ok(ExportFormat::Zwo),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Zwo => "zwo",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Zwo => "application/xml",
            ExportFormat::Json => "application/json",
            ExportFormat::Text => "text/plain",
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<std::fmt::Error> for ExportError {
    fn from(err: std::fmt::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

/// A rendered export, ready for download or clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

impl ExportArtifact {
    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }
}

/// Workout title reduced to ASCII letters and digits
pub fn file_stem(title: &str) -> String {
    let stem: String = title.chars().filter(char::is_ascii_alphanumeric).collect();
    if stem.is_empty() {
        "workout".to_string()
    } else {
        stem
    }
}

/// File name for an export; the JSON form carries the bias it was rendered at
pub fn file_name(title: &str, format: ExportFormat, bias_pct: i32) -> String {
    let stem = file_stem(title);
    match format {
        ExportFormat::Json => format!("{}_bias{}.{}", stem, bias_pct, format.extension()),
        _ => format!("{}.{}", stem, format.extension()),
    }
}

/// Renders workouts into every export format from one load computation
pub struct ExportManager {
    author: String,
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR)
    }
}

impl ExportManager {
    pub fn new(author: impl Into<String>) -> Self {
        ExportManager {
            author: author.into(),
        }
    }

    /// Render one format
    pub fn export(
        &self,
        workout: &Workout,
        bias_pct: i32,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        let summary = LoadSummary::compute(workout, bias_pct);
        self.render(workout, &summary, format)
    }

    /// Render all three formats with a single TSS
    pub fn export_all(&self, workout: &Workout, bias_pct: i32) -> Result<Vec<ExportArtifact>, ExportError> {
        let summary = LoadSummary::compute(workout, bias_pct);
        ExportFormat::ALL
            .iter()
            .map(|format| self.render(workout, &summary, *format))
            .collect()
    }

    fn render(
        &self,
        workout: &Workout,
        summary: &LoadSummary,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        let content = match format {
            ExportFormat::Zwo => zwo::to_zwo_xml(workout, summary.bias_pct, summary.tss, &self.author)?,
            ExportFormat::Json => json::to_json(workout, summary.bias_pct, summary.tss)?,
            ExportFormat::Text => text::to_text(workout, summary.bias_pct, summary.tss)?,
        };

        Ok(ExportArtifact {
            format,
            filename: file_name(&workout.title, format, summary.bias_pct),
            mime_type: format.mime_type(),
            content,
        })
    }

    /// Write artifacts into `dir`, returning the written paths
    pub fn write_to_dir<P: AsRef<Path>>(
        &self,
        artifacts: &[ExportArtifact],
        dir: P,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let path = dir.join(&artifact.filename);
            fs::write(&path, artifact.as_bytes())?;
            info!(path = %path.display(), mime = artifact.mime_type, "Export written");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationRange;
    use crate::generator::generate_workout_with_rng;
    use crate::catalog::PatternSet;
    use crate::models::{WorkoutRequest, WorkoutType};
    use rand::rngs::mock::StepRng;
    use tempfile::TempDir;

    fn workout() -> Workout {
        generate_workout_with_rng(
            PatternSet::bundled(),
            &WorkoutRequest::new(250, WorkoutType::Threshold, DurationRange::Medium),
            None,
            &mut StepRng::new(0, 0),
        )
        .unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::from_str("XML").unwrap(), ExportFormat::Zwo);
        assert_eq!(ExportFormat::from_str("txt").unwrap(), ExportFormat::Text);
        assert!(matches!(
            ExportFormat::from_str("pdf"),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_stem("Threshold — 54'"), "Threshold54");
        assert_eq!(file_name("VO2max — 90'", ExportFormat::Zwo, 100), "VO2max90.zwo");
        assert_eq!(file_name("VO2max — 90'", ExportFormat::Json, 95), "VO2max90_bias95.json");
        assert_eq!(file_name("VO2max — 90'", ExportFormat::Text, 95), "VO2max90.txt");
        assert_eq!(file_stem("— '"), "workout");
    }

    #[test]
    fn test_export_all_produces_three_artifacts() {
        let artifacts = ExportManager::default().export_all(&workout(), 105).unwrap();
        let formats: Vec<_> = artifacts.iter().map(|a| a.format).collect();
        assert_eq!(formats, ExportFormat::ALL.to_vec());
        assert_eq!(artifacts[0].mime_type, "application/xml");
        assert_eq!(artifacts[1].mime_type, "application/json");
        assert_eq!(artifacts[2].mime_type, "text/plain");
        assert!(artifacts[1].filename.ends_with("_bias105.json"));
    }

    #[test]
    fn test_write_to_dir() {
        let manager = ExportManager::new("Coach");
        let artifacts = manager.export_all(&workout(), 100).unwrap();
        let dir = TempDir::new().unwrap();

        let paths = manager.write_to_dir(&artifacts, dir.path().join("exports")).unwrap();
        assert_eq!(paths.len(), 3);
        for (path, artifact) in paths.iter().zip(&artifacts) {
            assert_eq!(std::fs::read_to_string(path).unwrap(), artifact.content);
        }
    }
}
