//! Pattern catalog: the pre-authored interval variants per workout type.
//!
//! The bundled catalog is built once per process and never mutated. A
//! replacement catalog can be supplied as a JSON payload
//! (`{"version": ..., "patterns": {...}}`); payloads are validated step by
//! step and any failure falls back to the bundled catalog.

pub mod bundled;

pub use bundled::BUNDLED_VERSION;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::duration::{DurationBounds, GLOBAL_CAP_MINUTES};
use crate::models::{sum_minutes, Phase, Step, WorkoutType};
use crate::signature::make_signature;

/// Errors raised while loading a pattern payload
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Invalid pattern payload: {0}")]
    Malformed(String),

    #[error("Invalid pattern payload: unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Invalid pattern payload: missing category '{0}'")]
    MissingCategory(WorkoutType),

    #[error("Invalid pattern payload: category '{0}' has no variants")]
    EmptyCategory(WorkoutType),

    #[error("Invalid pattern payload: {category} variant {variant} has no steps")]
    EmptyVariant { category: WorkoutType, variant: usize },

    #[error("Invalid pattern payload: {category} variant {variant} step {step}: {reason}")]
    InvalidStep {
        category: WorkoutType,
        variant: usize,
        step: usize,
        reason: String,
    },

    #[error("Invalid pattern payload: {category} variants {first} and {second} are identical")]
    DuplicateVariant {
        category: WorkoutType,
        first: usize,
        second: usize,
    },
}

/// One alternative block sequence for a workout type.
/// Power values are %FTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Variant {
    blocks: Vec<Step>,
}

impl Variant {
    pub fn new(blocks: Vec<Step>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Step] {
        &self.blocks
    }

    /// Sum of block minutes, saturating at `u32::MAX`
    pub fn total_minutes(&self) -> u32 {
        sum_minutes(&self.blocks)
    }

    pub fn signature(&self) -> String {
        make_signature(&self.blocks)
    }
}

/// Variants for every workout type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PatternSet {
    categories: BTreeMap<WorkoutType, Vec<Variant>>,
}

impl PatternSet {
    pub fn new(categories: BTreeMap<WorkoutType, Vec<Variant>>) -> Self {
        Self { categories }
    }

    /// The catalog shipped with the crate
    pub fn bundled() -> &'static PatternSet {
        static BUNDLED: OnceLock<PatternSet> = OnceLock::new();
        BUNDLED.get_or_init(bundled::build)
    }

    pub fn variants(&self, workout_type: WorkoutType) -> &[Variant] {
        self.categories
            .get(&workout_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Variants whose total, padded by warm-up and cool-down, lands inside `bounds`
    pub fn fitting_variants(
        &self,
        workout_type: WorkoutType,
        bounds: &DurationBounds,
        padding_minutes: u32,
    ) -> Vec<&Variant> {
        self.variants(workout_type)
            .iter()
            .filter(|variant| bounds.contains(padding_minutes.saturating_add(variant.total_minutes())))
            .collect()
    }

    pub fn categories(&self) -> impl Iterator<Item = (WorkoutType, &[Variant])> {
        self.categories
            .iter()
            .map(|(workout_type, variants)| (*workout_type, variants.as_slice()))
    }

    pub fn variant_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Structural checks shared by payload loading and the bundled catalog
    pub fn validate(&self) -> Result<(), CatalogError> {
        for workout_type in WorkoutType::ALL {
            let variants = self
                .categories
                .get(&workout_type)
                .ok_or(CatalogError::MissingCategory(workout_type))?;

            if variants.is_empty() {
                return Err(CatalogError::EmptyCategory(workout_type));
            }

            let mut seen: HashMap<String, usize> = HashMap::new();
            for (index, variant) in variants.iter().enumerate() {
                if variant.blocks.is_empty() {
                    return Err(CatalogError::EmptyVariant {
                        category: workout_type,
                        variant: index,
                    });
                }

                for (step_index, step) in variant.blocks.iter().enumerate() {
                    check_step(step).map_err(|reason| CatalogError::InvalidStep {
                        category: workout_type,
                        variant: index,
                        step: step_index,
                        reason,
                    })?;
                }

                if let Some(first) = seen.insert(variant.signature(), index) {
                    return Err(CatalogError::DuplicateVariant {
                        category: workout_type,
                        first,
                        second: index,
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_step(step: &Step) -> Result<(), String> {
    if step.minutes() == 0 {
        return Err("minutes must be positive".to_string());
    }
    if step.minutes() > GLOBAL_CAP_MINUTES {
        return Err(format!(
            "minutes must not exceed {}, got {}",
            GLOBAL_CAP_MINUTES,
            step.minutes()
        ));
    }
    if step.is_ramp() && !step.phase().allows_ramp() {
        return Err(format!("ramp step cannot use phase '{}'", step.phase()));
    }
    Ok(())
}

/// A validated catalog together with its version tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternPayload {
    pub version: String,
    pub patterns: PatternSet,
}

impl PatternPayload {
    /// Payload wrapping the bundled catalog
    pub fn bundled() -> Self {
        Self {
            version: bundled::BUNDLED_VERSION.to_string(),
            patterns: PatternSet::bundled().clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    version: String,
    patterns: BTreeMap<String, Vec<Vec<RawStep>>>,
}

/// Step as it appears on the wire. `kind` is optional so that older
/// payloads without the tag still load.
#[derive(Debug, Deserialize)]
struct RawStep {
    kind: Option<String>,
    minutes: Option<i64>,
    intensity: Option<i64>,
    from: Option<i64>,
    to: Option<i64>,
    description: Option<String>,
    phase: Option<String>,
}

impl RawStep {
    fn into_step(self) -> Result<Step, String> {
        let minutes = self.minutes.ok_or("missing field 'minutes'")?;
        if minutes <= 0 {
            return Err(format!("minutes must be positive, got {}", minutes));
        }
        let minutes = u32::try_from(minutes).map_err(|_| format!("minutes out of range: {}", minutes))?;

        let description = self.description.ok_or("missing field 'description'")?;
        let phase: Phase = self
            .phase
            .ok_or("missing field 'phase'")?
            .parse()?;

        let is_ramp = match self.kind.as_deref() {
            Some("ramp") => true,
            Some("steady") => false,
            Some(other) => return Err(format!("unknown step kind '{}'", other)),
            None => match (self.intensity, self.from, self.to) {
                (None, Some(_), Some(_)) => true,
                (Some(_), None, None) => false,
                _ => return Err("untagged step is neither steady nor ramp".to_string()),
            },
        };

        if is_ramp {
            let from = power_field(self.from, "from")?;
            let to = power_field(self.to, "to")?;
            if !phase.allows_ramp() {
                return Err(format!("ramp step cannot use phase '{}'", phase));
            }
            Ok(Step::ramp(minutes, from, to, description, phase))
        } else {
            let intensity = power_field(self.intensity, "intensity")?;
            Ok(Step::steady(minutes, intensity, description, phase))
        }
    }
}

fn power_field(value: Option<i64>, name: &str) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("missing field '{}'", name))?;
    u32::try_from(value).map_err(|_| format!("{} must be a non-negative integer, got {}", name, value))
}

/// Parse and validate a JSON pattern payload
pub fn parse_pattern_payload(json: &str) -> Result<PatternPayload, CatalogError> {
    let raw: RawPayload =
        serde_json::from_str(json).map_err(|err| CatalogError::Malformed(err.to_string()))?;

    if raw.version.trim().is_empty() {
        return Err(CatalogError::Malformed("version must not be empty".to_string()));
    }

    let mut categories = BTreeMap::new();
    for (key, raw_variants) in raw.patterns {
        let workout_type: WorkoutType = key
            .parse()
            .map_err(|_| CatalogError::UnknownCategory(key.clone()))?;

        let mut variants = Vec::with_capacity(raw_variants.len());
        for (variant_index, raw_steps) in raw_variants.into_iter().enumerate() {
            let blocks = raw_steps
                .into_iter()
                .enumerate()
                .map(|(step_index, raw_step)| {
                    raw_step.into_step().map_err(|reason| CatalogError::InvalidStep {
                        category: workout_type,
                        variant: variant_index,
                        step: step_index,
                        reason,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            variants.push(Variant::new(blocks));
        }
        categories.insert(workout_type, variants);
    }

    let patterns = PatternSet::new(categories);
    patterns.validate()?;

    debug!(
        version = %raw.version,
        variants = patterns.variant_count(),
        "Pattern payload loaded"
    );

    Ok(PatternPayload {
        version: raw.version,
        patterns,
    })
}

/// Outcome of loading a payload with fallback
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub payload: PatternPayload,
    /// Set when the supplied payload was rejected and the bundled catalog is in use
    pub fallback_reason: Option<CatalogError>,
}

impl CatalogLoad {
    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Load a payload, falling back to the bundled catalog when it is invalid
pub fn load_or_bundled(json: &str) -> CatalogLoad {
    match parse_pattern_payload(json) {
        Ok(payload) => CatalogLoad {
            payload,
            fallback_reason: None,
        },
        Err(err) => {
            warn!(error = %err, "Pattern payload rejected, using bundled catalog");
            CatalogLoad {
                payload: PatternPayload::bundled(),
                fallback_reason: Some(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationRange;

    fn payload_with(category_json: &str) -> String {
        let others: Vec<String> = WorkoutType::ALL
            .iter()
            .filter(|t| **t != WorkoutType::Tempo)
            .map(|t| {
                format!(
                    r#""{}": [[{{"kind": "steady", "minutes": 20, "intensity": 60, "description": "Ride", "phase": "work"}}]]"#,
                    t
                )
            })
            .collect();
        format!(
            r#"{{"version": "test-1", "patterns": {{{}, "tempo": {}}}}}"#,
            others.join(", "),
            category_json
        )
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let patterns = PatternSet::bundled();
        assert!(patterns.validate().is_ok());
        for workout_type in WorkoutType::ALL {
            assert!(!patterns.variants(workout_type).is_empty());
        }
    }

    #[test]
    fn test_bundled_catalog_survives_its_own_payload_format() {
        let json = PatternPayload::bundled().to_json().unwrap();
        let parsed = parse_pattern_payload(&json).unwrap();
        assert_eq!(parsed.version, bundled::BUNDLED_VERSION);
        assert_eq!(&parsed.patterns, PatternSet::bundled());
    }

    #[test]
    fn test_parse_valid_payload() {
        let json = payload_with(
            r#"[[{"kind": "steady", "minutes": 30, "intensity": 85, "description": "Tempo", "phase": "work"}]]"#,
        );
        let payload = parse_pattern_payload(&json).unwrap();
        assert_eq!(payload.version, "test-1");
        assert_eq!(payload.patterns.variants(WorkoutType::Tempo)[0].total_minutes(), 30);
    }

    #[test]
    fn test_legacy_untagged_steps() {
        let json = payload_with(
            r#"[[{"minutes": 5, "from": 50, "to": 70, "description": "Build", "phase": "warmup"},
                 {"minutes": 30, "intensity": 85, "description": "Tempo", "phase": "work"}]]"#,
        );
        let payload = parse_pattern_payload(&json).unwrap();
        let blocks = payload.patterns.variants(WorkoutType::Tempo)[0].blocks();
        assert!(blocks[0].is_ramp());
        assert_eq!(blocks[1], Step::steady(30, 85, "Tempo", Phase::Work));
    }

    #[test]
    fn test_ambiguous_untagged_step_is_rejected() {
        let json = payload_with(
            r#"[[{"minutes": 5, "intensity": 80, "from": 50, "to": 70, "description": "?", "phase": "warmup"}]]"#,
        );
        assert!(matches!(
            parse_pattern_payload(&json),
            Err(CatalogError::InvalidStep { .. })
        ));
    }

    #[test]
    fn test_non_positive_minutes_rejected() {
        for minutes in ["0", "-5"] {
            let json = payload_with(&format!(
                r#"[[{{"kind": "steady", "minutes": {}, "intensity": 85, "description": "Tempo", "phase": "work"}}]]"#,
                minutes
            ));
            let err = parse_pattern_payload(&json).unwrap_err();
            assert!(err.to_string().starts_with("Invalid pattern payload"));
            assert!(err.to_string().contains("minutes must be positive"));
        }
    }

    #[test]
    fn test_oversized_minutes_rejected() {
        let json = payload_with(
            r#"[[{"kind": "steady", "minutes": 4294967295, "intensity": 85, "description": "Tempo", "phase": "work"},
                 {"kind": "steady", "minutes": 42, "intensity": 85, "description": "Tempo", "phase": "work"}]]"#,
        );
        let err = parse_pattern_payload(&json).unwrap_err();
        assert!(err.to_string().starts_with("Invalid pattern payload"));
        assert!(err.to_string().contains("minutes must not exceed 240"));

        let load = load_or_bundled(&json);
        assert!(load.used_fallback());
    }

    #[test]
    fn test_overflowing_variant_never_fits() {
        let huge = Variant::new(vec![
            Step::steady(u32::MAX, 85, "Tempo", Phase::Work),
            Step::steady(42, 85, "Tempo", Phase::Work),
        ]);
        assert_eq!(huge.total_minutes(), u32::MAX);

        let mut categories = BTreeMap::new();
        categories.insert(WorkoutType::Tempo, vec![huge]);
        let set = PatternSet::new(categories);
        for range in DurationRange::ALL {
            assert!(set
                .fitting_variants(WorkoutType::Tempo, &range.bounds(), 20)
                .is_empty());
        }
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = payload_with(r#"[[{"kind": "steady", "minutes": 20, "description": "Tempo", "phase": "work"}]]"#);
        let err = parse_pattern_payload(&json).unwrap_err();
        assert!(err.to_string().contains("missing field 'intensity'"));
    }

    #[test]
    fn test_ramp_in_work_phase_rejected() {
        let json = payload_with(
            r#"[[{"kind": "ramp", "minutes": 20, "from": 80, "to": 90, "description": "Tempo", "phase": "work"}]]"#,
        );
        let err = parse_pattern_payload(&json).unwrap_err();
        assert!(err.to_string().contains("ramp step cannot use phase 'work'"));
    }

    #[test]
    fn test_negative_power_rejected() {
        let json = payload_with(
            r#"[[{"kind": "steady", "minutes": 20, "intensity": -10, "description": "Tempo", "phase": "work"}]]"#,
        );
        assert!(parse_pattern_payload(&json).is_err());
    }

    #[test]
    fn test_duplicate_variants_rejected() {
        let step = r#"{"kind": "steady", "minutes": 30, "intensity": 85, "description": "Tempo", "phase": "work"}"#;
        let json = payload_with(&format!("[[{}], [{}]]", step, step));
        assert_eq!(
            parse_pattern_payload(&json).unwrap_err(),
            CatalogError::DuplicateVariant {
                category: WorkoutType::Tempo,
                first: 0,
                second: 1,
            }
        );
    }

    #[test]
    fn test_top_level_shape_errors() {
        for json in [
            "not json",
            r#"{"patterns": {}}"#,
            r#"{"version": "", "patterns": {}}"#,
            r#"{"version": "1", "patterns": []}"#,
        ] {
            let err = parse_pattern_payload(json).unwrap_err();
            assert!(err.to_string().starts_with("Invalid pattern payload"), "{}", err);
        }

        let err = parse_pattern_payload(r#"{"version": "1", "patterns": {}}"#).unwrap_err();
        assert_eq!(err, CatalogError::MissingCategory(WorkoutType::Recovery));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let json = payload_with("[]").replace("\"tempo\": []", "\"sprint\": []");
        assert_eq!(
            parse_pattern_payload(&json).unwrap_err(),
            CatalogError::UnknownCategory("sprint".to_string())
        );
    }

    #[test]
    fn test_load_or_bundled_falls_back() {
        let load = load_or_bundled(r#"{"version": "broken"}"#);
        assert!(load.used_fallback());
        assert_eq!(load.payload.version, bundled::BUNDLED_VERSION);
        assert_eq!(&load.payload.patterns, PatternSet::bundled());
    }

    #[test]
    fn test_fitting_variants_respects_bounds() {
        let patterns = PatternSet::bundled();
        let bounds = DurationRange::Short.bounds();
        for variant in patterns.fitting_variants(WorkoutType::Threshold, &bounds, 20) {
            assert!(bounds.contains(variant.total_minutes() + 20));
        }
    }
}
