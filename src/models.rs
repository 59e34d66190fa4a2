use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::duration::DurationRange;
use crate::error::{EngineError, Result};

/// Lowest FTP accepted from a generation request
pub const MIN_FTP: u32 = 50;

/// Highest FTP accepted from a generation request
pub const MAX_FTP: u32 = 500;

/// Workout categories offered by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Recovery,
    Endurance,
    Tempo,
    Threshold,
    Vo2max,
    Anaerobic,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 6] = [
        WorkoutType::Recovery,
        WorkoutType::Endurance,
        WorkoutType::Tempo,
        WorkoutType::Threshold,
        WorkoutType::Vo2max,
        WorkoutType::Anaerobic,
    ];

    /// Key used in pattern payloads and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Recovery => "recovery",
            WorkoutType::Endurance => "endurance",
            WorkoutType::Tempo => "tempo",
            WorkoutType::Threshold => "threshold",
            WorkoutType::Vo2max => "vo2max",
            WorkoutType::Anaerobic => "anaerobic",
        }
    }

    /// Capitalized name used in workout titles
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutType::Recovery => "Recovery",
            WorkoutType::Endurance => "Endurance",
            WorkoutType::Tempo => "Tempo",
            WorkoutType::Threshold => "Threshold",
            WorkoutType::Vo2max => "VO2max",
            WorkoutType::Anaerobic => "Anaerobic",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recovery" => Ok(WorkoutType::Recovery),
            "endurance" => Ok(WorkoutType::Endurance),
            "tempo" => Ok(WorkoutType::Tempo),
            "threshold" => Ok(WorkoutType::Threshold),
            "vo2max" | "vo2" => Ok(WorkoutType::Vo2max),
            "anaerobic" => Ok(WorkoutType::Anaerobic),
            _ => Err(format!("Unknown workout type: {}", s)),
        }
    }
}

/// Training phase a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Warmup,
    Work,
    Recovery,
    Cooldown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Warmup => "warmup",
            Phase::Work => "work",
            Phase::Recovery => "recovery",
            Phase::Cooldown => "cooldown",
        }
    }

    /// Ramps only make sense while warming up or cooling down
    pub fn allows_ramp(&self) -> bool {
        matches!(self, Phase::Warmup | Phase::Cooldown)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "warmup" => Ok(Phase::Warmup),
            "work" => Ok(Phase::Work),
            "recovery" => Ok(Phase::Recovery),
            "cooldown" => Ok(Phase::Cooldown),
            _ => Err(format!("Unknown phase: {}", s)),
        }
    }
}

/// A single block of a structured workout.
///
/// Power values are watts on a generated workout and %FTP inside the
/// pattern catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Step {
    /// Constant power for the whole step
    Steady {
        minutes: u32,
        intensity: u32,
        description: String,
        phase: Phase,
    },
    /// Linear power change from `from` to `to`; descending ramps are valid
    Ramp {
        minutes: u32,
        from: u32,
        to: u32,
        description: String,
        phase: Phase,
    },
}

impl Step {
    pub fn steady(minutes: u32, intensity: u32, description: impl Into<String>, phase: Phase) -> Self {
        Step::Steady {
            minutes,
            intensity,
            description: description.into(),
            phase,
        }
    }

    pub fn ramp(minutes: u32, from: u32, to: u32, description: impl Into<String>, phase: Phase) -> Self {
        Step::Ramp {
            minutes,
            from,
            to,
            description: description.into(),
            phase,
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            Step::Steady { minutes, .. } | Step::Ramp { minutes, .. } => *minutes,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Step::Steady { phase, .. } | Step::Ramp { phase, .. } => *phase,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Step::Steady { description, .. } | Step::Ramp { description, .. } => description,
        }
    }

    pub fn is_ramp(&self) -> bool {
        matches!(self, Step::Ramp { .. })
    }

    /// Power that stands for the whole step: the intensity of a steady step,
    /// the midpoint of a ramp
    pub fn representative_power(&self) -> f64 {
        match self {
            Step::Steady { intensity, .. } => f64::from(*intensity),
            Step::Ramp { from, to, .. } => (f64::from(*from) + f64::from(*to)) / 2.0,
        }
    }

    /// Copy of this step with every power field passed through `f`.
    /// Ramp endpoints are mapped independently so the ramp keeps its shape.
    pub fn map_power<F>(&self, f: F) -> Step
    where
        F: Fn(u32) -> u32,
    {
        match self {
            Step::Steady {
                minutes,
                intensity,
                description,
                phase,
            } => Step::Steady {
                minutes: *minutes,
                intensity: f(*intensity),
                description: description.clone(),
                phase: *phase,
            },
            Step::Ramp {
                minutes,
                from,
                to,
                description,
                phase,
            } => Step::Ramp {
                minutes: *minutes,
                from: f(*from),
                to: f(*to),
                description: description.clone(),
                phase: *phase,
            },
        }
    }
}

/// A generated interval session.
///
/// The canonical value never carries `bias_pct` or `tss`; those are only
/// present on biased projections produced for display and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub title: String,

    pub workout_type: WorkoutType,

    /// Functional threshold power the workout was built for
    pub ftp: u32,

    pub steps: Vec<Step>,

    pub total_minutes: u32,

    pub work_minutes: u32,

    pub recovery_minutes: u32,

    /// Duration-weighted mean watts over all steps, ramps at their midpoint
    pub avg_intensity: u32,

    /// Signature of the selected catalog variant (core blocks only)
    pub signature: String,

    /// Advisory text when the request could not be fully honoured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_pct: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tss: Option<u32>,
}

impl Workout {
    /// Minutes spent in steps of the given phase
    pub fn phase_minutes(&self, phase: Phase) -> u32 {
        sum_phase_minutes(&self.steps, phase)
    }

    /// Whether this value is a biased projection rather than the canonical workout
    pub fn is_projection(&self) -> bool {
        self.bias_pct.is_some()
    }
}

/// Total minutes of `steps`, saturating at `u32::MAX`
pub(crate) fn sum_minutes(steps: &[Step]) -> u32 {
    steps
        .iter()
        .fold(0u32, |total, step| total.saturating_add(step.minutes()))
}

pub(crate) fn sum_phase_minutes(steps: &[Step], phase: Phase) -> u32 {
    steps
        .iter()
        .filter(|step| step.phase() == phase)
        .fold(0u32, |total, step| total.saturating_add(step.minutes()))
}

/// Generation request handed in by the surrounding application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRequest {
    pub ftp: u32,

    #[serde(rename = "type")]
    pub workout_type: WorkoutType,

    pub duration_range: DurationRange,
}

impl WorkoutRequest {
    pub fn new(ftp: u32, workout_type: WorkoutType, duration_range: DurationRange) -> Self {
        Self {
            ftp,
            workout_type,
            duration_range,
        }
    }

    /// Check the request against the accepted form ranges
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FTP..=MAX_FTP).contains(&self.ftp) {
            return Err(EngineError::Validation(format!(
                "FTP must be between {} and {} watts, got {}",
                MIN_FTP, MAX_FTP, self.ftp
            )));
        }
        Ok(())
    }
}
