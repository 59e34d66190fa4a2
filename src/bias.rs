//! Percentage scaling of planned wattage.
//!
//! Bias never touches the canonical workout. Every consumer (the terminal
//! view and all three exporters) goes through [`bias_steps`] before
//! computing averages, NP, TSS or zones, so the numbers they report agree.

use serde::{Deserialize, Serialize};

use crate::models::{sum_minutes, Step, Workout};
use crate::tss::{round_watts, TssCalculator};
use crate::zones::{Zone, ZoneCalculator};

/// Bias that leaves a workout unchanged
pub const NEUTRAL_BIAS_PCT: i32 = 100;

/// `max(0, round(watts · bias_pct / 100))`
pub fn apply_bias(watts: i64, bias_pct: i32) -> u32 {
    round_watts(watts as f64 * f64::from(bias_pct) / 100.0)
}

/// Biased copy of a step; ramp endpoints are scaled independently
pub fn bias_step(step: &Step, bias_pct: i32) -> Step {
    step.map_power(|watts| apply_bias(i64::from(watts), bias_pct))
}

pub fn bias_steps(steps: &[Step], bias_pct: i32) -> Vec<Step> {
    steps.iter().map(|step| bias_step(step, bias_pct)).collect()
}

/// Numbers shown for a workout at a given bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub bias_pct: i32,
    pub total_minutes: u32,
    pub avg_intensity: u32,
    pub normalized_power: u32,
    pub tss: u32,
    pub zone: Zone,
}

impl LoadSummary {
    pub fn compute(workout: &Workout, bias_pct: i32) -> Self {
        let steps = bias_steps(&workout.steps, bias_pct);
        Self::from_biased_steps(&steps, workout.ftp, bias_pct)
    }

    fn from_biased_steps(steps: &[Step], ftp: u32, bias_pct: i32) -> Self {
        let total_minutes = sum_minutes(steps);
        let normalized_power = TssCalculator::normalized_power(steps);

        Self {
            bias_pct,
            total_minutes,
            avg_intensity: TssCalculator::average_power(steps),
            normalized_power,
            tss: TssCalculator::training_stress_score(total_minutes, normalized_power, ftp),
            zone: ZoneCalculator::predominant_zone(steps, ftp),
        }
    }

    pub fn intensity_factor(&self, ftp: u32) -> f64 {
        TssCalculator::intensity_factor(self.normalized_power, ftp)
    }
}

/// Biased projection of a workout: scaled steps, recomputed average,
/// `bias_pct` and `tss` filled in. The input is left untouched.
pub fn biased_workout(workout: &Workout, bias_pct: i32) -> Workout {
    let steps = bias_steps(&workout.steps, bias_pct);
    let summary = LoadSummary::from_biased_steps(&steps, workout.ftp, bias_pct);

    Workout {
        steps,
        avg_intensity: summary.avg_intensity,
        bias_pct: Some(bias_pct),
        tss: Some(summary.tss),
        ..workout.clone()
    }
}
