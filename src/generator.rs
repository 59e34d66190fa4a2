//! Workout assembly: pick a catalog variant that fits the requested
//! duration window and wrap it in a warm-up and cool-down ramp.

use rand::Rng;
use tracing::debug;

use crate::catalog::{PatternSet, Variant};
use crate::error::{EngineError, Result};
use crate::models::{sum_minutes, sum_phase_minutes, Phase, Step, Workout, WorkoutRequest};
use crate::tss::{percent_of_ftp, TssCalculator};

pub const WARMUP_MINUTES: u32 = 10;
pub const COOLDOWN_MINUTES: u32 = 10;

/// Generate a workout from the bundled catalog using the thread-local RNG.
///
/// Returns `None` when no variant fits the requested window. Pass the
/// previous workout's signature to avoid handing out the same variant twice
/// in a row.
pub fn generate_workout(request: &WorkoutRequest, previous_signature: Option<&str>) -> Option<Workout> {
    generate_workout_with_rng(
        PatternSet::bundled(),
        request,
        previous_signature,
        &mut rand::thread_rng(),
    )
}

/// Generate a workout from `patterns`, drawing from `rng` when more than one
/// variant fits.
pub fn generate_workout_with_rng<R: Rng + ?Sized>(
    patterns: &PatternSet,
    request: &WorkoutRequest,
    previous_signature: Option<&str>,
    rng: &mut R,
) -> Option<Workout> {
    let bounds = request.duration_range.bounds();
    let cap = bounds.cap();
    let padding = WARMUP_MINUTES + COOLDOWN_MINUTES;

    if cap <= padding {
        debug!(cap, padding, "Duration window too narrow for structured content");
        return None;
    }

    let fitting = patterns.fitting_variants(request.workout_type, &bounds, padding);
    let (selected, hint) = match fitting.as_slice() {
        [] => {
            debug!(
                workout_type = %request.workout_type,
                range = %request.duration_range,
                "No variant fits the requested window"
            );
            return None;
        }
        [only] => {
            let hint = (previous_signature == Some(only.signature().as_str())).then(|| {
                "Only one workout fits this duration, so the previous workout is repeated. \
                 Pick another duration for variety."
                    .to_string()
            });
            (*only, hint)
        }
        candidates => (pick_variant(candidates, previous_signature, rng), None),
    };

    let steps = assemble_steps(selected, request.ftp);
    let total_minutes = sum_minutes(&steps);
    if !bounds.contains(total_minutes) {
        debug!(total_minutes, min = bounds.min, cap, "Assembled workout outside window");
        return None;
    }

    let workout = Workout {
        title: format!("{} — {}'", request.workout_type.display_name(), total_minutes),
        workout_type: request.workout_type,
        ftp: request.ftp,
        total_minutes,
        work_minutes: sum_phase_minutes(&steps, Phase::Work),
        recovery_minutes: sum_phase_minutes(&steps, Phase::Recovery),
        avg_intensity: TssCalculator::average_power(&steps),
        signature: selected.signature(),
        steps,
        hint,
        bias_pct: None,
        tss: None,
    };

    debug!(
        title = %workout.title,
        candidates = fitting.len(),
        signature = %workout.signature,
        "Workout generated"
    );

    Some(workout)
}

/// Validate `request` and generate, turning "nothing fits" into a retryable error
pub fn try_generate_workout<R: Rng + ?Sized>(
    patterns: &PatternSet,
    request: &WorkoutRequest,
    previous_signature: Option<&str>,
    rng: &mut R,
) -> Result<Workout> {
    request.validate()?;
    generate_workout_with_rng(patterns, request, previous_signature, rng).ok_or(
        EngineError::NoFittingVariant {
            workout_type: request.workout_type,
            range: request.duration_range,
        },
    )
}

/// Uniform pick among `candidates`, stepping to the next one (wrapping)
/// when the draw repeats the previous signature
fn pick_variant<'a, R: Rng + ?Sized>(
    candidates: &[&'a Variant],
    previous_signature: Option<&str>,
    rng: &mut R,
) -> &'a Variant {
    let mut index = rng.gen_range(0..candidates.len());
    if previous_signature == Some(candidates[index].signature().as_str()) {
        index = (index + 1) % candidates.len();
    }
    candidates[index]
}

fn assemble_steps(variant: &Variant, ftp: u32) -> Vec<Step> {
    let warmup_low = percent_of_ftp(ftp, 50);
    let warmup_high = percent_of_ftp(ftp, 60);

    let mut steps = Vec::with_capacity(variant.blocks().len() + 2);
    steps.push(Step::ramp(WARMUP_MINUTES, warmup_low, warmup_high, "Warm-up", Phase::Warmup));
    steps.extend(
        variant
            .blocks()
            .iter()
            .map(|block| block.map_power(|pct| percent_of_ftp(ftp, pct))),
    );
    steps.push(Step::ramp(COOLDOWN_MINUTES, warmup_high, warmup_low, "Cool-down", Phase::Cooldown));
    steps
}
