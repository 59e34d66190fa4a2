use super::ExportError;
use crate::bias::biased_workout;
use crate::models::Workout;

/// Export the biased projection of a workout as pretty-printed JSON.
///
/// `tss` overrides the projection's own value so every export of one
/// render shares a single figure.
pub fn to_json(workout: &Workout, bias_pct: i32, tss: u32) -> Result<String, ExportError> {
    let mut projection = biased_workout(workout, bias_pct);
    projection.tss = Some(tss);

    let json_data = serde_json::to_string_pretty(&projection)?;
    Ok(json_data)
}

/// Parse a workout previously written by [`to_json`]
pub fn from_json(data: &str) -> Result<Workout, ExportError> {
    let workout = serde_json::from_str(data)?;
    Ok(workout)
}
