use std::fmt::Write;

use super::ExportError;
use crate::bias::biased_workout;
use crate::models::{Step, Workout};

/// Plain-text rendering for the clipboard: header, one numbered line per
/// biased step, and a totals footer.
pub fn to_text(workout: &Workout, bias_pct: i32, tss: u32) -> Result<String, ExportError> {
    let projection = biased_workout(workout, bias_pct);
    let mut out = String::new();

    writeln!(
        out,
        "{} • FTP: {} W • Bias: {}% • TSS: {}",
        projection.title, projection.ftp, bias_pct, tss
    )?;
    writeln!(out)?;

    for (index, step) in projection.steps.iter().enumerate() {
        writeln!(out, "{}. {}", index + 1, step_line(step))?;
    }

    writeln!(out)?;
    write!(
        out,
        "Total: {}' • Avg: {} W • TSS: {}",
        projection.total_minutes, projection.avg_intensity, tss
    )?;

    Ok(out)
}

fn step_line(step: &Step) -> String {
    let power = match step {
        Step::Ramp { from, to, .. } => format!("ramp {}→{} W", from, to),
        Step::Steady { intensity, .. } => format!("{} W", intensity),
    };
    format!("{}' — {} — {}", step.minutes(), power, step.description())
}
