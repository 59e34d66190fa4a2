use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::bias::bias_steps;
use crate::models::{Phase, Step, Workout};

use super::ExportError;

/// Power ratio bounds accepted by trainer apps
const MIN_POWER_RATIO: f64 = 0.30;
const MAX_POWER_RATIO: f64 = 1.60;

impl From<quick_xml::Error> for ExportError {
    fn from(err: quick_xml::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

/// Render a workout as a `.zwo` structured workout at the given bias
pub fn to_zwo_xml(workout: &Workout, bias_pct: i32, tss: u32, author: &str) -> Result<String, ExportError> {
    ZwoExporter::generate_zwo_xml(workout, bias_pct, tss, author)
}

/// Power as a fraction of FTP, clamped to the trainer range and formatted
/// with two decimals. FTP of 0 counts as ratio 0.
pub fn format_power_ratio(watts: u32, ftp: u32) -> String {
    let ratio = if ftp == 0 {
        0.0
    } else {
        f64::from(watts) / f64::from(ftp)
    };
    let ratio = if ratio.is_finite() { ratio } else { 0.0 };
    format!("{:.2}", ratio.clamp(MIN_POWER_RATIO, MAX_POWER_RATIO))
}

pub struct ZwoExporter;

impl ZwoExporter {
    pub fn generate_zwo_xml(
        workout: &Workout,
        bias_pct: i32,
        tss: u32,
        author: &str,
    ) -> Result<String, ExportError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Start(BytesStart::new("workout_file")))?;

        Self::write_text_element(&mut writer, "author", author)?;
        Self::write_text_element(&mut writer, "name", &workout.title)?;
        Self::write_text_element(&mut writer, "description", &describe(workout, bias_pct, tss))?;
        Self::write_text_element(&mut writer, "sportType", "bike")?;

        writer.write_event(Event::Start(BytesStart::new("workout")))?;
        for step in bias_steps(&workout.steps, bias_pct) {
            Self::write_step(&mut writer, &step, workout.ftp)?;
        }
        writer.write_event(Event::End(BytesEnd::new("workout")))?;

        writer.write_event(Event::End(BytesEnd::new("workout_file")))?;

        let bytes = writer.into_inner();
        String::from_utf8(bytes).map_err(|err| ExportError::SerializationError(err.to_string()))
    }

    fn write_step<W: Write>(writer: &mut Writer<W>, step: &Step, ftp: u32) -> Result<(), ExportError> {
        let duration = (u64::from(step.minutes()) * 60).to_string();

        let element = match step {
            Step::Ramp { from, to, phase, .. } => {
                let name = match phase {
                    Phase::Warmup => "Warmup",
                    Phase::Cooldown => "Cooldown",
                    _ => "Ramp",
                };
                let mut element = BytesStart::new(name);
                element.push_attribute(("Duration", duration.as_str()));
                element.push_attribute(("PowerLow", format_power_ratio(*from, ftp).as_str()));
                element.push_attribute(("PowerHigh", format_power_ratio(*to, ftp).as_str()));
                element
            }
            Step::Steady { intensity, .. } => {
                let mut element = BytesStart::new("SteadyState");
                element.push_attribute(("Duration", duration.as_str()));
                element.push_attribute(("Power", format_power_ratio(*intensity, ftp).as_str()));
                element
            }
        };

        writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn write_text_element<W: Write>(
        writer: &mut Writer<W>,
        name: &str,
        value: &str,
    ) -> Result<(), ExportError> {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

fn describe(workout: &Workout, bias_pct: i32, tss: u32) -> String {
    format!(
        "{} • Total: {}' • FTP: {} W • Bias: {}% • TSS: {}",
        workout.workout_type.display_name(),
        workout.total_minutes,
        workout.ftp,
        bias_pct,
        tss
    )
}
