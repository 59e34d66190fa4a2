//! Canonical string form of a step sequence, used to compare workouts
//! for equality and to avoid handing out the same variant twice in a row.

use crate::models::Step;

const TOKEN_SEPARATOR: &str = "|";

/// Encode a step sequence.
///
/// Two sequences share a signature iff they match step for step in kind,
/// minutes, power values and phase.
pub fn make_signature(steps: &[Step]) -> String {
    steps
        .iter()
        .map(encode_step)
        .collect::<Vec<_>>()
        .join(TOKEN_SEPARATOR)
}

fn encode_step(step: &Step) -> String {
    match step {
        Step::Steady {
            minutes,
            intensity,
            phase,
            ..
        } => format!("S:{}:{}:{}", minutes, intensity, phase),
        Step::Ramp {
            minutes,
            from,
            to,
            phase,
            ..
        } => format!("R:{}:{}:{}:{}", minutes, from, to, phase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Phase;

    #[test]
    fn test_signature_format() {
        let steps = vec![
            Step::ramp(10, 125, 150, "Warm-up", Phase::Warmup),
            Step::steady(8, 95, "Threshold 1/2", Phase::Work),
        ];
        assert_eq!(make_signature(&steps), "R:10:125:150:warmup|S:8:95:work");
    }

    #[test]
    fn test_description_does_not_affect_signature() {
        let a = vec![Step::steady(8, 95, "Threshold", Phase::Work)];
        let b = vec![Step::steady(8, 95, "Hard effort", Phase::Work)];
        assert_eq!(make_signature(&a), make_signature(&b));
    }

    #[test]
    fn test_signature_distinguishes_order_phase_and_kind() {
        let work = Step::steady(5, 100, "", Phase::Work);
        let rest = Step::steady(5, 55, "", Phase::Recovery);
        assert_ne!(
            make_signature(&[work.clone(), rest.clone()]),
            make_signature(&[rest.clone(), work.clone()])
        );
        assert_ne!(
            make_signature(&[Step::steady(5, 55, "", Phase::Work)]),
            make_signature(&[rest])
        );
        assert_ne!(
            make_signature(&[Step::ramp(5, 100, 100, "", Phase::Warmup)]),
            make_signature(&[Step::steady(5, 100, "", Phase::Warmup)])
        );
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(make_signature(&[]), "");
    }
}
