//! Default pattern catalog. Intensities are %FTP.

use std::collections::BTreeMap;

use super::{PatternSet, Variant};
use crate::models::{Phase, Step, WorkoutType};

pub const BUNDLED_VERSION: &str = "bundled-2024.1";

const EASY_SPIN: &str = "Easy spin";
const RECOVER: &str = "Recover";

pub(super) fn build() -> PatternSet {
    let mut categories = BTreeMap::new();
    categories.insert(WorkoutType::Recovery, recovery());
    categories.insert(WorkoutType::Endurance, endurance());
    categories.insert(WorkoutType::Tempo, tempo());
    categories.insert(WorkoutType::Threshold, threshold());
    categories.insert(WorkoutType::Vo2max, vo2max());
    categories.insert(WorkoutType::Anaerobic, anaerobic());
    PatternSet::new(categories)
}

fn work(minutes: u32, pct: u32, description: &str) -> Step {
    Step::steady(minutes, pct, description, Phase::Work)
}

fn easy(minutes: u32, pct: u32, description: &str) -> Step {
    Step::steady(minutes, pct, description, Phase::Recovery)
}

/// `count` work/recovery pairs, each work step numbered `label n/count`
fn repeats(count: u32, on_minutes: u32, on_pct: u32, label: &str, off_minutes: u32, off_pct: u32) -> Vec<Step> {
    (1..=count)
        .flat_map(|n| {
            [
                work(on_minutes, on_pct, &format!("{} {}/{}", label, n, count)),
                easy(off_minutes, off_pct, RECOVER),
            ]
        })
        .collect()
}

fn variant(blocks: Vec<Step>) -> Variant {
    Variant::new(blocks)
}

fn sets(sets: Vec<Vec<Step>>, between_minutes: u32, between_pct: u32) -> Variant {
    let last = sets.len().saturating_sub(1);
    let mut blocks = Vec::new();
    for (index, set) in sets.into_iter().enumerate() {
        blocks.extend(set);
        if index < last {
            blocks.push(easy(between_minutes, between_pct, "Between sets"));
        }
    }
    Variant::new(blocks)
}

fn recovery() -> Vec<Variant> {
    vec![
        variant(vec![work(20, 50, EASY_SPIN)]),
        variant(vec![
            work(15, 55, EASY_SPIN),
            easy(5, 45, "Soft pedal"),
            work(10, 55, EASY_SPIN),
        ]),
        variant(vec![work(45, 52, "Steady easy spin")]),
        variant(vec![
            work(20, 55, EASY_SPIN),
            easy(5, 45, "Soft pedal"),
            work(20, 55, EASY_SPIN),
            easy(5, 45, "Soft pedal"),
            work(10, 50, "Spin out"),
        ]),
        variant(vec![
            work(40, 55, EASY_SPIN),
            easy(5, 45, "Soft pedal"),
            work(35, 55, EASY_SPIN),
        ]),
    ]
}

fn endurance() -> Vec<Variant> {
    vec![
        variant(vec![work(25, 68, "Aerobic endurance")]),
        variant(vec![work(40, 70, "Aerobic endurance")]),
        variant(vec![
            work(15, 68, "Aerobic endurance"),
            easy(5, 55, EASY_SPIN),
            work(15, 72, "Aerobic endurance"),
        ]),
        variant(vec![work(50, 70, "Aerobic endurance")]),
        variant(vec![
            work(20, 68, "Aerobic endurance"),
            work(5, 76, "Tempo lift"),
            work(20, 70, "Aerobic endurance"),
        ]),
        variant(vec![
            work(30, 70, "Aerobic endurance"),
            easy(5, 55, EASY_SPIN),
            work(30, 72, "Aerobic endurance"),
        ]),
        variant(vec![work(90, 68, "Long aerobic ride")]),
        variant(vec![
            work(40, 70, "Aerobic endurance"),
            easy(5, 55, EASY_SPIN),
            work(40, 72, "Aerobic endurance"),
            easy(5, 55, EASY_SPIN),
            work(30, 68, "Aerobic endurance"),
        ]),
    ]
}

fn tempo() -> Vec<Variant> {
    vec![
        variant(repeats(2, 8, 82, "Tempo", 4, 60)),
        variant(repeats(2, 15, 85, "Tempo", 5, 60)),
        variant(repeats(3, 8, 83, "Tempo", 3, 60)),
        variant(vec![work(30, 80, "Sustained tempo")]),
        variant(repeats(2, 20, 85, "Tempo", 5, 60)),
        variant(repeats(2, 25, 85, "Tempo", 5, 60)),
        variant(repeats(3, 20, 86, "Tempo", 5, 60)),
        variant(vec![
            work(60, 82, "Long tempo"),
            easy(10, 60, RECOVER),
            work(30, 85, "Tempo finish"),
        ]),
    ]
}

fn threshold() -> Vec<Variant> {
    vec![
        variant(repeats(2, 8, 95, "Threshold", 4, 55)),
        variant(repeats(3, 5, 100, "Threshold", 2, 55)),
        variant(repeats(2, 12, 97, "Threshold", 5, 55)),
        variant(repeats(3, 10, 95, "Threshold", 3, 55)),
        variant(repeats(2, 20, 95, "Threshold", 5, 55)),
        variant(repeats(4, 8, 100, "Threshold", 4, 55)),
        variant(repeats(3, 15, 97, "Threshold", 5, 55)),
        variant(repeats(3, 20, 95, "Threshold", 5, 55)),
        variant(repeats(2, 30, 93, "Threshold", 10, 55)),
    ]
}

fn vo2max() -> Vec<Variant> {
    vec![
        variant(repeats(4, 2, 118, "VO2 effort", 2, 50)),
        variant(repeats(3, 4, 115, "VO2 effort", 4, 50)),
        variant(repeats(5, 3, 115, "VO2 effort", 3, 50)),
        variant(repeats(6, 3, 118, "VO2 effort", 3, 50)),
        variant(repeats(6, 4, 112, "VO2 effort", 4, 50)),
        sets(
            vec![
                repeats(5, 3, 118, "Set 1 VO2 effort", 3, 50),
                repeats(5, 3, 118, "Set 2 VO2 effort", 3, 50),
            ],
            10,
            55,
        ),
        sets(
            vec![
                repeats(4, 5, 112, "Set 1 VO2 effort", 5, 50),
                repeats(4, 5, 112, "Set 2 VO2 effort", 5, 50),
            ],
            10,
            55,
        ),
    ]
}

fn anaerobic() -> Vec<Variant> {
    vec![
        variant(repeats(8, 1, 140, "Sprint", 1, 50)),
        variant(repeats(6, 1, 150, "Sprint", 2, 50)),
        variant(repeats(10, 1, 140, "Anaerobic effort", 2, 50)),
        sets(
            vec![
                repeats(6, 1, 145, "Set 1 effort", 1, 50),
                repeats(6, 1, 145, "Set 2 effort", 1, 50),
                repeats(6, 1, 145, "Set 3 effort", 1, 50),
            ],
            5,
            55,
        ),
        sets(
            vec![
                repeats(6, 1, 140, "Set 1 effort", 1, 50),
                repeats(6, 1, 140, "Set 2 effort", 1, 50),
                repeats(6, 1, 140, "Set 3 effort", 1, 50),
                repeats(6, 1, 140, "Set 4 effort", 1, 50),
            ],
            5,
            55,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationRange;

    fn fit_count(workout_type: WorkoutType, range: DurationRange) -> usize {
        build()
            .fitting_variants(workout_type, &range.bounds(), 20)
            .len()
    }

    #[test]
    fn test_repeats_layout() {
        let steps = repeats(3, 5, 100, "Threshold", 2, 55);
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[0].description(), "Threshold 1/3");
        assert_eq!(steps[4].description(), "Threshold 3/3");
        assert_eq!(steps[5].phase(), Phase::Recovery);
    }

    #[test]
    fn test_sets_insert_rest_between_sets_only() {
        let v = sets(vec![vec![work(1, 140, "a")], vec![work(1, 140, "b")]], 5, 55);
        assert_eq!(v.total_minutes(), 7);
        assert_eq!(v.blocks().len(), 3);
    }

    #[test]
    fn test_fit_counts_per_bucket() {
        assert_eq!(fit_count(WorkoutType::Recovery, DurationRange::Short), 1);
        assert_eq!(fit_count(WorkoutType::Endurance, DurationRange::Medium), 2);
        assert_eq!(fit_count(WorkoutType::Tempo, DurationRange::Medium), 3);
        assert_eq!(fit_count(WorkoutType::Threshold, DurationRange::Long), 2);
        assert_eq!(fit_count(WorkoutType::Anaerobic, DurationRange::Epic), 0);
    }

    #[test]
    fn test_every_other_bucket_has_a_variant() {
        for workout_type in WorkoutType::ALL {
            for range in DurationRange::ALL {
                if workout_type == WorkoutType::Anaerobic && range == DurationRange::Epic {
                    continue;
                }
                assert!(
                    fit_count(workout_type, range) >= 1,
                    "{} / {} has no variant",
                    workout_type,
                    range
                );
            }
        }
    }
}
