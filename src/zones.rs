use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Phase, Step};
use crate::tss::{percent_of_ftp, round_watts};

/// Power training zones by %FTP.
///
/// Six-zone table, bounds inclusive:
/// - Z1: 0-59% FTP (Recovery)
/// - Z2: 60-75% FTP (Endurance)
/// - Z3: 76-90% FTP (Tempo)
/// - Z4: 91-110% FTP (Threshold)
/// - Z5: 111-120% FTP (VO2max)
/// - Z6: 121%+ FTP (Anaerobic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
    Z6,
}

impl Zone {
    pub const ALL: [Zone; 6] = [Zone::Z1, Zone::Z2, Zone::Z3, Zone::Z4, Zone::Z5, Zone::Z6];

    pub fn key(&self) -> &'static str {
        match self {
            Zone::Z1 => "z1",
            Zone::Z2 => "z2",
            Zone::Z3 => "z3",
            Zone::Z4 => "z4",
            Zone::Z5 => "z5",
            Zone::Z6 => "z6",
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Zone::Z1 => 1,
            Zone::Z2 => 2,
            Zone::Z3 => 3,
            Zone::Z4 => 4,
            Zone::Z5 => 5,
            Zone::Z6 => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Zone::Z1 => "Recovery",
            Zone::Z2 => "Endurance",
            Zone::Z3 => "Tempo",
            Zone::Z4 => "Threshold",
            Zone::Z5 => "VO2max",
            Zone::Z6 => "Anaerobic",
        }
    }

    /// Inclusive %FTP band; `None` upper bound means open-ended
    pub fn pct_range(&self) -> (u32, Option<u32>) {
        match self {
            Zone::Z1 => (0, Some(59)),
            Zone::Z2 => (60, Some(75)),
            Zone::Z3 => (76, Some(90)),
            Zone::Z4 => (91, Some(110)),
            Zone::Z5 => (111, Some(120)),
            Zone::Z6 => (121, None),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key().to_uppercase(), self.name())
    }
}

/// Zone band expressed in watts for a given FTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneBoundary {
    pub zone: Zone,
    pub min_watts: u32,
    /// `None` means no upper limit
    pub max_watts: Option<u32>,
}

/// Zone classification utilities
pub struct ZoneCalculator;

impl ZoneCalculator {
    /// Determine which zone a %FTP value falls into
    pub fn zone_for_pct(pct: u32) -> Zone {
        if pct <= 59 {
            Zone::Z1
        } else if pct <= 75 {
            Zone::Z2
        } else if pct <= 90 {
            Zone::Z3
        } else if pct <= 110 {
            Zone::Z4
        } else if pct <= 120 {
            Zone::Z5
        } else {
            Zone::Z6
        }
    }

    /// Watts as a whole-number percentage of FTP, 0 when FTP is 0
    pub fn pct_of_ftp(watts: f64, ftp: u32) -> u32 {
        if ftp == 0 {
            return 0;
        }
        round_watts(watts * 100.0 / f64::from(ftp))
    }

    /// Zone of a single step, ramps classified by their midpoint
    pub fn step_zone(step: &Step, ftp: u32) -> Zone {
        Self::zone_for_pct(Self::pct_of_ftp(step.representative_power(), ftp))
    }

    /// Minutes per zone over the work-phase steps
    pub fn work_minutes_by_zone(steps: &[Step], ftp: u32) -> BTreeMap<Zone, u32> {
        let mut minutes_by_zone = BTreeMap::new();
        if ftp == 0 {
            return minutes_by_zone;
        }

        for step in steps.iter().filter(|step| step.phase() == Phase::Work) {
            *minutes_by_zone.entry(Self::step_zone(step, ftp)).or_insert(0) += step.minutes();
        }
        minutes_by_zone
    }

    /// Zone holding the most work-phase minutes; the more intense zone wins ties.
    /// Z1 when there is no work or FTP is 0.
    pub fn predominant_zone(steps: &[Step], ftp: u32) -> Zone {
        Self::work_minutes_by_zone(steps, ftp)
            .into_iter()
            .max_by_key(|(zone, minutes)| (*minutes, *zone))
            .map(|(zone, _)| zone)
            .unwrap_or(Zone::Z1)
    }

    /// Zone table in watts for display
    pub fn power_zones(ftp: u32) -> Vec<ZoneBoundary> {
        Zone::ALL
            .iter()
            .map(|zone| {
                let (min_pct, max_pct) = zone.pct_range();
                ZoneBoundary {
                    zone: *zone,
                    min_watts: percent_of_ftp(ftp, min_pct),
                    max_watts: max_pct.map(|pct| percent_of_ftp(ftp, pct)),
                }
            })
            .collect()
    }
}
