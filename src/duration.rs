use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ceiling for the open-ended top bucket
pub const GLOBAL_CAP_MINUTES: u32 = 240;

/// Named duration buckets a rider can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationRange {
    /// 30-45 minutes
    Short,
    /// 46-60 minutes
    Medium,
    /// 61-75 minutes
    Long,
    /// 76-90 minutes
    Extended,
    /// 91 minutes and up
    Epic,
}

/// Minute window a bucket resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBounds {
    pub min: u32,
    pub max: Option<u32>,
}

impl DurationBounds {
    /// Upper limit used for fitting, substituting the global cap when open-ended
    pub fn cap(&self) -> u32 {
        self.max.unwrap_or(GLOBAL_CAP_MINUTES)
    }

    pub fn contains(&self, minutes: u32) -> bool {
        self.min <= minutes && minutes <= self.cap()
    }
}

impl DurationRange {
    pub const ALL: [DurationRange; 5] = [
        DurationRange::Short,
        DurationRange::Medium,
        DurationRange::Long,
        DurationRange::Extended,
        DurationRange::Epic,
    ];

    pub fn bounds(&self) -> DurationBounds {
        let (min, max) = match self {
            DurationRange::Short => (30, Some(45)),
            DurationRange::Medium => (46, Some(60)),
            DurationRange::Long => (61, Some(75)),
            DurationRange::Extended => (76, Some(90)),
            DurationRange::Epic => (91, None),
        };
        DurationBounds { min, max }
    }

    /// Bucket containing the given total, if any
    pub fn for_minutes(minutes: u32) -> Option<DurationRange> {
        Self::ALL
            .into_iter()
            .find(|range| range.bounds().contains(minutes))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationRange::Short => "short",
            DurationRange::Medium => "medium",
            DurationRange::Long => "long",
            DurationRange::Extended => "extended",
            DurationRange::Epic => "epic",
        }
    }

    /// Human readable window, e.g. `46-60'`
    pub fn label(&self) -> String {
        let bounds = self.bounds();
        match bounds.max {
            Some(max) => format!("{}-{}'", bounds.min, max),
            None => format!("{}'+", bounds.min),
        }
    }
}

impl fmt::Display for DurationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(DurationRange::Short),
            "medium" => Ok(DurationRange::Medium),
            "long" => Ok(DurationRange::Long),
            "extended" => Ok(DurationRange::Extended),
            "epic" => Ok(DurationRange::Epic),
            _ => Err(format!("Unknown duration range: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_are_contiguous() {
        for pair in DurationRange::ALL.windows(2) {
            let lower = pair[0].bounds();
            let upper = pair[1].bounds();
            assert_eq!(lower.max.map(|max| max + 1), Some(upper.min));
        }
    }

    #[test]
    fn test_only_top_bucket_is_open_ended() {
        assert_eq!(DurationRange::Epic.bounds().max, None);
        assert_eq!(DurationRange::Epic.bounds().cap(), GLOBAL_CAP_MINUTES);
        assert_eq!(DurationRange::Long.bounds().cap(), 75);
    }

    #[test]
    fn test_for_minutes() {
        assert_eq!(DurationRange::for_minutes(29), None);
        assert_eq!(DurationRange::for_minutes(30), Some(DurationRange::Short));
        assert_eq!(DurationRange::for_minutes(45), Some(DurationRange::Short));
        assert_eq!(DurationRange::for_minutes(46), Some(DurationRange::Medium));
        assert_eq!(DurationRange::for_minutes(240), Some(DurationRange::Epic));
        assert_eq!(DurationRange::for_minutes(241), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DurationRange::Medium.label(), "46-60'");
        assert_eq!(DurationRange::Epic.label(), "91'+");
    }
}
