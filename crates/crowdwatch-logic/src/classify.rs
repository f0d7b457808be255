//! Crowd classification - crowd levels, stampede risk, trends, wait-time text.
//!
//! Shared by gate and hall synthesis and by the alert rules. Everything here
//! is a pure function of its numeric input.

use serde::{Deserialize, Serialize};

use crate::constants::{gate_thresholds, hall_thresholds};

/// Ordered crowding category. `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrowdLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl CrowdLevel {
    /// Display color for gate badges and hall heatmaps.
    pub fn color(self) -> &'static str {
        match self {
            CrowdLevel::Low => "#10b981",
            CrowdLevel::Medium => "#f59e0b",
            CrowdLevel::High => "#f97316",
            CrowdLevel::Critical => "#ef4444",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CrowdLevel::Low => "low",
            CrowdLevel::Medium => "medium",
            CrowdLevel::High => "high",
            CrowdLevel::Critical => "critical",
        }
    }
}

/// Hall hazard class. There is no critical variant: the top density band
/// maps to `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StampedeRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

/// Percent change between sparkline endpoints above which a trend is no
/// longer stable.
const TREND_THRESHOLD_PERCENT: f64 = 10.0;

/// Classify a gate by head count.
pub fn gate_crowd_level(people_count: u32) -> CrowdLevel {
    if people_count < gate_thresholds::LOW {
        CrowdLevel::Low
    } else if people_count < gate_thresholds::MEDIUM {
        CrowdLevel::Medium
    } else if people_count < gate_thresholds::HIGH {
        CrowdLevel::High
    } else {
        CrowdLevel::Critical
    }
}

/// Classify a hall by density percent.
pub fn hall_crowd_level(density_percent: f64) -> CrowdLevel {
    if density_percent < hall_thresholds::LOW {
        CrowdLevel::Low
    } else if density_percent < hall_thresholds::MEDIUM {
        CrowdLevel::Medium
    } else if density_percent < hall_thresholds::HIGH {
        CrowdLevel::High
    } else {
        CrowdLevel::Critical
    }
}

/// Stampede risk for a hall density: low, low, medium, high across the four
/// crowd-level bands.
pub fn stampede_risk(density_percent: f64) -> StampedeRisk {
    match hall_crowd_level(density_percent) {
        CrowdLevel::Low | CrowdLevel::Medium => StampedeRisk::Low,
        CrowdLevel::High => StampedeRisk::Medium,
        CrowdLevel::Critical => StampedeRisk::High,
    }
}

/// Queue wait estimate: two seconds per person, never under 30 seconds.
pub fn wait_time_seconds(people_count: u32) -> u32 {
    (people_count.saturating_mul(2)).max(30)
}

/// Human-readable wait, rounded to whole minutes.
pub fn format_wait_time(seconds: u32) -> String {
    let minutes = round_half_up(seconds as f64 / 60.0) as i64;
    match minutes {
        0 => "<1 minute".to_string(),
        1 => "1 minute".to_string(),
        n => format!("{} minutes", n),
    }
}

/// Trend over a sparkline: direction plus absolute percent change between
/// the first and last points.
pub fn determine_trend(sparkline: &[u32]) -> (TrendDirection, f64) {
    let (first, last) = match (sparkline.first(), sparkline.last()) {
        (Some(&f), Some(&l)) if f > 0 => (f as f64, l as f64),
        _ => return (TrendDirection::Stable, 0.0),
    };
    let change = (last - first) / first * 100.0;

    let direction = if change > TREND_THRESHOLD_PERCENT {
        TrendDirection::Increasing
    } else if change < -TREND_THRESHOLD_PERCENT {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    (direction, round_to(change.abs(), 1))
}

/// Round to the nearest integer, halves toward +∞.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Round to `decimals` places, halves toward +∞.
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_up(x * factor) / factor
}
