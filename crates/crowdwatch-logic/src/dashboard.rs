//! Dashboard aggregates - venue-wide stats and the "use this exit" card.

use serde::{Deserialize, Serialize};

use crate::alerts::{best_gate, worst_gate};
use crate::classify::{round_half_up, round_to, TrendDirection};
use crate::gates::{Gate, GateStatus};
use crate::halls::Hall;

/// Assumed distance from the visitor to the recommended exit, meters.
pub const RECOMMENDATION_DISTANCE_M: f64 = 85.0;
/// Walking speed, meters per second.
pub const WALKING_SPEED_MPS: f64 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueStats {
    /// Sum of people queued at all gates.
    pub total_crowd: u32,
    /// Sum of hall capacities.
    pub capacity: u32,
    /// Hall occupancy over hall capacity, percent with one decimal.
    pub utilization_percent: f64,
    pub active_gates: usize,
    pub average_wait_minutes: u32,
    pub best_exit: Option<u8>,
    pub high_risk_halls: Vec<u8>,
    pub risk_level: RiskLevel,
}

/// Aggregate one snapshot into the dashboard summary row.
pub fn venue_stats(gates: &[Gate], halls: &[Hall]) -> VenueStats {
    let total_crowd = gates.iter().map(Gate::people_count).sum();
    let capacity: u32 = halls.iter().map(|h| h.capacity).sum();
    let occupancy: u32 = halls.iter().map(|h| h.current_count).sum();

    let utilization_percent = if capacity > 0 {
        round_to(occupancy as f64 / capacity as f64 * 100.0, 1)
    } else {
        0.0
    };

    let average_wait_minutes = if gates.is_empty() {
        0
    } else {
        let total_wait: u64 = gates.iter().map(|g| g.wait_time_seconds() as u64).sum();
        round_half_up(total_wait as f64 / gates.len() as f64 / 60.0) as u32
    };

    let high_risk_halls: Vec<u8> = halls
        .iter()
        .filter(|h| h.is_high_risk())
        .map(|h| h.number)
        .collect();

    VenueStats {
        total_crowd,
        capacity,
        utilization_percent,
        active_gates: gates
            .iter()
            .filter(|g| g.status == GateStatus::Active)
            .count(),
        average_wait_minutes,
        best_exit: best_gate(gates).map(|g| g.gate_number),
        risk_level: if high_risk_halls.is_empty() {
            RiskLevel::Low
        } else {
            RiskLevel::High
        },
        high_risk_halls,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRecommendation {
    pub gate_number: u8,
    pub gate_name: String,
    pub wait_time_formatted: String,
    /// Wait saved compared to the slowest gate (never negative).
    pub time_saved_seconds: u32,
    pub distance_meters: f64,
    pub walking_time_seconds: u32,
    pub total_time_minutes: u32,
    /// Slowest gate, named when using this exit saves time.
    pub compared_to: Option<String>,
    pub reasons: Vec<String>,
}

/// Explain why `gate` is a good choice relative to the rest of `gates`.
pub fn recommend_exit(gate: &Gate, gates: &[Gate]) -> ExitRecommendation {
    let worst = worst_gate(gates);
    let time_saved_seconds = worst
        .map(|w| w.wait_time_seconds().saturating_sub(gate.wait_time_seconds()))
        .unwrap_or(0);
    let walking_time_seconds = round_half_up(RECOMMENDATION_DISTANCE_M / WALKING_SPEED_MPS) as u32;
    let total_time_minutes =
        round_half_up((gate.wait_time_seconds() + walking_time_seconds) as f64 / 60.0) as u32;

    let mut reasons = vec![
        format!("Lowest wait time ({})", gate.metrics.wait_time_formatted),
        format!(
            "Close to your location ({}m walk)",
            RECOMMENDATION_DISTANCE_M as u32
        ),
        match gate.trend.direction {
            TrendDirection::Decreasing => "Crowd decreasing".to_string(),
            _ => "Stable crowd levels".to_string(),
        },
    ];
    if gate.has_accessibility {
        reasons.push("Accessibility features available".to_string());
    }

    ExitRecommendation {
        gate_number: gate.gate_number,
        gate_name: gate.name.clone(),
        wait_time_formatted: gate.metrics.wait_time_formatted.clone(),
        time_saved_seconds,
        distance_meters: RECOMMENDATION_DISTANCE_M,
        walking_time_seconds,
        total_time_minutes,
        compared_to: worst
            .filter(|_| time_saved_seconds > 0)
            .map(|w| w.name.clone()),
        reasons,
    }
}
