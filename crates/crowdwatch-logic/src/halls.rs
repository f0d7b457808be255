//! Hall occupancy synthesis and density classification.
//!
//! Halls follow a single deterministic wave each (no jitter), so for a given
//! clock reading the snapshot is fully reproducible.

use serde::{Deserialize, Serialize};

use crate::classify::{
    hall_crowd_level, round_half_up, round_to, stampede_risk, CrowdLevel, StampedeRisk,
};
use crate::constants::{halls, HALL_COUNT};
use crate::gates::Wave;

/// Per-hall occupancy waves, indexed by `hall_number - 1`.
pub const HALL_WAVES: [Wave; HALL_COUNT] = [
    Wave::sin(50.0, 5_000.0),
    Wave::cos(80.0, 6_000.0),
    Wave::sin(40.0, 7_000.0),
    Wave::cos(60.0, 8_000.0),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hall {
    pub id: String,
    pub number: u8,
    pub name: String,
    pub capacity: u32,
    pub current_count: u32,
    /// `current_count / capacity × 100`, one decimal.
    pub density_percent: f64,
    pub crowd_level: CrowdLevel,
    pub heatmap_color: String,
    pub stampede_risk: StampedeRisk,
}

impl Hall {
    pub fn is_high_risk(&self) -> bool {
        self.stampede_risk == StampedeRisk::High
    }
}

/// Synthesize all four halls for wall-clock time `clock_ms`.
pub fn synthesize_halls(clock_ms: f64) -> [Hall; HALL_COUNT] {
    halls::ALL.map(|number| {
        let i = number as usize - 1;
        let variation = HALL_WAVES[i].sample(clock_ms);
        let count = round_half_up(halls::BASE_COUNTS[i] + variation).max(0.0) as u32;
        create_hall(number, count)
    })
}

/// Build one hall from its number and head count.
pub fn create_hall(hall_number: u8, count: u32) -> Hall {
    let capacity = halls::CAPACITY;
    let density_percent = count as f64 / capacity as f64 * 100.0;
    let crowd_level = hall_crowd_level(density_percent);

    Hall {
        id: format!("hall-{}", hall_number),
        number: hall_number,
        name: format!("Hall {}", hall_number),
        capacity,
        current_count: count,
        density_percent: round_to(density_percent, 1),
        crowd_level,
        heatmap_color: crowd_level.color().to_string(),
        stampede_risk: stampede_risk(density_percent),
    }
}
