//! JSON export of the dashboard state.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crowdwatch_logic::alerts::{best_gate, Alert};
use crowdwatch_logic::dashboard::{recommend_exit, venue_stats, ExitRecommendation, VenueStats};
use crowdwatch_logic::gates::Gate;
use crowdwatch_logic::halls::Hall;
use crowdwatch_logic::motion::CrowdPerson;

use crate::error::MonitorError;

/// Everything a display layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub clock_ms: u64,
    pub gates: Vec<Gate>,
    pub halls: Vec<Hall>,
    pub people: Vec<CrowdPerson>,
    pub alert: Option<Alert>,
    pub stats: VenueStats,
    /// Recommendation card for the gate with the shortest wait.
    pub recommendation: Option<ExitRecommendation>,
}

impl DashboardSnapshot {
    /// Copy the given state and derive the aggregates from it.
    pub fn capture(
        clock_ms: u64,
        gates: &[Gate],
        halls: &[Hall],
        people: &[CrowdPerson],
        alert: Option<&Alert>,
    ) -> Self {
        Self {
            clock_ms,
            stats: venue_stats(gates, halls),
            recommendation: best_gate(gates).map(|g| recommend_exit(g, gates)),
            gates: gates.to_vec(),
            halls: halls.to_vec(),
            people: people.to_vec(),
            alert: alert.cloned(),
        }
    }

    pub fn to_json(&self) -> Result<String, MonitorError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, MonitorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stream the snapshot as JSON to a writer.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<(), MonitorError> {
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, MonitorError> {
        Ok(serde_json::from_str(json)?)
    }
}
