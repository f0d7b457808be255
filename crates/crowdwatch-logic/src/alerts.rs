//! Routing and stampede advisories derived from one gate/hall snapshot.
//!
//! Rules are checked in priority order and the first match wins:
//! 1. any hall at high stampede risk → critical stampede alert
//! 2. worst gate critical, best gate low → high-severity reroute
//! 3. worst gate high, best gate low → medium-severity reroute
//!
//! "Best" and "worst" are the gates with the lowest and highest wait time,
//! ties going to the lower gate number.

use serde::{Deserialize, Serialize};

use crate::classify::CrowdLevel;
use crate::gates::Gate;
use crate::halls::Hall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Routing,
    Stampede,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    #[serde(rename = "suggestedExit")]
    pub suggested_exit: u8,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub active: bool,
}

impl Alert {
    fn new(
        kind: AlertKind,
        severity: Severity,
        message: String,
        suggested_exit: u8,
        timestamp: u64,
    ) -> Self {
        Self {
            id: format!("alert-{}", timestamp),
            kind,
            severity,
            message,
            suggested_exit,
            timestamp,
            active: true,
        }
    }
}

/// Gate with the shortest wait (first one on ties).
pub fn best_gate(gates: &[Gate]) -> Option<&Gate> {
    gates.iter().fold(None, |best: Option<&Gate>, g| match best {
        Some(b) if g.wait_time_seconds() >= b.wait_time_seconds() => Some(b),
        _ => Some(g),
    })
}

/// Gate with the longest wait (first one on ties).
pub fn worst_gate(gates: &[Gate]) -> Option<&Gate> {
    gates.iter().fold(None, |worst: Option<&Gate>, g| match worst {
        Some(w) if g.wait_time_seconds() <= w.wait_time_seconds() => Some(w),
        _ => Some(g),
    })
}

/// Evaluate the alert rules against a snapshot. `None` means nothing new to
/// report; callers keep whatever alert they already hold.
pub fn generate_routing_alert(gates: &[Gate], halls: &[Hall], timestamp: u64) -> Option<Alert> {
    let best = best_gate(gates)?;
    let worst = worst_gate(gates)?;

    let high_risk: Vec<&str> = halls
        .iter()
        .filter(|h| h.is_high_risk())
        .map(|h| h.name.as_str())
        .collect();

    if !high_risk.is_empty() {
        return Some(Alert::new(
            AlertKind::Stampede,
            Severity::Critical,
            format!(
                "⚠️ High stampede risk in {}! Avoid these areas.",
                high_risk.join(", ")
            ),
            best.gate_number,
            timestamp,
        ));
    }

    match (worst.crowd_level, best.crowd_level) {
        (CrowdLevel::Critical, CrowdLevel::Low) => Some(Alert::new(
            AlertKind::Routing,
            Severity::High,
            format!(
                "🚨 Exit {} is overcrowded! Use Exit {} instead ({} wait).",
                worst.gate_number, best.gate_number, best.metrics.wait_time_formatted
            ),
            best.gate_number,
            timestamp,
        )),
        (CrowdLevel::High, CrowdLevel::Low) => Some(Alert::new(
            AlertKind::Routing,
            Severity::Medium,
            format!(
                "💡 Exit {} has the shortest wait time ({}).",
                best.gate_number, best.metrics.wait_time_formatted
            ),
            best.gate_number,
            timestamp,
        )),
        _ => None,
    }
}
