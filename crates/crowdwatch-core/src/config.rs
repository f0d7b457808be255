//! Monitor configuration - tick intervals, population size, RNG seed.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change:
//!
//! ```json
//! { "seed": 42, "population": 400 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crowdwatch_logic::constants::POPULATION_SIZE;

use crate::error::MonitorError;

/// Default period of the gate/hall/alert task.
pub const DEFAULT_METRICS_INTERVAL_MS: u64 = 5_000;
/// Default period of the motion task (20 FPS).
pub const DEFAULT_MOTION_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Gate/hall synthesis + alert evaluation period.
    pub metrics_interval_ms: u64,
    /// Attendee motion frame period.
    pub motion_interval_ms: u64,
    /// Number of simulated attendees.
    pub population: usize,
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Wall-clock reading the monitor starts at, ms since the Unix epoch.
    /// `None` uses the current system time.
    pub start_clock_ms: Option<u64>,
    /// Simulation speed multiplier applied to `update` deltas.
    pub time_scale: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            metrics_interval_ms: DEFAULT_METRICS_INTERVAL_MS,
            motion_interval_ms: DEFAULT_MOTION_INTERVAL_MS,
            population: POPULATION_SIZE,
            seed: None,
            start_clock_ms: None,
            time_scale: 1.0,
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, MonitorError> {
        let config: MonitorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.metrics_interval_ms == 0 {
            return Err(MonitorError::InvalidConfig(
                "metrics_interval_ms must be positive".into(),
            ));
        }
        if self.motion_interval_ms == 0 {
            return Err(MonitorError::InvalidConfig(
                "motion_interval_ms must be positive".into(),
            ));
        }
        if self.population == 0 {
            return Err(MonitorError::InvalidConfig(
                "population must be positive".into(),
            ));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(MonitorError::InvalidConfig(format!(
                "time_scale must be a non-negative number, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }

    /// Builder-style seed override.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder-style start clock override.
    pub fn with_start_clock(mut self, clock_ms: u64) -> Self {
        self.start_clock_ms = Some(clock_ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_timers() {
        let config = MonitorConfig::default();
        assert_eq!(config.metrics_interval_ms, 5_000);
        assert_eq!(config.motion_interval_ms, 50);
        assert_eq!(config.population, 800);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MonitorConfig::from_json_str(r#"{ "seed": 42, "population": 400 }"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.population, 400);
        assert_eq!(config.motion_interval_ms, 50);
    }

    #[test]
    fn rejects_zero_intervals_and_population() {
        let err = MonitorConfig::from_json_str(r#"{ "motion_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidConfig(_)));
        assert!(err.to_string().contains("motion_interval_ms"));

        let err = MonitorConfig::from_json_str(r#"{ "population": 0 }"#).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidConfig(_)));

        let bad = MonitorConfig {
            time_scale: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = MonitorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, MonitorError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = MonitorConfig::load("/nonexistent/crowdwatch/config.json").unwrap_err();
        assert!(matches!(err, MonitorError::Io(_)));
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir()
            .join(format!("crowdwatch-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "metrics_interval_ms": 1000, "seed": 7 }"#).unwrap();
        let config = MonitorConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.metrics_interval_ms, 1_000);
        assert_eq!(config.seed, Some(7));
    }
}
