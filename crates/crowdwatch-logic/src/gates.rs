//! Gate metric synthesis - occupancy, wait times, sparklines, predictions.
//!
//! Gates are regenerated from scratch on every metrics tick. The only things
//! that survive between ticks are the fixed number ↔ name ↔ coordinate
//! mapping and the accessibility flag.
//!
//! Occupancy for gate `n` is `base + round(amplitude × wave(clock / period) + jitter)`
//! where `jitter` is uniform in `[0, jitter_max)`. Jitter is only ever added,
//! so counts drift slightly above the wave.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::classify::{
    determine_trend, format_wait_time, gate_crowd_level, round_half_up, round_to,
    wait_time_seconds, CrowdLevel, TrendDirection,
};
use crate::constants::{gates, GATE_COUNT};

/// Sparkline length.
pub const SPARKLINE_POINTS: usize = 10;
/// Sparkline values stay within this band (except the forced final point).
pub const SPARKLINE_MIN: f64 = 20.0;
pub const SPARKLINE_MAX: f64 = 300.0;

/// Gate density denominator. Hall density divides by capacity instead.
pub const GATE_DENSITY_DIVISOR: f64 = 200.0;

/// Meters of queue per person waiting.
const QUEUE_METERS_PER_PERSON: f64 = 0.08;

/// A periodic occupancy signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub amplitude: f64,
    pub period_ms: f64,
    pub shape: WaveShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveShape {
    Sin,
    Cos,
}

impl Wave {
    pub const fn sin(amplitude: f64, period_ms: f64) -> Self {
        Self {
            amplitude,
            period_ms,
            shape: WaveShape::Sin,
        }
    }

    pub const fn cos(amplitude: f64, period_ms: f64) -> Self {
        Self {
            amplitude,
            period_ms,
            shape: WaveShape::Cos,
        }
    }

    /// Signal value at wall-clock time `clock_ms`.
    pub fn sample(&self, clock_ms: f64) -> f64 {
        let phase = clock_ms / self.period_ms;
        let unit = match self.shape {
            WaveShape::Sin => phase.sin(),
            WaveShape::Cos => phase.cos(),
        };
        self.amplitude * unit
    }
}

/// Per-gate occupancy waves, indexed by `gate_number - 1`.
pub const GATE_WAVES: [Wave; GATE_COUNT] = [
    Wave::sin(20.0, 10_000.0),
    Wave::cos(30.0, 8_000.0),
    Wave::sin(25.0, 12_000.0),
    Wave::cos(18.0, 15_000.0),
];

/// Upper bound of the additive jitter per gate (about half the amplitude).
pub const GATE_JITTER: [f64; GATE_COUNT] = [10.0, 15.0, 12.0, 8.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateStatus {
    Active,
    Closed,
    Maintenance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Parse a `"lat,lon"` string.
    pub fn parse(coordinates: &str) -> Option<Self> {
        let (lat, lon) = coordinates.split_once(',')?;
        Some(Self {
            lat: lat.trim().parse().ok()?,
            lon: lon.trim().parse().ok()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateMetrics {
    pub people_count: u32,
    /// `people_count / 200`, two decimals.
    pub density: f64,
    pub density_level: CrowdLevel,
    pub wait_time_seconds: u32,
    pub wait_time_formatted: String,
    pub queue_length_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateTrend {
    pub direction: TrendDirection,
    pub change_percent: f64,
    pub sparkline: Vec<u32>,
}

/// A cosmetic forecast; not derived from the trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub count: u32,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GatePrediction {
    #[serde(rename = "5_min_ahead")]
    pub five_min_ahead: Prediction,
    #[serde(rename = "10_min_ahead")]
    pub ten_min_ahead: Prediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub id: String,
    pub gate_number: u8,
    pub name: String,
    pub location: GeoPoint,
    pub status: GateStatus,
    pub crowd_level: CrowdLevel,
    pub crowd_color: String,
    pub metrics: GateMetrics,
    pub trend: GateTrend,
    pub prediction: GatePrediction,
    pub has_accessibility: bool,
    pub efficiency_percent: u32,
}

impl Gate {
    pub fn people_count(&self) -> u32 {
        self.metrics.people_count
    }

    pub fn wait_time_seconds(&self) -> u32 {
        self.metrics.wait_time_seconds
    }
}

/// Synthesize all four gates for wall-clock time `clock_ms`.
pub fn synthesize_gates(clock_ms: f64, rng: &mut impl Rng) -> [Gate; GATE_COUNT] {
    gates::ALL.map(|number| {
        let i = number as usize - 1;
        let variation = GATE_WAVES[i].sample(clock_ms) + rng.gen::<f64>() * GATE_JITTER[i];
        let count = (gates::BASE_COUNTS[i] + round_half_up(variation) as i64).max(0) as u32;
        create_gate(number, gates::COORDINATES[i], count, rng)
    })
}

/// Build one gate from its number, `"lat,lon"` string and head count.
pub fn create_gate(gate_number: u8, coordinates: &str, count: u32, rng: &mut impl Rng) -> Gate {
    let crowd_level = gate_crowd_level(count);
    let wait = wait_time_seconds(count);

    let sparkline = generate_sparkline(count, rng);
    let (direction, change_percent) = determine_trend(&sparkline);

    let prediction = GatePrediction {
        five_min_ahead: predict(count, 0.2, 0.85, rng),
        ten_min_ahead: predict(count, 0.3, 0.75, rng),
    };

    Gate {
        id: format!("gate-{}", gate_number),
        gate_number,
        name: gates::name(gate_number)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Exit {}", gate_number)),
        location: GeoPoint::parse(coordinates).unwrap_or_default(),
        status: GateStatus::Active,
        crowd_level,
        crowd_color: crowd_level.color().to_string(),
        metrics: GateMetrics {
            people_count: count,
            density: round_to(count as f64 / GATE_DENSITY_DIVISOR, 2),
            density_level: crowd_level,
            wait_time_seconds: wait,
            wait_time_formatted: format_wait_time(wait),
            queue_length_meters: round_to(count as f64 * QUEUE_METERS_PER_PERSON, 1),
        },
        trend: GateTrend {
            direction,
            change_percent,
            sparkline,
        },
        prediction,
        has_accessibility: gates::has_accessibility(gate_number),
        efficiency_percent: round_half_up(70.0 + rng.gen::<f64>() * 25.0) as u32,
    }
}

/// Random walk that starts 20 below `current` and ends exactly at `current`.
pub fn generate_sparkline(current: u32, rng: &mut impl Rng) -> Vec<u32> {
    let mut value = current as f64 - 20.0;
    let mut points = Vec::with_capacity(SPARKLINE_POINTS);

    for _ in 0..SPARKLINE_POINTS {
        value += (rng.gen::<f64>() - 0.5) * 10.0;
        value = value.clamp(SPARKLINE_MIN, SPARKLINE_MAX);
        points.push(round_half_up(value) as u32);
    }

    if let Some(last) = points.last_mut() {
        *last = current;
    }
    points
}

/// `count × (1 + (u − 0.4) × spread)`, confidence uniform in
/// `[confidence_floor, confidence_floor + 0.1)`.
fn predict(count: u32, spread: f64, confidence_floor: f64, rng: &mut impl Rng) -> Prediction {
    let factor = 1.0 + (rng.gen::<f64>() - 0.4) * spread;
    Prediction {
        count: round_half_up(count as f64 * factor).max(0.0) as u32,
        confidence: confidence_floor + rng.gen::<f64>() * 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn gate_one_example() {
        let mut rng = StdRng::seed_from_u64(42);
        let gate = create_gate(1, "40.7495,-73.9685", 45, &mut rng);

        assert_eq!(gate.id, "gate-1");
        assert_eq!(gate.name, "North Exit (Exit 1)");
        assert_eq!(gate.crowd_level, CrowdLevel::Low);
        assert_eq!(gate.crowd_color, "#10b981");
        assert_eq!(gate.metrics.wait_time_seconds, 90);
        assert_eq!(gate.metrics.wait_time_formatted, "2 minutes");
        assert!((gate.metrics.density - 0.23).abs() < 1e-9);
        assert!((gate.metrics.queue_length_meters - 3.6).abs() < 1e-9);
        assert_eq!(gate.status, GateStatus::Active);
        assert!(gate.has_accessibility);
        assert!((gate.location.lat - 40.7495).abs() < 1e-9);
        assert!((gate.location.lon + 73.9685).abs() < 1e-9);
    }

    #[test]
    fn accessibility_only_on_gates_one_and_three() {
        let mut rng = StdRng::seed_from_u64(1);
        let flags: Vec<bool> = (1..=4)
            .map(|n| create_gate(n, "0,0", 100, &mut rng).has_accessibility)
            .collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn sparkline_ends_at_current_and_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in [20, 45, 150, 275, 300] {
            let s = generate_sparkline(count, &mut rng);
            assert_eq!(s.len(), SPARKLINE_POINTS);
            assert_eq!(s[SPARKLINE_POINTS - 1], count);
            assert!(s.iter().all(|&v| (20..=300).contains(&v)), "{s:?}");
        }
    }

    #[test]
    fn predictions_within_spread() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let gate = create_gate(2, "0,0", 200, &mut rng);
            let p5 = gate.prediction.five_min_ahead;
            let p10 = gate.prediction.ten_min_ahead;
            // 200 × [0.92, 1.12) and 200 × [0.88, 1.18)
            assert!((184..=224).contains(&p5.count), "{}", p5.count);
            assert!((176..=236).contains(&p10.count), "{}", p10.count);
            assert!((0.85..0.95).contains(&p5.confidence));
            assert!((0.75..0.85).contains(&p10.confidence));
            assert!((70..=95).contains(&gate.efficiency_percent));
        }
    }

    #[test]
    fn synthesized_gates_are_fixed_and_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        for step in 0..100 {
            let clock = 1_700_000_000_000.0 + step as f64 * 5_000.0;
            let snapshot = synthesize_gates(clock, &mut rng);
            for (i, gate) in snapshot.iter().enumerate() {
                assert_eq!(gate.gate_number as usize, i + 1);
                let base = gates::BASE_COUNTS[i];
                let amp = GATE_WAVES[i].amplitude as i64;
                let jitter = GATE_JITTER[i] as i64;
                let count = gate.people_count() as i64;
                assert!(count >= base - amp && count <= base + amp + jitter, "{count}");
                assert_eq!(gate.crowd_level, gate_crowd_level(gate.people_count()));
                assert_eq!(*gate.trend.sparkline.last().unwrap(), gate.people_count());
            }
        }
    }

    #[test]
    fn seeded_synthesis_is_reproducible() {
        let a = synthesize_gates(1_000.0, &mut StdRng::seed_from_u64(11));
        let b = synthesize_gates(1_000.0, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn waves_sample_expected_shape() {
        let w = Wave::sin(20.0, 10_000.0);
        assert!(w.sample(0.0).abs() < 1e-9);
        let c = Wave::cos(30.0, 8_000.0);
        assert!((c.sample(0.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn geo_point_parsing() {
        assert_eq!(
            GeoPoint::parse("1.5, -2.25"),
            Some(GeoPoint { lat: 1.5, lon: -2.25 })
        );
        assert_eq!(GeoPoint::parse("nope"), None);
        assert_eq!(GeoPoint::parse("1.0,x"), None);
    }

    #[test]
    fn prediction_serializes_with_horizon_keys() {
        let mut rng = StdRng::seed_from_u64(5);
        let gate = create_gate(3, "40.7483,-73.9695", 120, &mut rng);
        let json = serde_json::to_value(&gate).unwrap();
        assert!(json["prediction"]["5_min_ahead"]["count"].is_u64());
        assert!(json["prediction"]["10_min_ahead"]["confidence"].is_f64());
        assert_eq!(json["crowd_level"], "medium");
        assert_eq!(json["status"], "active");
    }
}
