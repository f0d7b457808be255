//! Integration tests for the full venue pipeline.
//!
//! Exercises: synthesize_gates + synthesize_halls → generate_routing_alert
//! → venue_stats / recommend_exit, alongside the attendee motion loop.
//!
//! All tests are pure logic, with no timers and no rendering.

use crowdwatch_logic::alerts::{best_gate, generate_routing_alert, AlertKind, Severity};
use crowdwatch_logic::classify::{gate_crowd_level, CrowdLevel};
use crowdwatch_logic::constants::{gates, map, GATE_COUNT, HALL_COUNT, POPULATION_SIZE};
use crowdwatch_logic::dashboard::{recommend_exit, venue_stats, RiskLevel};
use crowdwatch_logic::gates::{create_gate, synthesize_gates, Gate};
use crowdwatch_logic::halls::{create_hall, synthesize_halls, Hall};
use crowdwatch_logic::motion::{
    advance, hall_interior, initialize_population, phase_counts, Phase,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

const CLOCK: u64 = 1_700_000_000_000;

fn baseline_gates(rng: &mut StdRng) -> Vec<Gate> {
    gates::ALL
        .iter()
        .zip([45, 230, 125, 112])
        .map(|(&n, count)| create_gate(n, gates::COORDINATES[n as usize - 1], count, rng))
        .collect()
}

fn halls_with(counts: [u32; 4]) -> Vec<Hall> {
    (1..=4u8).zip(counts).map(|(n, c)| create_hall(n, c)).collect()
}

// ── Snapshot → alert → dashboard ──────────────────────────────────────

#[test]
fn test_baseline_snapshot_pipeline() {
    let mut rng = StdRng::seed_from_u64(42);
    let gates = baseline_gates(&mut rng);
    let halls = halls_with([180, 200, 150, 250]);

    let alert = generate_routing_alert(&gates, &halls, CLOCK).expect("reroute expected");
    assert_eq!(alert.kind, AlertKind::Routing);
    assert_eq!(alert.severity, Severity::High);
    assert_eq!(alert.suggested_exit, 1);

    let stats = venue_stats(&gates, &halls);
    assert_eq!(stats.best_exit, Some(alert.suggested_exit));
    assert_eq!(stats.risk_level, RiskLevel::Low);
    assert!(stats.high_risk_halls.is_empty());

    let best = best_gate(&gates).unwrap();
    let rec = recommend_exit(best, &gates);
    assert_eq!(rec.gate_number, 1);
    assert_eq!(rec.wait_time_formatted, "2 minutes");
    assert_eq!(rec.compared_to.as_deref(), Some("East Exit (Exit 2)"));
}

#[test]
fn test_stampede_snapshot_pipeline() {
    let mut rng = StdRng::seed_from_u64(42);
    let gates = baseline_gates(&mut rng);
    let halls = halls_with([180, 340, 150, 320]);

    let alert = generate_routing_alert(&gates, &halls, CLOCK).unwrap();
    assert_eq!(alert.kind, AlertKind::Stampede);
    assert_eq!(alert.severity, Severity::Critical);
    assert_eq!(
        alert.message,
        "⚠️ High stampede risk in Hall 2, Hall 4! Avoid these areas."
    );

    let stats = venue_stats(&gates, &halls);
    assert_eq!(stats.high_risk_halls, vec![2, 4]);
    assert_eq!(stats.risk_level, RiskLevel::High);
}

#[test]
fn test_synthesized_snapshots_over_an_hour() {
    let mut rng = StdRng::seed_from_u64(7);

    for tick in 0..720u64 {
        let clock_ms = CLOCK + tick * 5_000;
        let gates = synthesize_gates(clock_ms as f64, &mut rng);
        let halls = synthesize_halls(clock_ms as f64);
        assert_eq!(gates.len(), GATE_COUNT);
        assert_eq!(halls.len(), HALL_COUNT);

        for gate in &gates {
            assert_eq!(gate.crowd_level, gate_crowd_level(gate.people_count()));
            assert!(gate.wait_time_seconds() >= 30);
        }

        let stats = venue_stats(&gates, &halls);
        let expected_risk = if halls.iter().any(Hall::is_high_risk) {
            RiskLevel::High
        } else {
            RiskLevel::Low
        };
        assert_eq!(stats.risk_level, expected_risk);

        if let Some(alert) = generate_routing_alert(&gates, &halls, clock_ms) {
            assert_eq!(alert.timestamp, clock_ms);
            assert_eq!(Some(alert.suggested_exit), stats.best_exit);
            if alert.kind == AlertKind::Routing {
                let best = best_gate(&gates).unwrap();
                assert_eq!(best.crowd_level, CrowdLevel::Low);
            }
        }
    }
}

#[test]
fn test_same_seed_same_snapshot() {
    let mut a = StdRng::seed_from_u64(99);
    let mut b = StdRng::seed_from_u64(99);
    assert_eq!(
        synthesize_gates(CLOCK as f64, &mut a),
        synthesize_gates(CLOCK as f64, &mut b)
    );
}

// ── Motion loop ────────────────────────────────────────────────────────

#[test]
fn test_full_population_traverses_venue() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut people = initialize_population(POPULATION_SIZE, &mut rng);
    assert_eq!(phase_counts(&people), [POPULATION_SIZE, 0, 0, 0]);

    let mut seen_at_exit = false;
    for _ in 0..2_000 {
        people = advance(&people, &mut rng);
        assert_eq!(people.len(), POPULATION_SIZE);
        seen_at_exit |= people.iter().any(|p| p.phase == Phase::AtExit);
    }
    assert!(seen_at_exit);

    for (i, p) in people.iter().enumerate() {
        assert_eq!(p.id, format!("person-{}", i));
        assert!((0.0..=map::SIZE).contains(&p.x));
        assert!((0.0..=map::SIZE).contains(&p.y));
        if p.phase == Phase::InHall {
            assert!(hall_interior(p.hall).contains(p.x, p.y));
        }
    }
    assert_eq!(phase_counts(&people).iter().sum::<usize>(), POPULATION_SIZE);
}
