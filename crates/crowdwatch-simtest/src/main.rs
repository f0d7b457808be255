//! CrowdWatch Headless Simulation Harness
//!
//! Validates the crowd generators and the scheduled monitor without a
//! display layer. Runs entirely in-process with no networking or rendering.
//!
//! Usage:
//!   cargo run -p crowdwatch-simtest
//!   cargo run -p crowdwatch-simtest -- --verbose
//!   cargo run -p crowdwatch-simtest -- --seed 7 --config monitor.json

use crowdwatch_core::prelude::*;
use crowdwatch_logic::alerts::{best_gate, generate_routing_alert, worst_gate};
use crowdwatch_logic::classify::{
    determine_trend, format_wait_time, gate_crowd_level, hall_crowd_level, stampede_risk,
    wait_time_seconds, CrowdLevel, StampedeRisk, TrendDirection,
};
use crowdwatch_logic::constants::{gates as gate_consts, map, GATE_COUNT};
use crowdwatch_logic::gates::{
    create_gate, generate_sparkline, synthesize_gates, SPARKLINE_MAX, SPARKLINE_MIN,
    SPARKLINE_POINTS,
};
use crowdwatch_logic::halls::{create_hall, synthesize_halls};
use crowdwatch_logic::motion::{advance, hall_interior, initialize_population, phase_counts};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Seed used when none is given on the command line.
const DEFAULT_SEED: u64 = 42;
/// Fixed clock for the monitor runs (2023-11-14T22:13:20Z).
const HARNESS_CLOCK_MS: u64 = 1_700_000_000_000;

fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // RUST_LOG wins; otherwise --verbose shows the monitor's info/warn lines
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { Level::INFO } else { Level::ERROR };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    seed: u64,
    config_path: Option<String>,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        verbose: false,
        seed: DEFAULT_SEED,
        config_path: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                options.seed = value
                    .parse()
                    .map_err(|e| format!("invalid seed {:?}: {}", value, e))?;
            }
            "--config" => {
                options.config_path = Some(args.next().ok_or("--config needs a path")?);
            }
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }
    Ok(options)
}

fn main() {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = init_logging(options.verbose) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let config = match &options.config_path {
        Some(path) => match MonitorConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => MonitorConfig::default(),
    };

    let verbose = options.verbose;
    let seed = options.seed;
    info!(
        "Harness config: population {}, metrics every {} ms, motion every {} ms",
        config.population, config.metrics_interval_ms, config.motion_interval_ms
    );
    println!("=== CrowdWatch Simulation Harness (seed {}) ===\n", seed);

    let mut results = Vec::new();

    // 1. Classification boundaries
    results.extend(validate_classification(verbose));

    // 2. Gate synthesis sweep
    results.extend(validate_gate_synthesis(seed, verbose));

    // 3. Hall synthesis sweep
    results.extend(validate_hall_synthesis(verbose));

    // 4. Attendee motion
    results.extend(validate_motion(seed, config.population, verbose));

    // 5. Alert priority
    results.extend(validate_alerts(seed, verbose));

    // 6. Scheduled monitor
    results.extend(validate_monitor(seed, &config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Classification ───────────────────────────────────────────────────

fn validate_classification(verbose: bool) -> Vec<TestResult> {
    println!("--- Classification ---");
    let mut results = Vec::new();

    let gate_cases = [
        (0, CrowdLevel::Low),
        (79, CrowdLevel::Low),
        (80, CrowdLevel::Medium),
        (149, CrowdLevel::Medium),
        (150, CrowdLevel::High),
        (219, CrowdLevel::High),
        (220, CrowdLevel::Critical),
        (1_000, CrowdLevel::Critical),
    ];
    let bad: Vec<_> = gate_cases
        .iter()
        .filter(|(count, level)| gate_crowd_level(*count) != *level)
        .collect();
    results.push(TestResult {
        name: "gate_level_boundaries".into(),
        passed: bad.is_empty(),
        detail: if bad.is_empty() {
            format!("{} boundary counts classified", gate_cases.len())
        } else {
            format!("misclassified counts: {:?}", bad)
        },
    });

    let hall_cases = [
        (39.9, CrowdLevel::Low, StampedeRisk::Low),
        (40.0, CrowdLevel::Medium, StampedeRisk::Low),
        (59.9, CrowdLevel::Medium, StampedeRisk::Low),
        (60.0, CrowdLevel::High, StampedeRisk::Medium),
        (79.9, CrowdLevel::High, StampedeRisk::Medium),
        (80.0, CrowdLevel::Critical, StampedeRisk::High),
    ];
    let bad: Vec<_> = hall_cases
        .iter()
        .filter(|(d, level, risk)| hall_crowd_level(*d) != *level || stampede_risk(*d) != *risk)
        .collect();
    results.push(TestResult {
        name: "hall_level_and_risk_boundaries".into(),
        passed: bad.is_empty(),
        detail: if bad.is_empty() {
            format!("{} boundary densities classified", hall_cases.len())
        } else {
            format!("misclassified densities: {:?}", bad)
        },
    });

    // Wait floor and formatting
    let wait_ok = wait_time_seconds(0) == 30
        && wait_time_seconds(15) == 30
        && wait_time_seconds(16) == 32
        && wait_time_seconds(45) == 90;
    let fmt_ok = format_wait_time(29) == "<1 minute"
        && format_wait_time(30) == "1 minute"
        && format_wait_time(90) == "2 minutes"
        && format_wait_time(460) == "8 minutes";
    results.push(TestResult {
        name: "wait_time_rules".into(),
        passed: wait_ok && fmt_ok,
        detail: format!("floor ok={}, formatting ok={}", wait_ok, fmt_ok),
    });

    let trend_cases = [
        (vec![100, 111], TrendDirection::Increasing),
        (vec![100, 108], TrendDirection::Stable),
        (vec![100, 89], TrendDirection::Decreasing),
        (vec![0, 50], TrendDirection::Stable),
    ];
    let bad: Vec<_> = trend_cases
        .iter()
        .filter(|(line, dir)| determine_trend(line).0 != *dir)
        .collect();
    results.push(TestResult {
        name: "trend_direction".into(),
        passed: bad.is_empty(),
        detail: if bad.is_empty() {
            "increasing/stable/decreasing thresholds at ±10%".into()
        } else {
            format!("wrong trends: {:?}", bad)
        },
    });

    if verbose {
        println!("  classification checks: {}", results.len());
    }
    results
}

// ── 2. Gate Synthesis ───────────────────────────────────────────────────

fn validate_gate_synthesis(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Gate Synthesis ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    // Worked example: gate 1 at 45 people
    let gate = create_gate(1, "40.7495,-73.9685", 45, &mut rng);
    let example_ok = gate.crowd_level == CrowdLevel::Low
        && gate.wait_time_seconds() == 90
        && gate.metrics.wait_time_formatted == "2 minutes"
        && gate.has_accessibility
        && gate.name == "North Exit (Exit 1)";
    results.push(TestResult {
        name: "gate_one_example".into(),
        passed: example_ok,
        detail: format!(
            "{} {:?} {} ({})",
            gate.name, gate.crowd_level, gate.wait_time_seconds(), gate.metrics.wait_time_formatted
        ),
    });

    // Sparkline invariants over many counts
    let mut sparkline_failures = Vec::new();
    for current in (0..=400).step_by(7) {
        let line = generate_sparkline(current, &mut rng);
        let len_ok = line.len() == SPARKLINE_POINTS;
        let last_ok = line.last() == Some(&current);
        let bounds_ok = line[..line.len().saturating_sub(1)]
            .iter()
            .all(|&v| (SPARKLINE_MIN..=SPARKLINE_MAX).contains(&(v as f64)));
        if !(len_ok && last_ok && bounds_ok) {
            sparkline_failures.push(current);
        }
    }
    results.push(TestResult {
        name: "sparkline_invariants".into(),
        passed: sparkline_failures.is_empty(),
        detail: if sparkline_failures.is_empty() {
            "10 points, bounded, ending at current".into()
        } else {
            format!("bad sparklines for counts {:?}", sparkline_failures)
        },
    });

    // One hour of 5 s ticks
    let mut inconsistent = 0;
    let mut min_count = u32::MAX;
    let mut max_count = 0;
    for tick in 0..720u64 {
        let clock = (HARNESS_CLOCK_MS + tick * 5_000) as f64;
        let snapshot = synthesize_gates(clock, &mut rng);
        for (gate, &number) in snapshot.iter().zip(gate_consts::ALL.iter()) {
            min_count = min_count.min(gate.people_count());
            max_count = max_count.max(gate.people_count());
            let consistent = gate.gate_number == number
                && gate.crowd_level == gate_crowd_level(gate.people_count())
                && gate.wait_time_seconds() == wait_time_seconds(gate.people_count())
                && gate.has_accessibility == gate_consts::has_accessibility(number)
                && (70..=95).contains(&gate.efficiency_percent);
            if !consistent {
                inconsistent += 1;
            }
        }
    }
    results.push(TestResult {
        name: "gate_sweep_consistency".into(),
        passed: inconsistent == 0,
        detail: format!(
            "{} gate samples, {} inconsistent, counts {}..={}",
            720 * GATE_COUNT,
            inconsistent,
            min_count,
            max_count
        ),
    });

    if verbose {
        println!("  gate counts ranged {}..={}", min_count, max_count);
    }
    results
}

// ── 3. Hall Synthesis ───────────────────────────────────────────────────

fn validate_hall_synthesis(verbose: bool) -> Vec<TestResult> {
    println!("--- Hall Synthesis ---");
    let mut results = Vec::new();

    let hall = create_hall(1, 180);
    results.push(TestResult {
        name: "hall_one_example".into(),
        passed: (hall.density_percent - 45.0).abs() < 1e-9
            && hall.crowd_level == CrowdLevel::Medium
            && hall.stampede_risk == StampedeRisk::Low,
        detail: format!(
            "{:.1}% {:?} risk {:?}",
            hall.density_percent, hall.crowd_level, hall.stampede_risk
        ),
    });

    // Halls are deterministic in the clock and consistent with their density
    let mut mismatched = 0;
    let mut high_risk_ticks = 0;
    for tick in 0..720u64 {
        let clock = (HARNESS_CLOCK_MS + tick * 5_000) as f64;
        let a = synthesize_halls(clock);
        let b = synthesize_halls(clock);
        if a != b {
            mismatched += 1;
        }
        for hall in &a {
            let expected = stampede_risk(hall.current_count as f64 / hall.capacity as f64 * 100.0);
            if hall.stampede_risk != expected || hall.capacity != 400 {
                mismatched += 1;
            }
        }
        if a.iter().any(|h| h.is_high_risk()) {
            high_risk_ticks += 1;
        }
    }
    results.push(TestResult {
        name: "hall_sweep_deterministic".into(),
        passed: mismatched == 0,
        detail: format!(
            "720 ticks, {} mismatches, {} ticks with a high-risk hall",
            mismatched, high_risk_ticks
        ),
    });

    if verbose {
        println!("  high-risk ticks: {}", high_risk_ticks);
    }
    results
}

// ── 4. Motion ───────────────────────────────────────────────────────────

fn validate_motion(seed: u64, population: usize, verbose: bool) -> Vec<TestResult> {
    println!("--- Attendee Motion ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut people = initialize_population(population, &mut rng);
    let spawned_in_hall = people
        .iter()
        .all(|p| p.phase == Phase::InHall && hall_interior(p.hall).contains(p.x, p.y));
    results.push(TestResult {
        name: "spawn_inside_halls".into(),
        passed: people.len() == population && spawned_in_hall,
        detail: format!("{} attendees spawned", people.len()),
    });

    // Two simulated minutes at 20 FPS
    let mut conserved = true;
    let mut out_of_bounds = 0;
    let mut stray_in_hall = 0;
    for _ in 0..2_400 {
        people = advance(&people, &mut rng);
        conserved &= people.len() == population;
        for p in &people {
            if !(0.0..=map::SIZE).contains(&p.x) || !(0.0..=map::SIZE).contains(&p.y) {
                out_of_bounds += 1;
            }
            if p.phase == Phase::InHall && !hall_interior(p.hall).contains(p.x, p.y) {
                stray_in_hall += 1;
            }
        }
    }

    results.push(TestResult {
        name: "population_conserved".into(),
        passed: conserved,
        detail: format!("{} attendees after 2400 frames", people.len()),
    });
    results.push(TestResult {
        name: "positions_on_map".into(),
        passed: out_of_bounds == 0,
        detail: format!("{} out-of-bounds samples", out_of_bounds),
    });
    results.push(TestResult {
        name: "in_hall_stays_inside".into(),
        passed: stray_in_hall == 0,
        detail: format!("{} in-hall samples outside their hall", stray_in_hall),
    });

    let [in_hall, merging, in_lane, at_exit] = phase_counts(&people);
    results.push(TestResult {
        name: "attendees_reach_exits".into(),
        passed: at_exit > 0,
        detail: format!(
            "in_hall={} merging={} in_lane={} at_exit={}",
            in_hall, merging, in_lane, at_exit
        ),
    });

    if verbose {
        println!(
            "  phases after 2 min: {} / {} / {} / {}",
            in_hall, merging, in_lane, at_exit
        );
    }
    results
}

// ── 5. Alerts ───────────────────────────────────────────────────────────

fn validate_alerts(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Alert Generation ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let gates: Vec<Gate> = [45, 230, 125, 112]
        .iter()
        .zip(gate_consts::ALL)
        .map(|(&count, n)| {
            let coordinates = gate_consts::COORDINATES[n as usize - 1];
            create_gate(n, coordinates, count, &mut rng)
        })
        .collect();
    let calm: Vec<Hall> = (1..=4).map(|n| create_hall(n, 100)).collect();

    let reroute = generate_routing_alert(&gates, &calm, HARNESS_CLOCK_MS);
    results.push(TestResult {
        name: "baseline_reroute".into(),
        passed: matches!(
            &reroute,
            Some(a) if a.kind == AlertKind::Routing
                && a.severity == Severity::High
                && a.suggested_exit == 1
        ),
        detail: reroute
            .as_ref()
            .map(|a| a.message.clone())
            .unwrap_or_else(|| "no alert".into()),
    });

    let mut crowded = calm.clone();
    crowded[2] = create_hall(3, 330);
    let stampede = generate_routing_alert(&gates, &crowded, HARNESS_CLOCK_MS);
    results.push(TestResult {
        name: "stampede_preempts_routing".into(),
        passed: matches!(
            &stampede,
            Some(a) if a.kind == AlertKind::Stampede
                && a.severity == Severity::Critical
                && a.message.contains("Hall 3")
        ),
        detail: stampede
            .as_ref()
            .map(|a| a.message.clone())
            .unwrap_or_else(|| "no alert".into()),
    });

    // Over an hour of synthesized snapshots every alert must point at the best gate
    let mut alerts = 0;
    let mut wrong_exit = 0;
    for tick in 0..720u64 {
        let clock_ms = HARNESS_CLOCK_MS + tick * 5_000;
        let gates = synthesize_gates(clock_ms as f64, &mut rng);
        let halls = synthesize_halls(clock_ms as f64);
        if let Some(alert) = generate_routing_alert(&gates, &halls, clock_ms) {
            alerts += 1;
            let best = best_gate(&gates).map(|g| g.gate_number);
            let routing_ok = alert.kind != AlertKind::Routing
                || worst_gate(&gates).map(|g| g.crowd_level >= CrowdLevel::High) == Some(true);
            if Some(alert.suggested_exit) != best || !routing_ok {
                wrong_exit += 1;
            }
        }
    }
    results.push(TestResult {
        name: "alerts_suggest_best_gate".into(),
        passed: wrong_exit == 0,
        detail: format!("{} alerts over 720 ticks, {} inconsistent", alerts, wrong_exit),
    });

    if verbose {
        println!("  alerts raised: {}", alerts);
    }
    results
}

// ── 6. Monitor ──────────────────────────────────────────────────────────

fn validate_monitor(seed: u64, config: &MonitorConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Scheduled Monitor ---");
    let mut results = Vec::new();

    let config = config
        .clone()
        .with_seed(config.seed.unwrap_or(seed))
        .with_start_clock(config.start_clock_ms.unwrap_or(HARNESS_CLOCK_MS));
    let start_clock = config.start_clock_ms.unwrap_or(HARNESS_CLOCK_MS);
    let metrics_interval = config.metrics_interval_ms;
    let motion_interval = config.motion_interval_ms;

    let mut monitor = match CrowdMonitor::new(config) {
        Ok(m) => m,
        Err(e) => {
            results.push(TestResult {
                name: "monitor_create".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    monitor.start();

    // 60 s of 16 ms host frames
    let elapsed: u64 = 3_750 * 16;
    for _ in 0..3_750 {
        monitor.update(16);
    }
    let scale = monitor.time_scale() as f64;
    let scaled = (elapsed as f64 * scale).floor() as u64;
    results.push(TestResult {
        name: "metrics_cadence".into(),
        passed: monitor.metrics_ticks() == scaled / metrics_interval,
        detail: format!(
            "{} ticks over {} ms (interval {} ms)",
            monitor.metrics_ticks(),
            scaled,
            metrics_interval
        ),
    });
    results.push(TestResult {
        name: "motion_cadence".into(),
        passed: monitor.motion_frames() == scaled / motion_interval,
        detail: format!(
            "{} frames over {} ms (interval {} ms)",
            monitor.motion_frames(),
            scaled,
            motion_interval
        ),
    });

    monitor.stop();
    let frozen = (monitor.clock_ms(), monitor.metrics_ticks(), monitor.motion_frames());
    monitor.update(30_000);
    results.push(TestResult {
        name: "stop_halts_tasks".into(),
        passed: frozen == (monitor.clock_ms(), monitor.metrics_ticks(), monitor.motion_frames()),
        detail: format!("clock held at +{} ms", monitor.clock_ms() - start_clock),
    });

    monitor.dismiss_alert();
    results.push(TestResult {
        name: "dismiss_clears_alert".into(),
        passed: monitor.current_alert().is_none(),
        detail: "held alert cleared".into(),
    });

    let snapshot = monitor.snapshot();
    let export = snapshot
        .to_json()
        .and_then(|json| DashboardSnapshot::from_json(&json));
    results.push(TestResult {
        name: "snapshot_json_export".into(),
        passed: matches!(&export, Ok(parsed) if *parsed == snapshot),
        detail: match &export {
            Ok(parsed) => format!(
                "{} gates, {} halls, {} attendees, risk {:?}",
                parsed.gates.len(),
                parsed.halls.len(),
                parsed.people.len(),
                parsed.stats.risk_level
            ),
            Err(e) => e.to_string(),
        },
    });

    if verbose {
        println!(
            "  monitor: {} ticks, {} frames, best exit {:?}",
            monitor.metrics_ticks(),
            monitor.motion_frames(),
            snapshot.stats.best_exit
        );
    }
    results
}
