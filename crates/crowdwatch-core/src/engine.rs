//! Crowd monitor - owns the venue state and the two periodic tasks driving it

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crowdwatch_logic::alerts::{generate_routing_alert, Alert, Severity};
use crowdwatch_logic::gates::{synthesize_gates, Gate};
use crowdwatch_logic::halls::{synthesize_halls, Hall};
use crowdwatch_logic::motion::{advance, initialize_population, CrowdPerson};

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::schedule::ScheduledTask;
use crate::snapshot::DashboardSnapshot;

/// Main simulation engine.
///
/// Time only moves through [`update`](Self::update); the monitor never reads
/// the system clock after construction, so a seeded monitor is reproducible.
pub struct CrowdMonitor {
    config: MonitorConfig,
    rng: StdRng,
    /// Wall-clock reading in ms since the Unix epoch
    clock_ms: u64,
    gates: Vec<Gate>,
    halls: Vec<Hall>,
    people: Vec<CrowdPerson>,
    current_alert: Option<Alert>,

    // Update timing
    metrics_task: ScheduledTask,
    motion_task: ScheduledTask,
    /// Sub-millisecond remainder left over by a fractional time scale
    carry_ms: f64,

    time_scale: f32,
}

impl CrowdMonitor {
    /// Create a stopped monitor. Gates, halls and attendees stay empty until
    /// [`start`](Self::start).
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let clock_ms = config.start_clock_ms.unwrap_or_else(system_clock_ms);

        Ok(Self {
            rng,
            clock_ms,
            gates: Vec::new(),
            halls: Vec::new(),
            people: Vec::new(),
            current_alert: None,
            metrics_task: ScheduledTask::new("metrics", config.metrics_interval_ms),
            motion_task: ScheduledTask::new("motion", config.motion_interval_ms),
            carry_ms: 0.0,
            time_scale: config.time_scale,
            config,
        })
    }

    /// Render the initial state and start both tasks.
    ///
    /// The first start spawns the population; a restart after [`stop`](Self::stop)
    /// keeps the attendees where they were. Either way a fresh gate/hall
    /// snapshot is synthesized without evaluating alerts.
    pub fn start(&mut self) {
        if self.is_running() {
            log::warn!("Crowd monitor already running");
            return;
        }

        if self.people.is_empty() {
            self.people = initialize_population(self.config.population, &mut self.rng);
        }
        self.synthesize_metrics();

        self.metrics_task.start();
        self.motion_task.start();
        self.carry_ms = 0.0;

        log::info!(
            "Crowd monitor started: {} attendees, metrics every {} ms, motion every {} ms",
            self.people.len(),
            self.metrics_task.interval_ms(),
            self.motion_task.interval_ms()
        );
    }

    /// Halt both tasks. State is kept; `update` becomes a no-op.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.metrics_task.stop();
        self.motion_task.stop();
        log::info!(
            "Crowd monitor stopped after {} metrics ticks, {} motion frames",
            self.metrics_task.fire_count(),
            self.motion_task.fire_count()
        );
    }

    pub fn is_running(&self) -> bool {
        self.metrics_task.is_running() && self.motion_task.is_running()
    }

    /// Advance the monitor by `delta_ms` of real time (scaled by the time
    /// scale). Each task runs once per interval that completes inside the
    /// step; when both come due at the same instant motion runs first.
    pub fn update(&mut self, delta_ms: u64) {
        if !self.is_running() {
            return;
        }

        let scaled = delta_ms as f64 * self.time_scale as f64 + self.carry_ms;
        let mut remaining = scaled.floor() as u64;
        self.carry_ms = scaled - scaled.floor();

        while remaining > 0 {
            let step = remaining
                .min(self.motion_task.until_due())
                .min(self.metrics_task.until_due());
            self.clock_ms += step;
            remaining -= step;

            if self.motion_task.advance(step) {
                self.people = advance(&self.people, &mut self.rng);
            }
            if self.metrics_task.advance(step) {
                self.run_metrics_tick();
            }
        }
    }

    /// Regenerate gates and halls, then evaluate alerts against them.
    fn run_metrics_tick(&mut self) {
        self.synthesize_metrics();
        self.evaluate_alerts();
    }

    /// A new alert replaces the held one; no alert leaves it in place.
    fn evaluate_alerts(&mut self) {
        match generate_routing_alert(&self.gates, &self.halls, self.clock_ms) {
            Some(alert) => {
                if alert.severity >= Severity::High {
                    log::warn!("{:?} alert ({:?}): {}", alert.kind, alert.severity, alert.message);
                } else {
                    log::info!("{:?} alert ({:?}): {}", alert.kind, alert.severity, alert.message);
                }
                self.current_alert = Some(alert);
            }
            None => log::debug!("No new alert at {}", self.clock_ms),
        }
    }

    fn synthesize_metrics(&mut self) {
        let clock = self.clock_ms as f64;
        self.gates = synthesize_gates(clock, &mut self.rng).to_vec();
        self.halls = synthesize_halls(clock).to_vec();

        log::debug!(
            "Metrics at {}: gates {:?}, halls {:?}",
            self.clock_ms,
            self.gates.iter().map(Gate::people_count).collect::<Vec<_>>(),
            self.halls.iter().map(|h| h.current_count).collect::<Vec<_>>()
        );
    }

    /// Clear the held alert.
    pub fn dismiss_alert(&mut self) {
        if let Some(alert) = self.current_alert.take() {
            log::debug!("Dismissed {}", alert.id);
        }
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn halls(&self) -> &[Hall] {
        &self.halls
    }

    pub fn people(&self) -> &[CrowdPerson] {
        &self.people
    }

    pub fn current_alert(&self) -> Option<&Alert> {
        self.current_alert.as_ref()
    }

    /// Number of metrics ticks run since construction (the initial render
    /// in `start` is not counted).
    pub fn metrics_ticks(&self) -> u64 {
        self.metrics_task.fire_count()
    }

    /// Number of motion frames run since construction.
    pub fn motion_frames(&self) -> u64 {
        self.motion_task.fire_count()
    }

    /// Bundle the current state for a display layer.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::capture(
            self.clock_ms,
            &self.gates,
            &self.halls,
            &self.people,
            self.current_alert.as_ref(),
        )
    }
}

fn system_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdwatch_logic::alerts::AlertKind;
    use crowdwatch_logic::gates::create_gate;
    use crowdwatch_logic::halls::create_hall;

    fn test_config() -> MonitorConfig {
        MonitorConfig {
            population: 40,
            ..Default::default()
        }
        .with_seed(42)
        .with_start_clock(1_700_000_000_000)
    }

    #[test]
    fn test_monitor_creation() {
        let monitor = CrowdMonitor::new(test_config()).unwrap();
        assert!(!monitor.is_running());
        assert!(monitor.gates().is_empty());
        assert!(monitor.halls().is_empty());
        assert!(monitor.people().is_empty());
        assert!(monitor.current_alert().is_none());
        assert_eq!(monitor.clock_ms(), 1_700_000_000_000);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = MonitorConfig {
            metrics_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            CrowdMonitor::new(config),
            Err(MonitorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_update_before_start_is_noop() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.update(10_000);
        assert_eq!(monitor.clock_ms(), 1_700_000_000_000);
        assert_eq!(monitor.motion_frames(), 0);
    }

    #[test]
    fn test_start_renders_initial_state() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.start();

        assert!(monitor.is_running());
        assert_eq!(monitor.gates().len(), 4);
        assert_eq!(monitor.halls().len(), 4);
        assert_eq!(monitor.people().len(), 40);
        assert!(monitor.current_alert().is_none());
        assert_eq!(monitor.metrics_ticks(), 0);
    }

    #[test]
    fn test_task_cadence() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.start();

        monitor.update(5_000);
        assert_eq!(monitor.motion_frames(), 100);
        assert_eq!(monitor.metrics_ticks(), 1);

        // Odd-sized steps still land on the same totals
        for _ in 0..1_000 {
            monitor.update(7);
        }
        assert_eq!(monitor.clock_ms(), 1_700_000_000_000 + 12_000);
        assert_eq!(monitor.motion_frames(), 240);
        assert_eq!(monitor.metrics_ticks(), 2);
        assert_eq!(monitor.people().len(), 40);
    }

    #[test]
    fn test_time_scale() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.set_time_scale(2.0);
        monitor.start();

        monitor.update(2_500); // 2.5 real seconds = 5 sim seconds
        assert_eq!(monitor.metrics_ticks(), 1);
        assert_eq!(monitor.motion_frames(), 100);

        monitor.set_time_scale(-3.0);
        assert_eq!(monitor.time_scale(), 0.0);
        monitor.update(60_000);
        assert_eq!(monitor.metrics_ticks(), 1);
    }

    #[test]
    fn test_fractional_time_scale_carries_remainder() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.set_time_scale(0.5);
        monitor.start();

        for _ in 0..100 {
            monitor.update(1);
        }
        assert_eq!(monitor.clock_ms(), 1_700_000_000_000 + 50);
        assert_eq!(monitor.motion_frames(), 1);
    }

    #[test]
    fn test_stop_halts_both_tasks() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.start();
        monitor.update(5_000);
        monitor.stop();

        let clock = monitor.clock_ms();
        monitor.update(60_000);
        assert!(!monitor.is_running());
        assert_eq!(monitor.clock_ms(), clock);
        assert_eq!(monitor.metrics_ticks(), 1);
        assert_eq!(monitor.motion_frames(), 100);

        // Restart keeps the population
        let people = monitor.people().to_vec();
        monitor.start();
        assert_eq!(monitor.people(), people.as_slice());
    }

    fn held_alert() -> Alert {
        Alert {
            id: "alert-1".into(),
            kind: AlertKind::Routing,
            severity: Severity::High,
            message: "🚨 Exit 2 is overcrowded! Use Exit 1 instead (2 minutes wait).".into(),
            suggested_exit: 1,
            timestamp: 1,
            active: true,
        }
    }

    fn set_snapshot(monitor: &mut CrowdMonitor, gate_counts: [u32; 4], hall_counts: [u32; 4]) {
        let mut rng = StdRng::seed_from_u64(0);
        monitor.gates = (1..=4u8)
            .zip(gate_counts)
            .map(|(n, c)| create_gate(n, "40.7495,-73.9685", c, &mut rng))
            .collect();
        monitor.halls = (1..=4u8).zip(hall_counts).map(|(n, c)| create_hall(n, c)).collect();
    }

    #[test]
    fn test_quiet_snapshot_keeps_held_alert() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.current_alert = Some(held_alert());

        // No low gate and no high-risk hall: nothing new to report
        set_snapshot(&mut monitor, [100, 120, 125, 112], [100, 100, 100, 100]);
        monitor.evaluate_alerts();
        assert_eq!(monitor.current_alert(), Some(&held_alert()));

        // Same with nothing held
        monitor.dismiss_alert();
        monitor.evaluate_alerts();
        assert!(monitor.current_alert().is_none());
    }

    #[test]
    fn test_new_alert_replaces_held_alert() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.current_alert = Some(held_alert());

        set_snapshot(&mut monitor, [45, 230, 125, 112], [180, 340, 150, 100]);
        monitor.evaluate_alerts();

        let alert = monitor.current_alert().unwrap();
        assert_eq!(alert.kind, AlertKind::Stampede);
        assert_eq!(alert.timestamp, 1_700_000_000_000);
        assert_eq!(alert.id, "alert-1700000000000");
    }

    #[test]
    fn test_dismiss_alert() {
        let mut monitor = CrowdMonitor::new(test_config()).unwrap();
        monitor.current_alert = Some(held_alert());

        monitor.dismiss_alert();
        assert!(monitor.current_alert().is_none());
        monitor.dismiss_alert();
        assert!(monitor.current_alert().is_none());
    }

    #[test]
    fn test_seeded_monitors_agree() {
        let mut a = CrowdMonitor::new(test_config()).unwrap();
        let mut b = CrowdMonitor::new(test_config()).unwrap();
        a.start();
        b.start();
        a.update(11_000);
        b.update(11_000);
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
