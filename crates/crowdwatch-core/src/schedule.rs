//! Owned periodic tasks with an explicit start/stop lifecycle.
//!
//! A `ScheduledTask` does not run anything itself; it tracks elapsed time and
//! tells its owner when the next period has completed. The owner decides
//! what to run.

/// A fixed-period task driven by externally supplied elapsed time.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    name: &'static str,
    interval_ms: u64,
    elapsed_ms: u64,
    running: bool,
    fire_count: u64,
}

impl ScheduledTask {
    /// Create a stopped task. A zero interval is treated as 1 ms.
    pub fn new(name: &'static str, interval_ms: u64) -> Self {
        Self {
            name,
            interval_ms: interval_ms.max(1),
            elapsed_ms: 0,
            running: false,
            fire_count: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// How many times the task has come due since creation.
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// Start (or restart) the task; the first firing is one full interval away.
    pub fn start(&mut self) {
        self.running = true;
        self.elapsed_ms = 0;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Time left until the next firing.
    pub fn until_due(&self) -> u64 {
        self.interval_ms - self.elapsed_ms
    }

    /// Advance by `delta_ms` (at most [`until_due`](Self::until_due)).
    /// Returns `true` when the task came due. Stopped tasks never fire.
    pub fn advance(&mut self, delta_ms: u64) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed_ms += delta_ms.min(self.until_due());
        if self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms = 0;
            self.fire_count += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let mut task = ScheduledTask::new("motion", 50);
        task.start();
        assert!(!task.advance(49));
        assert_eq!(task.until_due(), 1);
        assert!(task.advance(1));
        assert_eq!(task.until_due(), 50);
        assert_eq!(task.fire_count(), 1);
    }

    #[test]
    fn stopped_task_never_fires() {
        let mut task = ScheduledTask::new("metrics", 10);
        assert!(!task.advance(10));
        task.start();
        task.stop();
        assert!(!task.advance(10));
        assert_eq!(task.fire_count(), 0);
    }

    #[test]
    fn restart_resets_phase() {
        let mut task = ScheduledTask::new("metrics", 100);
        task.start();
        task.advance(70);
        task.stop();
        task.start();
        assert_eq!(task.until_due(), 100);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let task = ScheduledTask::new("busy", 0);
        assert_eq!(task.interval_ms(), 1);
        assert_eq!(task.name(), "busy");
    }
}
