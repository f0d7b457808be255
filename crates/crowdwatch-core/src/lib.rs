//! CrowdWatch Core - venue crowd monitor engine
//!
//! Drives the pure generators in `crowdwatch-logic` on two fixed cadences:
//! - **Metrics** (every 5 s): regenerate gate and hall snapshots, evaluate alerts
//! - **Motion** (every 50 ms): advance every attendee one frame
//!
//! # Example
//!
//! ```rust,no_run
//! use crowdwatch_core::prelude::*;
//!
//! let mut monitor = CrowdMonitor::new(MonitorConfig::default().with_seed(42))?;
//! monitor.start();
//!
//! loop {
//!     monitor.update(16); // ~60 FPS host loop
//!     if let Some(alert) = monitor.current_alert() {
//!         println!("{}", alert.message);
//!     }
//! }
//! # Ok::<(), crowdwatch_core::error::MonitorError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod snapshot;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::MonitorConfig;
    pub use crate::engine::CrowdMonitor;
    pub use crate::error::MonitorError;
    pub use crate::snapshot::DashboardSnapshot;
    pub use crowdwatch_logic::alerts::{Alert, AlertKind, Severity};
    pub use crowdwatch_logic::gates::Gate;
    pub use crowdwatch_logic::halls::Hall;
    pub use crowdwatch_logic::motion::{CrowdPerson, Phase};
}
