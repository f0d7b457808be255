//! Pure crowd simulation logic for CrowdWatch.
//!
//! This crate holds everything that can be computed without timers, I/O or a
//! renderer. Functions take plain data (plus an injected `rand::Rng` where
//! randomness is involved) and return fresh values, so the same code runs
//! inside the scheduled engine, the headless harness and unit tests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`alerts`] | Prioritized stampede / rerouting advisories from a snapshot |
//! | [`classify`] | Crowd levels, stampede risk, trends, wait-time formatting |
//! | [`constants`] | Venue topology, map geometry, classification thresholds |
//! | [`dashboard`] | Venue-wide stats and exit recommendations |
//! | [`gates`] | Gate occupancy synthesis, sparklines, predictions |
//! | [`halls`] | Hall occupancy synthesis and density classification |
//! | [`motion`] | Attendee traversal state machine (hall → merge → lane → exit) |

pub mod alerts;
pub mod classify;
pub mod constants;
pub mod dashboard;
pub mod gates;
pub mod halls;
pub mod motion;
