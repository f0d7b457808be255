//! Attendee motion - a per-person traversal state machine over the venue map.
//!
//! Every attendee walks the same four-phase route:
//!
//! ```text
//! InHall ──► Merging ──► InLane ──► AtExit ──(p = 0.005 per frame)──► InHall
//!  toward      toward      along the    idle in the exit
//!  merge pt    center      exit lane    catchment zone
//! ```
//!
//! Each frame: steer (velocity from phase), integrate (`pos += vel`), clamp
//! to the map, then evaluate the phase transition on the new position.
//! Attendees never interact; the population size never changes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::map;

/// Chance per frame that an attendee idling at an exit re-enters a hall.
pub const RECYCLE_PROBABILITY: f64 = 0.005;
/// Distance to the hall merge point that counts as merged.
pub const MERGE_RADIUS: f32 = 10.0;
/// Distance to the map center that counts as reaching the lane junction.
pub const CENTER_RADIUS: f32 = 5.0;
/// Cross-axis offset from the lane beyond which attendees re-center first.
pub const LANE_TOLERANCE: f32 = 15.0;
/// Proportional gain of the lane re-centering correction.
pub const LANE_GAIN: f32 = 0.1;
/// Lane speed relative to an attendee's base speed.
pub const LANE_SPEED_FACTOR: f32 = 1.5;
/// Per-axis random drift while idling at an exit.
pub const EXIT_JITTER: f32 = 0.25;
/// Pull back toward the exit catchment zone.
pub const EXIT_CENTERING: f32 = 0.2;

/// Traversal phase of one attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InHall,
    Merging,
    InLane,
    AtExit,
}

/// One simulated attendee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdPerson {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Hall the attendee started from (1..=4).
    pub hall: u8,
    /// Exit the attendee is heading for (1..=4).
    #[serde(rename = "targetExit")]
    pub target_exit: u8,
    /// Base walking speed in map units per frame, fixed at spawn.
    pub speed: f32,
    #[serde(rename = "status")]
    pub phase: Phase,
}

/// Axis-aligned rectangle on the venue map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Zone {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }
    pub fn min_y(&self) -> f32 {
        self.y
    }
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink by `padding` on every side.
    pub fn inset(&self, padding: f32) -> Self {
        Self::new(
            self.x + padding,
            self.y + padding,
            self.width - 2.0 * padding,
            self.height - 2.0 * padding,
        )
    }

    /// Check if a point is inside (edges inclusive).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x() && x <= self.max_x() && y >= self.min_y() && y <= self.max_y()
    }
}

/// Clamp a hall/exit number into the 1..=4 tables.
fn slot(number: u8) -> usize {
    number.clamp(1, 4) as usize - 1
}

/// Full 240×240 footprint of a hall.
pub fn hall_zone(hall: u8) -> Zone {
    let (x, y) = map::HALL_ORIGINS[slot(hall)];
    Zone::new(x, y, map::HALL_SIZE, map::HALL_SIZE)
}

/// The part of a hall attendees may occupy while `InHall`.
pub fn hall_interior(hall: u8) -> Zone {
    hall_zone(hall).inset(map::WALL_PADDING)
}

pub fn merge_point(hall: u8) -> (f32, f32) {
    map::MERGE_POINTS[slot(hall)]
}

pub fn entry_point(hall: u8) -> (f32, f32) {
    map::ENTRY_POINTS[slot(hall)]
}

/// Catchment rectangle where arrived attendees idle.
pub fn exit_zone(exit: u8) -> Zone {
    let (x, y, w, h) = map::EXIT_ZONES[slot(exit)];
    Zone::new(x, y, w, h)
}

/// Unit direction of travel along an exit's lane: exit 1 north, 2 east,
/// 3 south, 4 west (screen coordinates, y grows downward).
pub fn exit_direction(exit: u8) -> (f32, f32) {
    match slot(exit) {
        0 => (0.0, -1.0),
        1 => (1.0, 0.0),
        2 => (0.0, 1.0),
        _ => (-1.0, 0.0),
    }
}

/// Whether a position has crossed the arrival threshold of an exit.
pub fn has_reached_exit(exit: u8, x: f32, y: f32) -> bool {
    let far = map::SIZE - map::EXIT_MARGIN;
    match slot(exit) {
        0 => y < map::EXIT_MARGIN,
        1 => x > far,
        2 => y > far,
        _ => x < map::EXIT_MARGIN,
    }
}

fn distance(x: f32, y: f32, to: (f32, f32)) -> f32 {
    ((to.0 - x).powi(2) + (to.1 - y).powi(2)).sqrt()
}

/// Velocity of magnitude `speed` from (x, y) toward `target`.
fn seek(x: f32, y: f32, target: (f32, f32), speed: f32) -> (f32, f32) {
    let dx = target.0 - x;
    let dy = target.1 - y;
    let len = (dx * dx + dy * dy).sqrt();
    if len > 0.0 {
        (dx / len * speed, dy / len * speed)
    } else {
        (0.0, 0.0)
    }
}

impl CrowdPerson {
    /// Spawn attendee `index` at a random spot inside a random hall.
    pub fn spawn(index: usize, rng: &mut impl Rng) -> Self {
        let hall = rng.gen_range(1..=4u8);
        let target_exit = rng.gen_range(1..=4u8);
        let interior = hall_interior(hall);

        let x = interior.min_x() + rng.gen::<f32>() * interior.width;
        let y = interior.min_y() + rng.gen::<f32>() * interior.height;
        let speed = rng.gen_range(0.5..1.0f32);
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;

        Self {
            id: format!("person-{}", index),
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            hall,
            target_exit,
            speed,
            phase: Phase::InHall,
        }
    }

    /// Velocity for this frame given the current phase and position.
    pub fn steer(&self, rng: &mut impl Rng) -> (f32, f32) {
        match self.phase {
            Phase::InHall => seek(self.x, self.y, merge_point(self.hall), self.speed),
            Phase::Merging => seek(self.x, self.y, map::CENTER, self.speed),
            Phase::InLane => self.lane_velocity(),
            Phase::AtExit => self.idle_velocity(rng),
        }
    }

    /// Re-center on the lane first (cross axis only), then walk it.
    fn lane_velocity(&self) -> (f32, f32) {
        let (dir_x, dir_y) = exit_direction(self.target_exit);
        let lane_speed = LANE_SPEED_FACTOR * self.speed;

        if dir_x == 0.0 {
            let offset = map::CENTER.0 - self.x;
            if offset.abs() > LANE_TOLERANCE {
                (offset * LANE_GAIN, 0.0)
            } else {
                (0.0, dir_y * lane_speed)
            }
        } else {
            let offset = map::CENTER.1 - self.y;
            if offset.abs() > LANE_TOLERANCE {
                (0.0, offset * LANE_GAIN)
            } else {
                (dir_x * lane_speed, 0.0)
            }
        }
    }

    /// Random drift plus a pull back into the exit catchment zone.
    fn idle_velocity(&self, rng: &mut impl Rng) -> (f32, f32) {
        let zone = exit_zone(self.target_exit);
        let mut vx = rng.gen_range(-EXIT_JITTER..EXIT_JITTER);
        let mut vy = rng.gen_range(-EXIT_JITTER..EXIT_JITTER);

        if self.x < zone.min_x() {
            vx += EXIT_CENTERING;
        } else if self.x > zone.max_x() {
            vx -= EXIT_CENTERING;
        }
        if self.y < zone.min_y() {
            vy += EXIT_CENTERING;
        } else if self.y > zone.max_y() {
            vy -= EXIT_CENTERING;
        }
        (vx, vy)
    }

    /// Phase after moving to the current position.
    pub fn next_phase(&self) -> Phase {
        match self.phase {
            Phase::InHall => {
                // Merge points sit outside the padded interior, so stepping
                // out of the interior means the attendee has left the hall.
                let left_hall = !hall_interior(self.hall).contains(self.x, self.y);
                if left_hall || distance(self.x, self.y, merge_point(self.hall)) < MERGE_RADIUS {
                    Phase::Merging
                } else {
                    Phase::InHall
                }
            }
            Phase::Merging => {
                if distance(self.x, self.y, map::CENTER) < CENTER_RADIUS {
                    Phase::InLane
                } else {
                    Phase::Merging
                }
            }
            Phase::InLane => {
                if has_reached_exit(self.target_exit, self.x, self.y) {
                    Phase::AtExit
                } else {
                    Phase::InLane
                }
            }
            Phase::AtExit => Phase::AtExit,
        }
    }

    /// Send an exited attendee back into a random hall with a fresh target.
    pub fn recycle(&mut self, rng: &mut impl Rng) {
        self.hall = rng.gen_range(1..=4u8);
        self.target_exit = rng.gen_range(1..=4u8);
        let (x, y) = entry_point(self.hall);
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.phase = Phase::InHall;
    }
}

/// Create the initial population.
pub fn initialize_population(size: usize, rng: &mut impl Rng) -> Vec<CrowdPerson> {
    (0..size).map(|i| CrowdPerson::spawn(i, rng)).collect()
}

/// Advance one attendee by one frame.
pub fn step_person(person: &CrowdPerson, rng: &mut impl Rng) -> CrowdPerson {
    let (vx, vy) = person.steer(rng);

    let mut next = person.clone();
    next.vx = vx;
    next.vy = vy;
    next.x = (person.x + vx).clamp(0.0, map::SIZE);
    next.y = (person.y + vy).clamp(0.0, map::SIZE);
    next.phase = next.next_phase();

    if person.phase == Phase::AtExit && rng.gen::<f64>() < RECYCLE_PROBABILITY {
        next.recycle(rng);
    }
    next
}

/// Advance the whole population by one frame. Output has the same length
/// and order as the input.
pub fn advance(people: &[CrowdPerson], rng: &mut impl Rng) -> Vec<CrowdPerson> {
    people.iter().map(|p| step_person(p, rng)).collect()
}

/// Head count per phase, in `[InHall, Merging, InLane, AtExit]` order.
pub fn phase_counts(people: &[CrowdPerson]) -> [usize; 4] {
    let mut counts = [0; 4];
    for p in people {
        let i = match p.phase {
            Phase::InHall => 0,
            Phase::Merging => 1,
            Phase::InLane => 2,
            Phase::AtExit => 3,
        };
        counts[i] += 1;
    }
    counts
}
