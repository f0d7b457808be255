//! Venue constants - gate/hall numbering, map geometry, classification thresholds.
//!
//! The venue topology is fixed: four halls in the quadrants of an 800×800
//! map, a central cross corridor, and one exit gate at the end of each arm.
//! Gates and halls are identified by `u8` numbers 1..=4.

/// Number of exit gates.
pub const GATE_COUNT: usize = 4;
/// Number of halls.
pub const HALL_COUNT: usize = 4;
/// Default simulated attendee population.
pub const POPULATION_SIZE: usize = 800;

pub mod gates {
    pub const NORTH: u8 = 1;
    pub const EAST: u8 = 2;
    pub const SOUTH: u8 = 3;
    pub const WEST: u8 = 4;

    pub const ALL: [u8; 4] = [NORTH, EAST, SOUTH, WEST];

    /// Display names, indexed by `gate_number - 1`.
    pub const NAMES: [&str; 4] = [
        "North Exit (Exit 1)",
        "East Exit (Exit 2)",
        "South Exit (Exit 3)",
        "West Exit (Exit 4)",
    ];

    /// "lat,lon" strings, indexed by `gate_number - 1`.
    pub const COORDINATES: [&str; 4] = [
        "40.7495,-73.9685",
        "40.7485,-73.9675",
        "40.7483,-73.9695",
        "40.7493,-73.9665",
    ];

    /// Baseline occupancy per gate.
    pub const BASE_COUNTS: [i64; 4] = [45, 230, 125, 112];

    /// Only gates 1 and 3 have step-free access.
    pub fn has_accessibility(gate_number: u8) -> bool {
        gate_number == NORTH || gate_number == SOUTH
    }

    pub fn name(gate_number: u8) -> Option<&'static str> {
        super::index_of(gate_number).map(|i| NAMES[i])
    }

    pub fn coordinates(gate_number: u8) -> Option<&'static str> {
        super::index_of(gate_number).map(|i| COORDINATES[i])
    }
}

pub mod halls {
    pub const ALL: [u8; 4] = [1, 2, 3, 4];

    pub const CAPACITY: u32 = 400;

    /// Baseline occupancy per hall.
    pub const BASE_COUNTS: [f64; 4] = [180.0, 320.0, 150.0, 280.0];
}

/// Gate occupancy thresholds (people): below LOW is low, below MEDIUM is
/// medium, below HIGH is high, otherwise critical.
pub mod gate_thresholds {
    pub const LOW: u32 = 80;
    pub const MEDIUM: u32 = 150;
    pub const HIGH: u32 = 220;
}

/// Hall density thresholds (percent of capacity).
pub mod hall_thresholds {
    pub const LOW: f64 = 40.0;
    pub const MEDIUM: f64 = 60.0;
    pub const HIGH: f64 = 80.0;
}

/// Map geometry in venue units (the map is `SIZE`×`SIZE`).
pub mod map {
    pub const SIZE: f32 = 800.0;
    pub const CENTER: (f32, f32) = (400.0, 400.0);

    /// Side length of each square hall.
    pub const HALL_SIZE: f32 = 240.0;
    /// Distance attendees keep from hall walls.
    pub const WALL_PADDING: f32 = 20.0;

    /// Top-left corner of each hall, indexed by `hall - 1`.
    pub const HALL_ORIGINS: [(f32, f32); 4] =
        [(120.0, 120.0), (440.0, 120.0), (120.0, 440.0), (440.0, 440.0)];

    /// Where attendees leave their hall for the junction.
    pub const MERGE_POINTS: [(f32, f32); 4] =
        [(370.0, 370.0), (430.0, 370.0), (370.0, 430.0), (430.0, 430.0)];

    /// Where recycled attendees re-enter their hall.
    pub const ENTRY_POINTS: [(f32, f32); 4] =
        [(200.0, 200.0), (600.0, 200.0), (200.0, 600.0), (600.0, 600.0)];

    /// Exit catchment rectangles as (x, y, width, height), indexed by `exit - 1`.
    pub const EXIT_ZONES: [(f32, f32, f32, f32); 4] = [
        (380.0, 10.0, 40.0, 80.0),
        (710.0, 380.0, 80.0, 40.0),
        (380.0, 710.0, 40.0, 80.0),
        (10.0, 380.0, 80.0, 40.0),
    ];

    /// Distance from the map edge at which an attendee counts as arrived.
    pub const EXIT_MARGIN: f32 = 50.0;
}

/// Index into the per-gate / per-hall tables, `None` outside 1..=4.
pub fn index_of(number: u8) -> Option<usize> {
    match number {
        1..=4 => Some(number as usize - 1),
        _ => None,
    }
}
