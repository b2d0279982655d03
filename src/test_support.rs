//! Fixtures shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::channel::GroundStation;

/// QUESS / Micius, epoch 2024-01-16.
pub const MICIUS_LINE1: &str =
    "1 41731U 16051A   24016.15735159  .00011450  00000-0  34540-3 0  9998";
pub const MICIUS_LINE2: &str =
    "2 41731  97.3167 289.0989 0012522  59.2544 300.9930 15.34373256413200";

pub fn paris() -> GroundStation {
    GroundStation::new("Paris", 48.8566, 2.3522, 80.0)
}

pub fn delft() -> GroundStation {
    GroundStation::new("Delft", 52.0116, 4.3571, 0.0)
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}
