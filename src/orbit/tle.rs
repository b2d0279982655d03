use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use super::{OrbitError, OrbitStateProvider};
use crate::geometry::Vector3;

/// Split TLE text into an optional name line and the two element lines.
pub fn parse_tle_lines(tle: &str) -> Result<(Option<String>, String, String), OrbitError> {
    let lines: Vec<String> = tle
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    match lines.len() {
        2 => Ok((None, lines[0].clone(), lines[1].clone())),
        3 => Ok((Some(lines[0].clone()), lines[1].clone(), lines[2].clone())),
        _ => Err(OrbitError::InvalidTleFormat),
    }
}

/// SGP4 propagator seeded from a two-line element set.
pub struct TlePropagator {
    elements: Elements,
    constants: Constants,
}

impl std::fmt::Debug for TlePropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlePropagator")
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .finish()
    }
}

impl TlePropagator {
    pub fn from_lines(
        name: Option<String>,
        line1: &str,
        line2: &str,
    ) -> Result<Self, OrbitError> {
        if !line1.trim_start().starts_with("1 ") || !line2.trim_start().starts_with("2 ") {
            return Err(OrbitError::InvalidTleFormat);
        }
        let elements = Elements::from_tle(name, line1.trim().as_bytes(), line2.trim().as_bytes())
            .map_err(|e| OrbitError::InvalidTle(e.to_string()))?;
        let constants = Constants::from_elements(&elements)
            .map_err(|e| OrbitError::InvalidElements(e.to_string()))?;

        log::debug!(
            "SGP4 propagator ready for NORAD {} (epoch {})",
            elements.norad_id,
            elements.datetime
        );

        Ok(Self {
            elements,
            constants,
        })
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }
}

impl OrbitStateProvider for TlePropagator {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Vector3, OrbitError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| OrbitError::Propagation(e.to_string()))?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| OrbitError::Propagation(e.to_string()))?;

        let p = prediction.position;
        Ok([p[0] * 1e3, p[1] * 1e3, p[2] * 1e3])
    }
}
