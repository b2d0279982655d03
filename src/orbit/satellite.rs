use chrono::{DateTime, Utc};

use super::kepler::KeplerPropagator;
use super::tle::TlePropagator;
use super::{OrbitDescriptor, OrbitError, OrbitStateProvider};
use crate::geometry::Vector3;

/// Parameters of the closed-form polar orbit passage model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPassOrbit {
    /// Orbit inclination with respect to the ground station meridian (rad)
    pub inclination_rad: f64,
    pub altitude_m: f64,
}

/// Propagation state derived from the active descriptor.
#[derive(Debug)]
pub enum Propagation {
    Unset,
    Tle(TlePropagator),
    Keplerian(KeplerPropagator),
    PolarPass(PolarPassOrbit),
}

impl Propagation {
    pub fn build(descriptor: &OrbitDescriptor) -> Result<Self, OrbitError> {
        match descriptor {
            OrbitDescriptor::Tle { line1, line2, name } => Ok(Propagation::Tle(
                TlePropagator::from_lines(name.clone(), line1, line2)?,
            )),
            OrbitDescriptor::Keplerian { .. } => {
                let elements = descriptor
                    .keplerian_elements()
                    .ok_or_else(|| OrbitError::InvalidElements("not a keplerian descriptor".into()))?;
                Ok(Propagation::Keplerian(KeplerPropagator::new(elements)?))
            }
            OrbitDescriptor::PolarPass {
                inclination_deg,
                altitude_km,
            } => {
                if !(altitude_km.is_finite() && *altitude_km > 0.0) {
                    return Err(OrbitError::InvalidElements(format!(
                        "polar pass altitude must be positive, got {} km",
                        altitude_km
                    )));
                }
                if !inclination_deg.is_finite() {
                    return Err(OrbitError::InvalidElements(
                        "polar pass inclination must be finite".into(),
                    ));
                }
                Ok(Propagation::PolarPass(PolarPassOrbit {
                    inclination_rad: inclination_deg.to_radians(),
                    altitude_m: altitude_km * 1e3,
                }))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Propagation::Unset => "unset",
            Propagation::Tle(_) => "tle",
            Propagation::Keplerian(_) => "keplerian",
            Propagation::PolarPass(_) => "polar_pass",
        }
    }
}

/// A satellite driven by exactly one orbit description at a time.
#[derive(Debug)]
pub struct Satellite {
    name: String,
    propagation: Propagation,
}

impl Satellite {
    pub fn new(name: impl Into<String>, descriptor: &OrbitDescriptor) -> Result<Self, OrbitError> {
        Ok(Self {
            name: name.into(),
            propagation: Propagation::build(descriptor)?,
        })
    }

    pub fn unconfigured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            propagation: Propagation::Unset,
        }
    }

    /// Replace the orbit description. The new propagation state is built
    /// before the old one is dropped; on error the satellite is unchanged.
    pub fn configure(&mut self, descriptor: &OrbitDescriptor) -> Result<(), OrbitError> {
        let next = Propagation::build(descriptor)?;
        log::debug!(
            "{}: switching orbit model {} -> {}",
            self.name,
            self.propagation.kind(),
            next.kind()
        );
        self.propagation = next;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.propagation = Propagation::Unset;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn propagation(&self) -> &Propagation {
        &self.propagation
    }
}

impl OrbitStateProvider for Satellite {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Vector3, OrbitError> {
        match &self.propagation {
            Propagation::Unset => Err(OrbitError::Unconfigured),
            Propagation::PolarPass(_) => Err(OrbitError::ClosedFormOnly),
            Propagation::Tle(p) => p.position_at(timestamp),
            Propagation::Keplerian(p) => p.position_at(timestamp),
        }
    }
}
