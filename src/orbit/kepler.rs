//! Unperturbed two-body propagation from classical orbital elements.

use std::f64::consts::{PI, TAU};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{OrbitError, OrbitStateProvider};
use crate::geometry::Vector3;

/// WGS-84 Earth gravitational parameter (m³/s²).
pub const WGS84_EARTH_MU: f64 = 3.986004418e14;

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITER: usize = 50;

/// Which anomaly the element set carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    #[default]
    True,
    Mean,
    Eccentric,
}

/// Classical Keplerian elements at an epoch. Angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements {
    /// Semi-major axis (m)
    pub a: f64,
    pub e: f64,
    pub i: f64,
    /// Argument of perigee
    pub aop: f64,
    /// Right ascension of ascending node
    pub raan: f64,
    pub anomaly: f64,
    pub anomaly_kind: AnomalyKind,
    pub epoch: DateTime<Utc>,
    /// Gravitational parameter (m³/s²)
    pub mu: f64,
}

#[derive(Debug, Clone)]
pub struct KeplerPropagator {
    elements: KeplerianElements,
    mean_anomaly_at_epoch: f64,
    mean_motion: f64,
}

impl KeplerPropagator {
    pub fn new(elements: KeplerianElements) -> Result<Self, OrbitError> {
        if !(elements.a.is_finite() && elements.a > 0.0) {
            return Err(OrbitError::InvalidElements(format!(
                "semi-major axis must be positive, got {}",
                elements.a
            )));
        }
        if !(0.0..1.0).contains(&elements.e) {
            return Err(OrbitError::InvalidElements(format!(
                "only closed orbits are supported, eccentricity {}",
                elements.e
            )));
        }
        if !(elements.mu.is_finite() && elements.mu > 0.0) {
            return Err(OrbitError::InvalidElements(format!(
                "gravitational parameter must be positive, got {}",
                elements.mu
            )));
        }

        let e = elements.e;
        let mean_anomaly_at_epoch = match elements.anomaly_kind {
            AnomalyKind::Mean => elements.anomaly,
            AnomalyKind::Eccentric => eccentric_to_mean_anomaly(elements.anomaly, e),
            AnomalyKind::True => {
                eccentric_to_mean_anomaly(true_to_eccentric_anomaly(elements.anomaly, e), e)
            }
        };
        let mean_motion = (elements.mu / elements.a.powi(3)).sqrt();

        Ok(Self {
            elements,
            mean_anomaly_at_epoch,
            mean_motion,
        })
    }

    /// Orbital period (s).
    pub fn period(&self) -> f64 {
        TAU / self.mean_motion
    }
}

impl OrbitStateProvider for KeplerPropagator {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Vector3, OrbitError> {
        let dt = (timestamp - self.elements.epoch)
            .num_microseconds()
            .map(|us| us as f64 * 1e-6)
            .ok_or_else(|| OrbitError::Propagation("time offset from epoch overflows".into()))?;

        let el = &self.elements;
        let m = (self.mean_anomaly_at_epoch + self.mean_motion * dt).rem_euclid(TAU);
        let ea = mean_to_eccentric_anomaly(m, el.e);
        let nu = 2.0 * ((1.0 + el.e).sqrt() * (ea / 2.0).sin())
            .atan2((1.0 - el.e).sqrt() * (ea / 2.0).cos());
        let r = el.a * (1.0 - el.e * ea.cos());

        Ok(perifocal_to_inertial(
            [r * nu.cos(), r * nu.sin(), 0.0],
            el.i,
            el.raan,
            el.aop,
        ))
    }
}

fn perifocal_to_inertial(r_pqw: Vector3, i: f64, raan: f64, aop: f64) -> Vector3 {
    let (sin_raan, cos_raan) = raan.sin_cos();
    let (sin_aop, cos_aop) = aop.sin_cos();
    let (sin_i, cos_i) = i.sin_cos();

    let rot = [
        [
            cos_raan * cos_aop - sin_raan * sin_aop * cos_i,
            -cos_raan * sin_aop - sin_raan * cos_aop * cos_i,
            sin_raan * sin_i,
        ],
        [
            sin_raan * cos_aop + cos_raan * sin_aop * cos_i,
            -sin_raan * sin_aop + cos_raan * cos_aop * cos_i,
            -cos_raan * sin_i,
        ],
        [sin_aop * sin_i, cos_aop * sin_i, cos_i],
    ];

    let mut out = [0.0; 3];
    for (j, row) in rot.iter().enumerate() {
        out[j] = row[0] * r_pqw[0] + row[1] * r_pqw[1] + row[2] * r_pqw[2];
    }
    out
}

/// Solve Kepler's equation M = E - e sin(E) with Newton-Raphson.
fn mean_to_eccentric_anomaly(m: f64, e: f64) -> f64 {
    let mut ea = if e < 0.8 { m } else { PI };
    for _ in 0..KEPLER_MAX_ITER {
        let delta = (ea - e * ea.sin() - m) / (1.0 - e * ea.cos());
        ea -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    ea
}

fn eccentric_to_mean_anomaly(ea: f64, e: f64) -> f64 {
    ea - e * ea.sin()
}

fn true_to_eccentric_anomaly(nu: f64, e: f64) -> f64 {
    2.0 * ((1.0 - e).sqrt() * (nu / 2.0).sin()).atan2((1.0 + e).sqrt() * (nu / 2.0).cos())
}
