use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::kepler::{AnomalyKind, KeplerianElements, WGS84_EARTH_MU};
use super::tle::parse_tle_lines;
use super::OrbitError;

/// How a satellite's orbit is described. Exactly one variant drives a
/// [`Satellite`](super::Satellite) at a time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrbitDescriptor {
    Tle {
        line1: String,
        line2: String,
        #[serde(default)]
        name: Option<String>,
    },
    Keplerian {
        semi_major_axis_m: f64,
        eccentricity: f64,
        inclination_deg: f64,
        argument_of_perigee_deg: f64,
        raan_deg: f64,
        anomaly_deg: f64,
        #[serde(default)]
        anomaly_kind: AnomalyKind,
        epoch: DateTime<Utc>,
        #[serde(default = "default_mu")]
        mu_m3_s2: f64,
    },
    /// Closed-form polar orbit passage over the station.
    PolarPass {
        inclination_deg: f64,
        altitude_km: f64,
    },
}

fn default_mu() -> f64 {
    WGS84_EARTH_MU
}

impl OrbitDescriptor {
    /// Build a TLE descriptor from 2- or 3-line TLE text.
    pub fn from_tle_text(text: &str) -> Result<Self, OrbitError> {
        let (name, line1, line2) = parse_tle_lines(text)?;
        Ok(OrbitDescriptor::Tle { line1, line2, name })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OrbitDescriptor::Tle { .. } => "tle",
            OrbitDescriptor::Keplerian { .. } => "keplerian",
            OrbitDescriptor::PolarPass { .. } => "polar_pass",
        }
    }

    pub(super) fn keplerian_elements(&self) -> Option<KeplerianElements> {
        match *self {
            OrbitDescriptor::Keplerian {
                semi_major_axis_m,
                eccentricity,
                inclination_deg,
                argument_of_perigee_deg,
                raan_deg,
                anomaly_deg,
                anomaly_kind,
                epoch,
                mu_m3_s2,
            } => Some(KeplerianElements {
                a: semi_major_axis_m,
                e: eccentricity,
                i: inclination_deg.to_radians(),
                aop: argument_of_perigee_deg.to_radians(),
                raan: raan_deg.to_radians(),
                anomaly: anomaly_deg.to_radians(),
                anomaly_kind,
                epoch,
                mu: mu_m3_s2,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_variants() {
        let yaml = r#"
kind: keplerian
semi_major_axis_m: 6872181.5
eccentricity: 0.00132
inclination_deg: 97.3699
argument_of_perigee_deg: 178.5836
raan_deg: 267.45
anomaly_deg: 246.0824
epoch: 2016-12-18T21:38:11.330Z
"#;
        let descriptor: OrbitDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(descriptor.kind(), "keplerian");
        let el = descriptor.keplerian_elements().unwrap();
        assert_eq!(el.mu, WGS84_EARTH_MU);
        assert_eq!(el.anomaly_kind, AnomalyKind::True);

        let yaml = "kind: polar_pass\ninclination_deg: 10\naltitude_km: 500\n";
        let descriptor: OrbitDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            descriptor,
            OrbitDescriptor::PolarPass {
                inclination_deg: 10.0,
                altitude_km: 500.0
            }
        );
    }

    #[test]
    fn builds_from_named_tle_text() {
        let text = format!(
            "MICIUS\n{}\n{}\n",
            crate::test_support::MICIUS_LINE1,
            crate::test_support::MICIUS_LINE2
        );
        match OrbitDescriptor::from_tle_text(&text).unwrap() {
            OrbitDescriptor::Tle { name, line1, .. } => {
                assert_eq!(name.as_deref(), Some("MICIUS"));
                assert!(line1.starts_with("1 41731U"));
            }
            other => panic!("unexpected descriptor {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(serde_yaml::from_str::<OrbitDescriptor>("kind: sgp8\n").is_err());
    }
}
