use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::atmosphere::{AtmosphereError, TransmittanceTable};
use crate::channel::{timeline, ChannelError, GroundStation};
use crate::link::LinkParameters;
use crate::orbit::{OrbitDescriptor, OrbitError, Satellite};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid scenario: {0}")]
    Invalid(String),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error(transparent)]
    Window(#[from] ChannelError),
    #[error(transparent)]
    Atmosphere(#[from] AtmosphereError),
}

/// A downlink scenario: one satellite, its ground stations, the time window
/// to sample and the optical link parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    pub satellite: SatelliteConfig,
    pub stations: Vec<StationConfig>,
    pub window: WindowConfig,
    #[serde(default)]
    pub min_elevation_deg: f64,
    pub atmosphere: AtmosphereConfig,
    #[serde(default)]
    pub link: LinkParameters,
    #[serde(default = "default_source_rate")]
    pub source_rate_hz: f64,
    /// Relative paths in the file resolve against this directory.
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_source_rate() -> f64 {
    1e8
}

#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteConfig {
    pub name: String,
    #[serde(default)]
    pub orbit: Option<OrbitDescriptor>,
    /// 2- or 3-line TLE file, used when `orbit` is absent.
    #[serde(default)]
    pub tle_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: String,
    /// `"lat, lon"` in degrees
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub samples: Option<usize>,
    /// Sampling interval, e.g. `1s` or `500ms`.
    #[serde(default)]
    pub step: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AtmosphereConfig {
    pub table: PathBuf,
}

impl ScenarioConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_yaml(&content, base_dir)
    }

    pub fn from_yaml(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: ScenarioConfig = serde_yaml::from_str(content)?;
        config.base_dir = base_dir.into();
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.stations.is_empty() {
            return Err(ConfigError::Invalid("at least one station is required".into()));
        }
        match (&self.satellite.orbit, &self.satellite.tle_file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "satellite has both orbit and tle_file".into(),
                ))
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "satellite needs either orbit or tle_file".into(),
                ))
            }
            _ => {}
        }
        match (&self.window.samples, &self.window.step) {
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "window takes either samples or step, not both".into(),
            )),
            (None, None) => Err(ConfigError::Invalid(
                "window needs samples or step".into(),
            )),
            _ => Ok(()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn orbit_descriptor(&self) -> Result<OrbitDescriptor, ConfigError> {
        if let Some(orbit) = &self.satellite.orbit {
            return Ok(orbit.clone());
        }
        let Some(tle_file) = &self.satellite.tle_file else {
            return Err(ConfigError::Invalid("satellite has no orbit".into()));
        };
        let path = self.resolve(tle_file);
        let text = std::fs::read_to_string(&path)?;
        log::debug!("Read TLE for {} from {}", self.satellite.name, path.display());
        Ok(OrbitDescriptor::from_tle_text(&text)?)
    }

    pub fn satellite(&self) -> Result<Satellite, ConfigError> {
        let descriptor = self.orbit_descriptor()?;
        Ok(Satellite::new(self.satellite.name.clone(), &descriptor)?)
    }

    pub fn stations(&self) -> Result<Vec<GroundStation>, ConfigError> {
        self.stations
            .iter()
            .map(|s| {
                GroundStation::from_coordinates(&s.name, &s.coordinates, Some(s.altitude_m))
                    .ok_or_else(|| {
                        ConfigError::Invalid(format!(
                            "station {}: bad coordinates '{}'",
                            s.name, s.coordinates
                        ))
                    })
            })
            .collect()
    }

    pub fn times(&self) -> Result<Vec<DateTime<Utc>>, ConfigError> {
        let WindowConfig {
            start,
            end,
            samples,
            step,
        } = &self.window;
        let times = match (samples, step) {
            (Some(count), _) => timeline::linspace(*start, *end, *count)?,
            (None, Some(step)) => timeline::stepped(*start, *end, parse_duration(step)?)?,
            (None, None) => return Err(ConfigError::Invalid("window needs samples or step".into())),
        };
        Ok(times)
    }

    pub fn table(&self) -> Result<TransmittanceTable, ConfigError> {
        Ok(TransmittanceTable::from_csv_path(self.resolve(&self.atmosphere.table))?)
    }
}

fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
        .map_err(|e| ConfigError::Invalid(format!("step '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::Propagation;
    use crate::test_support::{MICIUS_LINE1, MICIUS_LINE2};

    const POLAR: &str = r#"
satellite:
  name: demo
  orbit:
    kind: polar_pass
    inclination_deg: 0.0
    altitude_km: 500.0
stations:
  - name: Paris
    coordinates: "48.8566, 2.3522"
    altitude_m: 80
  - name: Delft
    coordinates: "52.0116, 4.3571"
window:
  start: 2024-01-23T23:00:00Z
  end: 2024-01-24T01:00:00Z
  step: 1m
atmosphere:
  table: transmittance.csv
link:
  wavelength_m: 8.1e-7
  rx_aperture_radius_m: 0.3
"#;

    #[test]
    fn parses_scenario_with_defaults() {
        let config = ScenarioConfig::from_yaml(POLAR, "/data").unwrap();
        assert_eq!(config.stations.len(), 2);
        assert_eq!(config.min_elevation_deg, 0.0);
        assert_eq!(config.source_rate_hz, 1e8);
        assert_eq!(config.link.rx_aperture_radius_m, 0.3);
        assert_eq!(config.link.eta_tx, LinkParameters::default().eta_tx);
        assert_eq!(
            config.resolve(&config.atmosphere.table),
            PathBuf::from("/data/transmittance.csv")
        );
    }

    #[test]
    fn builds_model_objects() {
        let config = ScenarioConfig::from_yaml(POLAR, "/data").unwrap();
        let satellite = config.satellite().unwrap();
        assert!(matches!(satellite.propagation(), Propagation::PolarPass(_)));

        let stations = config.stations().unwrap();
        assert_eq!(stations[0].altitude_m, 80.0);
        assert_eq!(stations[1].altitude_m, 0.0);

        assert_eq!(config.times().unwrap().len(), 121);
    }

    #[test]
    fn inline_tle_orbit() {
        let yaml = format!(
            r#"
satellite:
  name: Micius
  orbit:
    kind: tle
    line1: "{}"
    line2: "{}"
stations:
  - name: Paris
    coordinates: "48.8566, 2.3522"
window:
  start: 2024-01-23T23:00:00Z
  end: 2024-01-24T01:00:00Z
  samples: 1000
atmosphere:
  table: t.csv
"#,
            MICIUS_LINE1, MICIUS_LINE2
        );
        let config = ScenarioConfig::from_yaml(&yaml, "").unwrap();
        assert_eq!(config.satellite().unwrap().propagation().kind(), "tle");
        assert_eq!(config.times().unwrap().len(), 1000);
    }

    #[test]
    fn rejects_ambiguous_window() {
        let yaml = POLAR.replace("  step: 1m", "  step: 1m\n  samples: 10");
        assert!(matches!(
            ScenarioConfig::from_yaml(&yaml, ""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_bad_step_and_coordinates() {
        let config = ScenarioConfig::from_yaml(&POLAR.replace("step: 1m", "step: soon"), "").unwrap();
        assert!(matches!(config.times(), Err(ConfigError::Invalid(_))));

        let config =
            ScenarioConfig::from_yaml(&POLAR.replace("\"52.0116, 4.3571\"", "nowhere"), "").unwrap();
        assert!(config.stations().is_err());
    }

    #[test]
    fn zero_length_window_with_samples_is_rejected() {
        let yaml = POLAR
            .replace("end: 2024-01-24T01:00:00Z", "end: 2024-01-23T23:00:00Z")
            .replace("step: 1m", "samples: 10");
        let config = ScenarioConfig::from_yaml(&yaml, "").unwrap();
        assert!(matches!(
            config.times(),
            Err(ConfigError::Window(ChannelError::InvalidWindow(_)))
        ));
    }

    #[test]
    fn bad_orbit_is_reported() {
        let yaml = POLAR.replace("altitude_km: 500.0", "altitude_km: -1.0");
        let config = ScenarioConfig::from_yaml(&yaml, "").unwrap();
        assert!(matches!(config.satellite(), Err(ConfigError::Orbit(_))));
    }

    #[test]
    fn bundled_scenario_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/micius_paris_delft.yaml");
        let config = ScenarioConfig::from_file(path).unwrap();
        assert_eq!(config.satellite().unwrap().propagation().kind(), "tle");
        assert_eq!(config.stations().unwrap().len(), 2);
        assert_eq!(config.times().unwrap().len(), 7201);
        assert_eq!(config.table().unwrap().len(), 601);
    }
}
