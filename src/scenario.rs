use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::atmosphere::TransmittanceTable;
use crate::channel::{joint_mask, ChannelError, ChannelSeries, DownlinkChannel, GroundStation};
use crate::config::{ConfigError, ScenarioConfig};
use crate::link::{
    end_to_end, memory_pair_rate, raw_pair_rate, to_db, LinkError, LinkParameters, PairStatistics,
};
use crate::orbit::Satellite;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Everything a run needs, built once from a scenario file.
#[derive(Debug)]
pub struct Scenario {
    pub satellite: Satellite,
    pub stations: Vec<GroundStation>,
    pub times: Vec<DateTime<Utc>>,
    pub table: TransmittanceTable,
    pub link: LinkParameters,
    pub source_rate_hz: f64,
    pub min_elevation_deg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Culmination {
    pub time: DateTime<Utc>,
    pub elevation_deg: f64,
    pub range_m: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub station: String,
    pub samples: usize,
    pub valid: usize,
    pub visible: usize,
    pub culminations: Vec<Culmination>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationLink {
    pub station: String,
    pub visible: usize,
    pub peak_transmission: f64,
    /// Loss at the best sample, dB
    pub min_loss_db: Option<f64>,
    pub mean_loss_db: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub stations: [String; 2],
    pub joint_samples: usize,
    pub raw: PairStatistics,
    pub memory: PairStatistics,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub stations: Vec<StationLink>,
    pub pairs: Option<PairReport>,
}

impl Scenario {
    pub fn load(config: &ScenarioConfig) -> Result<Self, ConfigError> {
        let link = config.link;
        link.validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Self {
            satellite: config.satellite()?,
            stations: config.stations()?,
            times: config.times()?,
            table: config.table()?,
            link,
            source_rate_hz: config.source_rate_hz,
            min_elevation_deg: config.min_elevation_deg,
        })
    }

    /// One channel series per station, in station order.
    pub fn channels(&self) -> Result<Vec<ChannelSeries>, ChannelError> {
        self.stations
            .iter()
            .map(|station| {
                DownlinkChannel::new(&self.satellite, station).calculate_channel_parameters(&self.times)
            })
            .collect()
    }

    /// Per-sample end-to-end transmission for one station's series.
    pub fn transmission(&self, series: &ChannelSeries) -> Result<Vec<f64>, LinkError> {
        let t_atm = self.table.lookup(series.elevation_deg());
        end_to_end(&self.link, &t_atm, series.range_m())
    }

    pub fn channel_report(&self) -> Result<Vec<ChannelReport>, ChannelError> {
        let channels = self.channels()?;
        Ok(self
            .stations
            .iter()
            .zip(&channels)
            .map(|(station, series)| {
                let samples: Vec<_> = series.samples().collect();
                ChannelReport {
                    station: station.name.clone(),
                    samples: series.len(),
                    valid: series.valid_count(),
                    visible: series.filter_min_elevation(self.min_elevation_deg).len(),
                    culminations: series
                        .culminations(self.min_elevation_deg)
                        .into_iter()
                        .map(|i| Culmination {
                            time: samples[i].timestamp,
                            elevation_deg: samples[i].elevation_deg,
                            range_m: samples[i].range_m,
                        })
                        .collect(),
                }
            })
            .collect())
    }

    pub fn link_report(&self) -> Result<LinkReport, ScenarioError> {
        let channels = self.channels()?;

        let mut transmissions = Vec::with_capacity(channels.len());
        let mut stations = Vec::with_capacity(channels.len());
        for (station, series) in self.stations.iter().zip(&channels) {
            let total = self.transmission(series)?;
            let mask = series.elevation_mask(self.min_elevation_deg);
            stations.push(station_link(&station.name, &total, &mask));
            transmissions.push(total);
        }

        let pairs = match (channels.as_slice(), transmissions.as_slice()) {
            ([a, b, ..], [t_a, t_b, ..]) => {
                let mask = joint_mask(&[a, b], self.min_elevation_deg)?;
                let t_a = masked(t_a, &mask);
                let t_b = masked(t_b, &mask);
                let raw = raw_pair_rate(self.source_rate_hz, &t_a, &t_b)?;
                let memory = memory_pair_rate(self.source_rate_hz, &t_a, &t_b)?;
                Some(PairReport {
                    stations: [self.stations[0].name.clone(), self.stations[1].name.clone()],
                    joint_samples: mask.iter().filter(|m| **m).count(),
                    raw: PairStatistics::from_rates(&raw, &self.times)?,
                    memory: PairStatistics::from_rates(&memory, &self.times)?,
                })
            }
            _ => None,
        };

        if let Some(p) = &pairs {
            log::info!(
                "{} + {}: {} joint samples, {:.3e} raw pairs, {:.3e} memory-assisted pairs",
                p.stations[0],
                p.stations[1],
                p.joint_samples,
                p.raw.total_pairs,
                p.memory.total_pairs
            );
        }

        Ok(LinkReport { stations, pairs })
    }
}

fn masked(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .map(|(v, keep)| if *keep { *v } else { 0.0 })
        .collect()
}

fn station_link(name: &str, total: &[f64], mask: &[bool]) -> StationLink {
    let visible: Vec<f64> = total
        .iter()
        .zip(mask)
        .filter(|(t, keep)| **keep && **t > 0.0)
        .map(|(t, _)| *t)
        .collect();

    let peak_transmission = visible.iter().copied().fold(0.0, f64::max);
    let mean_loss_db = if visible.is_empty() {
        None
    } else {
        Some(visible.iter().map(|t| to_db(*t)).sum::<f64>() / visible.len() as f64)
    };

    StationLink {
        station: name.to_string(),
        visible: visible.len(),
        peak_transmission,
        min_loss_db: (peak_transmission > 0.0).then(|| to_db(peak_transmission)),
        mean_loss_db,
    }
}
