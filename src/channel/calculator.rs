use chrono::{DateTime, Utc};

use super::timeline::ensure_increasing;
use super::{polar_pass, ChannelError, ChannelSample, ChannelSeries, GroundStation};
use crate::geometry::frames::{inertial_to_ecef, sidereal_angle};
use crate::orbit::{OrbitError, OrbitStateProvider, Propagation, Satellite};

/// Downlink between one satellite and one ground station.
pub struct DownlinkChannel<'a> {
    satellite: &'a Satellite,
    station: &'a GroundStation,
}

impl<'a> DownlinkChannel<'a> {
    pub fn new(satellite: &'a Satellite, station: &'a GroundStation) -> Self {
        Self { satellite, station }
    }

    pub fn station(&self) -> &GroundStation {
        self.station
    }

    /// Range and elevation for every timestamp, index-aligned with `times`.
    ///
    /// Samples that cannot be computed (propagator failure, or a closed-form
    /// pass beyond the horizon) come back as NaN instead of failing the batch.
    pub fn calculate_channel_parameters(
        &self,
        times: &[DateTime<Utc>],
    ) -> Result<ChannelSeries, ChannelError> {
        ensure_increasing(times)?;

        let series = match self.satellite.propagation() {
            Propagation::Unset => return Err(OrbitError::Unconfigured.into()),
            Propagation::PolarPass(orbit) => {
                polar_pass::channel_parameters(orbit, self.station, times)
            }
            Propagation::Tle(_) | Propagation::Keplerian(_) => {
                propagated_series(self.satellite, self.station, times)
            }
        };

        log::debug!(
            "{} -> {}: {} samples, {} valid",
            self.satellite.name(),
            self.station.name,
            series.len(),
            series.valid_count()
        );
        Ok(series)
    }
}

/// Channel geometry from any inertial position provider.
pub fn propagated_series<P>(
    provider: &P,
    station: &GroundStation,
    times: &[DateTime<Utc>],
) -> ChannelSeries
where
    P: OrbitStateProvider + ?Sized,
{
    let mut failures = 0usize;
    let mut first_failure: Option<OrbitError> = None;

    let series = times
        .iter()
        .map(|t| match provider.position_at(*t) {
            Ok(position) => {
                let ecef = inertial_to_ecef(position, sidereal_angle(*t));
                let look = station.look_at(ecef);
                ChannelSample {
                    timestamp: *t,
                    range_m: look.range_m,
                    elevation_deg: look.elevation_deg,
                    azimuth_deg: look.azimuth_deg,
                }
            }
            Err(e) => {
                failures += 1;
                first_failure.get_or_insert(e);
                ChannelSample::invalid(*t)
            }
        })
        .collect();

    if let Some(e) = first_failure {
        log::warn!(
            "{} of {} samples for {} could not be propagated (first error: {})",
            failures,
            times.len(),
            station.name,
            e
        );
    }

    series
}
