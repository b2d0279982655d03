use chrono::{DateTime, Utc};

use super::ChannelError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSample {
    pub timestamp: DateTime<Utc>,
    pub range_m: f64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

impl ChannelSample {
    pub fn invalid(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            range_m: f64::NAN,
            elevation_deg: f64::NAN,
            azimuth_deg: f64::NAN,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.range_m.is_finite() && self.elevation_deg.is_finite()
    }
}

/// Parallel, index-aligned channel arrays. Invalid samples carry NaN range
/// and elevation; azimuth is NaN where the model does not provide one.
///
/// Samples only enter through [`push`](Self::push) or `collect`, so the
/// four arrays always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSeries {
    times: Vec<DateTime<Utc>>,
    range_m: Vec<f64>,
    elevation_deg: Vec<f64>,
    azimuth_deg: Vec<f64>,
}

impl FromIterator<ChannelSample> for ChannelSeries {
    fn from_iter<I: IntoIterator<Item = ChannelSample>>(iter: I) -> Self {
        let mut series = ChannelSeries::default();
        for sample in iter {
            series.push(sample);
        }
        series
    }
}

impl ChannelSeries {
    pub fn push(&mut self, sample: ChannelSample) {
        self.times.push(sample.timestamp);
        self.range_m.push(sample.range_m);
        self.elevation_deg.push(sample.elevation_deg);
        self.azimuth_deg.push(sample.azimuth_deg);
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn range_m(&self) -> &[f64] {
        &self.range_m
    }

    pub fn elevation_deg(&self) -> &[f64] {
        &self.elevation_deg
    }

    pub fn azimuth_deg(&self) -> &[f64] {
        &self.azimuth_deg
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = ChannelSample> + '_ {
        (0..self.len()).map(move |i| ChannelSample {
            timestamp: self.times[i],
            range_m: self.range_m[i],
            elevation_deg: self.elevation_deg[i],
            azimuth_deg: self.azimuth_deg[i],
        })
    }

    pub fn valid_count(&self) -> usize {
        self.samples().filter(ChannelSample::is_valid).count()
    }

    pub fn zenith_deg(&self) -> Vec<f64> {
        self.elevation_deg.iter().map(|e| 90.0 - e).collect()
    }

    /// `true` where elevation is strictly above `min_elevation_deg`. NaN never passes.
    pub fn elevation_mask(&self, min_elevation_deg: f64) -> Vec<bool> {
        self.elevation_deg
            .iter()
            .map(|e| *e > min_elevation_deg)
            .collect()
    }

    pub fn filter_min_elevation(&self, min_elevation_deg: f64) -> ChannelSeries {
        self.samples()
            .filter(|s| s.elevation_deg > min_elevation_deg)
            .collect()
    }

    pub fn select(&self, mask: &[bool]) -> Result<ChannelSeries, ChannelError> {
        if mask.len() != self.len() {
            return Err(ChannelError::ShapeMismatch {
                left: self.len(),
                right: mask.len(),
            });
        }
        Ok(self
            .samples()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(s, _)| s)
            .collect())
    }

    /// Indices where the satellite culminates: a rise followed by a fall in
    /// elevation, at or above `min_elevation_deg`. On a plateau the first
    /// index of the plateau is reported.
    pub fn culminations(&self, min_elevation_deg: f64) -> Vec<usize> {
        let e = &self.elevation_deg;
        let mut peaks = Vec::new();
        let mut rising = false;
        let mut plateau_start: Option<usize> = None;

        for i in 1..e.len() {
            let (prev, cur) = (e[i - 1], e[i]);
            if !prev.is_finite() || !cur.is_finite() {
                rising = false;
                plateau_start = None;
                continue;
            }
            if cur > prev {
                rising = true;
                plateau_start = None;
            } else if cur == prev {
                if rising && plateau_start.is_none() {
                    plateau_start = Some(i - 1);
                }
            } else {
                if rising {
                    let peak = plateau_start.unwrap_or(i - 1);
                    if e[peak] >= min_elevation_deg {
                        peaks.push(peak);
                    }
                }
                rising = false;
                plateau_start = None;
            }
        }
        peaks
    }
}

/// Mask of samples where every series is above `min_elevation_deg`.
pub fn joint_mask(series: &[&ChannelSeries], min_elevation_deg: f64) -> Result<Vec<bool>, ChannelError> {
    let Some(first) = series.first() else {
        return Ok(Vec::new());
    };
    let mut mask = first.elevation_mask(min_elevation_deg);
    for other in &series[1..] {
        if other.len() != mask.len() {
            return Err(ChannelError::ShapeMismatch {
                left: mask.len(),
                right: other.len(),
            });
        }
        for (keep, e) in mask.iter_mut().zip(other.elevation_deg()) {
            *keep &= *e > min_elevation_deg;
        }
    }
    Ok(mask)
}
