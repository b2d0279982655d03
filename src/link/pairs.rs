use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::ensure_same_len;
use super::LinkError;

/// Pairs per second with both photons detected directly (no memory).
pub fn raw_pair_rate(source_rate_hz: f64, t_a: &[f64], t_b: &[f64]) -> Result<Vec<f64>, LinkError> {
    ensure_same_len("station transmissions", t_a.len(), t_b.len())?;
    Ok(t_a
        .iter()
        .zip(t_b)
        .map(|(a, b)| source_rate_hz * a * b)
        .collect())
}

/// Pairs per second when a quantum memory buffers the better link, so the
/// weaker link alone limits the rate.
pub fn memory_pair_rate(source_rate_hz: f64, t_a: &[f64], t_b: &[f64]) -> Result<Vec<f64>, LinkError> {
    ensure_same_len("station transmissions", t_a.len(), t_b.len())?;
    Ok(t_a
        .iter()
        .zip(t_b)
        .map(|(a, b)| source_rate_hz * a.min(*b))
        .collect())
}

/// Running total of pairs, integrating `rates` over the actual timestamps
/// with the trapezoidal rule. The first element is always 0.
pub fn cumulative_pairs(rates: &[f64], times: &[DateTime<Utc>]) -> Result<Vec<f64>, LinkError> {
    ensure_same_len("rates/times", rates.len(), times.len())?;

    let mut total = 0.0;
    let mut out = Vec::with_capacity(rates.len());
    for i in 0..rates.len() {
        if i > 0 {
            let dt = seconds_between(times[i - 1], times[i]);
            if dt <= 0.0 {
                return Err(LinkError::NonMonotonicTime(i));
            }
            total += 0.5 * (finite_or_zero(rates[i - 1]) + finite_or_zero(rates[i])) * dt;
        }
        out.push(total);
    }
    Ok(out)
}

fn seconds_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (b - a)
        .num_microseconds()
        .map(|us| us as f64 * 1e-6)
        .unwrap_or_else(|| (b - a).num_seconds() as f64)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairStatistics {
    pub total_pairs: f64,
    pub peak_rate_hz: f64,
    pub mean_rate_hz: f64,
    /// Time covered by intervals whose both ends have a positive rate.
    pub visible_seconds: f64,
}

impl PairStatistics {
    pub fn from_rates(rates: &[f64], times: &[DateTime<Utc>]) -> Result<Self, LinkError> {
        let cumulative = cumulative_pairs(rates, times)?;
        let finite: Vec<f64> = rates.iter().copied().filter(|r| r.is_finite()).collect();
        let peak_rate_hz = finite.iter().copied().fold(0.0, f64::max);
        let mean_rate_hz = if finite.is_empty() {
            0.0
        } else {
            finite.iter().sum::<f64>() / finite.len() as f64
        };

        let visible_seconds = rates
            .windows(2)
            .zip(times.windows(2))
            .filter(|(r, _)| r[0] > 0.0 && r[1] > 0.0)
            .map(|(_, t)| seconds_between(t[0], t[1]))
            .sum();

        Ok(Self {
            total_pairs: cumulative.last().copied().unwrap_or(0.0),
            peak_rate_hz,
            mean_rate_hz,
            visible_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::utc;
    use approx::assert_relative_eq;
    use chrono::Duration;

    #[test]
    fn raw_rate_multiplies_both_links() {
        let r = raw_pair_rate(1e8, &[0.1, 0.01], &[0.1, 0.5]).unwrap();
        assert_relative_eq!(r[0], 1e6);
        assert_relative_eq!(r[1], 5e5);
    }

    #[test]
    fn memory_rate_uses_weaker_link() {
        let r = memory_pair_rate(1e8, &[0.1, 0.01], &[0.2, 0.5]).unwrap();
        assert_relative_eq!(r[0], 1e7);
        assert_relative_eq!(r[1], 1e6);
    }

    #[test]
    fn unequal_station_series_are_rejected() {
        assert!(matches!(
            raw_pair_rate(1.0, &[0.1, 0.2], &[0.1]),
            Err(LinkError::ShapeMismatch { left: 2, right: 1, .. })
        ));
        assert!(memory_pair_rate(1.0, &[0.1], &[]).is_err());
    }

    #[test]
    fn constant_rate_integrates_linearly() {
        let t0 = utc(2024, 1, 1, 0, 0, 0);
        let times: Vec<_> = (0..11).map(|k| t0 + Duration::seconds(k)).collect();
        let rates = vec![100.0; 11];
        let c = cumulative_pairs(&rates, &times).unwrap();
        assert_eq!(c[0], 0.0);
        assert_relative_eq!(c[10], 1000.0);
    }

    #[test]
    fn uneven_spacing_uses_real_intervals() {
        let t0 = utc(2024, 1, 1, 0, 0, 0);
        let times = [t0, t0 + Duration::seconds(1), t0 + Duration::seconds(11)];
        let c = cumulative_pairs(&[10.0, 10.0, 10.0], &times).unwrap();
        assert_relative_eq!(c[2], 110.0);
    }

    #[test]
    fn non_increasing_times_fail() {
        let t0 = utc(2024, 1, 1, 0, 0, 0);
        assert_eq!(
            cumulative_pairs(&[1.0, 1.0], &[t0, t0]),
            Err(LinkError::NonMonotonicTime(1))
        );
    }

    #[test]
    fn statistics_summarise_rates() {
        let t0 = utc(2024, 1, 1, 0, 0, 0);
        let times: Vec<_> = (0..3).map(|k| t0 + Duration::seconds(k * 2)).collect();
        let stats = PairStatistics::from_rates(&[0.0, 4.0, 2.0], &times).unwrap();
        assert_relative_eq!(stats.total_pairs, 10.0);
        assert_relative_eq!(stats.peak_rate_hz, 4.0);
        assert_relative_eq!(stats.mean_rate_hz, 2.0);
        assert_relative_eq!(stats.visible_seconds, 2.0);
    }
}
