use serde::Deserialize;
use std::f64::consts::PI;

use super::error::ensure_same_len;
use super::LinkError;

/// Fixed optical parameters of a downlink.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkParameters {
    pub wavelength_m: f64,
    /// Transmitter telescope efficiency
    pub eta_tx: f64,
    /// Receiver telescope and detector efficiency
    pub eta_rx: f64,
    /// Gaussian beam waist at the transmitter (m)
    pub tx_beam_waist_m: f64,
    pub rx_aperture_radius_m: f64,
}

impl Default for LinkParameters {
    fn default() -> Self {
        Self {
            wavelength_m: 810e-9,
            eta_tx: 0.8,
            eta_rx: 0.5,
            tx_beam_waist_m: 0.15,
            rx_aperture_radius_m: 0.5,
        }
    }
}

impl LinkParameters {
    pub fn validate(&self) -> Result<(), LinkError> {
        for (name, value) in [("eta_tx", self.eta_tx), ("eta_rx", self.eta_rx)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LinkError::InvalidParameter { name, value });
            }
        }
        for (name, value) in [
            ("wavelength_m", self.wavelength_m),
            ("tx_beam_waist_m", self.tx_beam_waist_m),
            ("rx_aperture_radius_m", self.rx_aperture_radius_m),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LinkError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    pub fn rayleigh_range_m(&self) -> f64 {
        PI * self.tx_beam_waist_m.powi(2) / self.wavelength_m
    }

    /// Fraction of the diffracted Gaussian beam collected by the receiver
    /// aperture after `range_m` of free space.
    pub fn diffraction_efficiency(&self, range_m: f64) -> f64 {
        if !(range_m.is_finite() && range_m >= 0.0) {
            return 0.0;
        }
        let w = self.tx_beam_waist_m * (1.0 + (range_m / self.rayleigh_range_m()).powi(2)).sqrt();
        1.0 - (-2.0 * self.rx_aperture_radius_m.powi(2) / w.powi(2)).exp()
    }
}

/// Total per-sample transmission: telescope efficiencies, atmosphere and
/// diffraction loss. Output is index-aligned with the inputs and lies in
/// [0, 1]; samples with non-finite inputs give 0.
pub fn end_to_end(
    params: &LinkParameters,
    atmospheric_transmittance: &[f64],
    range_m: &[f64],
) -> Result<Vec<f64>, LinkError> {
    params.validate()?;
    ensure_same_len(
        "transmittance/range",
        atmospheric_transmittance.len(),
        range_m.len(),
    )?;

    Ok(atmospheric_transmittance
        .iter()
        .zip(range_m)
        .map(|(t_atm, range)| {
            if !t_atm.is_finite() {
                return 0.0;
            }
            let total = params.eta_tx
                * params.eta_rx
                * t_atm.clamp(0.0, 1.0)
                * params.diffraction_efficiency(*range);
            total.clamp(0.0, 1.0)
        })
        .collect())
}

/// Link loss in dB for a transmission factor.
pub fn to_db(transmission: f64) -> f64 {
    -10.0 * transmission.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn output_is_aligned_and_bounded() {
        let params = LinkParameters::default();
        let t_atm = [0.9, 0.5, 0.0, 1.0, f64::NAN];
        let range = [500e3, 800e3, 1_200e3, 1.0, 600e3];
        let total = end_to_end(&params, &t_atm, &range).unwrap();
        assert_eq!(total.len(), t_atm.len());
        for t in &total {
            assert!((0.0..=1.0).contains(t));
        }
        assert_eq!(total[2], 0.0);
        assert_eq!(total[4], 0.0);
    }

    #[test]
    fn farther_is_lossier() {
        let params = LinkParameters::default();
        let total = end_to_end(&params, &[0.8, 0.8], &[500e3, 1_500e3]).unwrap();
        assert!(total[0] > total[1]);
    }

    #[test]
    fn short_range_collects_whole_beam() {
        let params = LinkParameters::default();
        // Aperture much larger than the beam at the transmitter.
        assert_relative_eq!(params.diffraction_efficiency(0.0), 1.0, epsilon = 1e-9);
        let total = end_to_end(&params, &[1.0], &[0.0]).unwrap();
        assert_relative_eq!(total[0], params.eta_tx * params.eta_rx, epsilon = 1e-9);
    }

    #[test]
    fn far_field_matches_small_aperture_limit() {
        let params = LinkParameters {
            rx_aperture_radius_m: 0.1,
            ..LinkParameters::default()
        };
        let range: f64 = 2_000e3;
        let w = params.tx_beam_waist_m * range / params.rayleigh_range_m();
        let expected = 2.0 * params.rx_aperture_radius_m.powi(2) / w.powi(2);
        assert_relative_eq!(params.diffraction_efficiency(range), expected, max_relative = 1e-2);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let params = LinkParameters::default();
        assert_eq!(
            end_to_end(&params, &[0.5, 0.5], &[500e3]),
            Err(LinkError::ShapeMismatch {
                what: "transmittance/range",
                left: 2,
                right: 1
            })
        );
    }

    #[test]
    fn rejects_efficiency_above_one() {
        let params = LinkParameters {
            eta_rx: 1.2,
            ..LinkParameters::default()
        };
        assert!(matches!(
            end_to_end(&params, &[0.5], &[500e3]),
            Err(LinkError::InvalidParameter { name: "eta_rx", .. })
        ));
    }

    #[test]
    fn db_conversion() {
        assert_relative_eq!(to_db(0.001), 30.0, epsilon = 1e-9);
    }
}
