mod error;
mod table;

pub use error::AtmosphereError;
pub use table::{TransmittanceTable, MAX_TABULATED_ROWS};

/// Source of atmospheric transmittance for a given zenith angle (deg).
pub trait TransmittanceModel {
    fn transmittance_at(&self, zenith_deg: f64) -> f64;
}

impl<F> TransmittanceModel for F
where
    F: Fn(f64) -> f64,
{
    fn transmittance_at(&self, zenith_deg: f64) -> f64 {
        self(zenith_deg)
    }
}
