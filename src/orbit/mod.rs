mod descriptor;
mod error;
mod kepler;
mod satellite;
mod tle;

use chrono::{DateTime, Utc};

use crate::geometry::Vector3;

pub use descriptor::OrbitDescriptor;
pub use error::OrbitError;
pub use kepler::{AnomalyKind, KeplerPropagator, KeplerianElements, WGS84_EARTH_MU};
pub use satellite::{PolarPassOrbit, Propagation, Satellite};
pub use tle::TlePropagator;

/// Anything that can place a satellite in an Earth-centred inertial frame.
pub trait OrbitStateProvider {
    /// Inertial position in metres.
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Vector3, OrbitError>;
}
