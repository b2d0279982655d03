use crate::geometry::frames::ecef_to_enu;
use crate::geometry::{norm, sub, Vector3};

// WGS-84
const WGS84_A_M: f64 = 6_378_137.0;
const WGS84_E2: f64 = 0.006_694_379_990_14;

/// Fixed observation point on the WGS-84 ellipsoid.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundStation {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

/// Where a target sits in a station's topocentric frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub range_m: f64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

impl GroundStation {
    pub fn new(name: impl Into<String>, latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            name: name.into(),
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Parse `"lat, lon"` coordinates.
    pub fn from_coordinates(name: &str, coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return None;
        }
        let lat = parts[0].parse().ok()?;
        let lon = parts[1].parse().ok()?;
        Some(Self::new(name, lat, lon, altitude_m.unwrap_or(0.0)))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_m(&self) -> Vector3 {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let n = WGS84_A_M / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let h = self.altitude_m;
        [
            (n + h) * cos_lat * cos_lon,
            (n + h) * cos_lat * sin_lon,
            (n * (1.0 - WGS84_E2) + h) * sin_lat,
        ]
    }

    /// Range, elevation and azimuth of an Earth-fixed position.
    pub fn look_at(&self, target_ecef_m: Vector3) -> LookAngles {
        let dr = sub(target_ecef_m, self.position_ecef_m());
        let range_m = norm(dr);
        let (east, north, up) = ecef_to_enu(dr, self.lat_rad(), self.lon_rad());
        let elevation_deg = if range_m > 0.0 {
            (up / range_m).clamp(-1.0, 1.0).asin().to_degrees()
        } else {
            90.0
        };
        LookAngles {
            range_m,
            elevation_deg,
            azimuth_deg: east.atan2(north).to_degrees().rem_euclid(360.0),
        }
    }
}
