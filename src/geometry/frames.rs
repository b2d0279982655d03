use chrono::{DateTime, Utc};

use super::Vector3;

/// Greenwich sidereal angle (rad) used to rotate inertial positions into the
/// Earth-fixed frame.
pub fn sidereal_angle(timestamp: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()))
}

pub fn inertial_to_ecef(position: Vector3, gmst: f64) -> Vector3 {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        position[0] * cos_gmst + position[1] * sin_gmst,
        -position[0] * sin_gmst + position[1] * cos_gmst,
        position[2],
    ]
}

/// East, north and up components of an Earth-fixed offset seen from the
/// given geodetic latitude/longitude.
pub fn ecef_to_enu(dr: Vector3, lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}
