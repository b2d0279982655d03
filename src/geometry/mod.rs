mod error;
pub mod frames;
mod visibility;

pub use error::GeometryError;
pub use visibility::{visible, visible_batch, DEFAULT_OCCLUSION_RADIUS_M};

pub type Vector3 = [f64; 3];

pub fn norm(v: Vector3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub fn sub(a: Vector3, b: Vector3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}
