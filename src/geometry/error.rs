use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("point at {norm_m} m from the centre is not outside the reference sphere of radius {radius_m} m")]
    InsideBody { norm_m: f64, radius_m: f64 },
    #[error("batch length mismatch: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },
}
