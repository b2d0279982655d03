use super::{norm, sub, GeometryError, Vector3};

/// Earth radius plus a margin for the dense atmosphere (metres).
pub const DEFAULT_OCCLUSION_RADIUS_M: f64 = 6450e3;

/// Line-of-sight check between two points around a sphere centred at the origin.
///
/// The segment is considered clear when its length is shorter than the sum of
/// the tangent-line lengths from each point to the sphere. This is a horizon
/// approximation, not an exact segment/sphere intersection.
pub fn visible(a: Vector3, b: Vector3, radius_m: f64) -> Result<bool, GeometryError> {
    let r2 = radius_m * radius_m;
    let tangent_a = tangent_length(a, r2, radius_m)?;
    let tangent_b = tangent_length(b, r2, radius_m)?;
    Ok(norm(sub(a, b)) < tangent_a + tangent_b)
}

/// Elementwise [`visible`] over two equally sized batches of points.
pub fn visible_batch(
    a: &[Vector3],
    b: &[Vector3],
    radius_m: f64,
) -> Result<Vec<bool>, GeometryError> {
    if a.len() != b.len() {
        return Err(GeometryError::ShapeMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    a.iter()
        .zip(b)
        .map(|(pa, pb)| visible(*pa, *pb, radius_m))
        .collect()
}

fn tangent_length(p: Vector3, r2: f64, radius_m: f64) -> Result<f64, GeometryError> {
    let n2 = p[0] * p[0] + p[1] * p[1] + p[2] * p[2];
    if n2.is_nan() || n2 <= r2 {
        return Err(GeometryError::InsideBody {
            norm_m: n2.sqrt(),
            radius_m,
        });
    }
    Ok((n2 - r2).sqrt())
}
