//! Barycentric coordinates of a point with respect to a triangle.

use crate::geometry::vec3::{dot, sub};
use crate::mesh_error::HemeshError;

const EPS: f64 = 1e-12;

/// Computes the barycentric coordinates `[u, v, w]` of `p` with respect
/// to the triangle `(a, b, c)`, with `u + v + w == 1` and
/// `p == u*a + v*b + w*c` for points in the triangle's plane.
///
/// For `p` off the plane the result describes the projection of `p` onto
/// the plane.
///
/// # Errors
/// [`HemeshError::InvalidGeometry`] if the triangle is degenerate.
///
/// # Example
/// ```rust
/// use hemesh::geometry::barycentric_coordinates;
/// let a = [0.0, 0.0, 0.0];
/// let b = [1.0, 0.0, 0.0];
/// let c = [0.0, 1.0, 0.0];
/// let bary = barycentric_coordinates([0.25, 0.25, 0.0], a, b, c)?;
/// assert!((bary[0] - 0.5).abs() < 1e-12);
/// assert!((bary[1] - 0.25).abs() < 1e-12);
/// assert!((bary[2] - 0.25).abs() < 1e-12);
/// # Ok::<(), hemesh::mesh_error::HemeshError>(())
/// ```
pub fn barycentric_coordinates(
    p: [f64; 3],
    a: [f64; 3],
    b: [f64; 3],
    c: [f64; 3],
) -> Result<[f64; 3], HemeshError> {
    let v0 = sub(b, a);
    let v1 = sub(c, a);
    let v2 = sub(p, a);
    let d00 = dot(v0, v0);
    let d01 = dot(v0, v1);
    let d11 = dot(v1, v1);
    let d20 = dot(v2, v0);
    let d21 = dot(v2, v1);
    let denom = d00 * d11 - d01 * d01;
    if !denom.is_finite() || denom.abs() <= EPS {
        return Err(HemeshError::InvalidGeometry(format!(
            "degenerate triangle: barycentric denominator = {denom}"
        )));
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Ok([1.0 - v - w, v, w])
}
