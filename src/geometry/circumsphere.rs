//! Circumscribed circles and spheres for simplices.

use crate::geometry::vec3::{add, cross, distance, dot, scale, sub};
use crate::mesh_error::HemeshError;

const EPS: f64 = 1e-12;

/// Center and radius of a circumscribed circle or sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circumsphere {
    /// Center point, equidistant from the defining vertices.
    pub center: [f64; 3],
    /// Distance from the center to each defining vertex.
    pub radius: f64,
}

impl Circumsphere {
    /// Whether `p` lies strictly inside the sphere.
    #[inline]
    pub fn contains(&self, p: [f64; 3]) -> bool {
        distance(self.center, p) < self.radius
    }
}

/// Circumcircle of the triangle `(a, b, c)` in 3-space.
///
/// # Errors
/// [`HemeshError::InvalidGeometry`] if the triangle is degenerate.
pub fn triangle_circumsphere(
    a: [f64; 3],
    b: [f64; 3],
    c: [f64; 3],
) -> Result<Circumsphere, HemeshError> {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let n = cross(ab, ac);
    let denom = 2.0 * dot(n, n);
    if !denom.is_finite() || denom.abs() <= EPS {
        return Err(HemeshError::InvalidGeometry(format!(
            "degenerate triangle: doubled area squared = {denom}"
        )));
    }
    let offset = scale(
        add(
            scale(cross(n, ab), dot(ac, ac)),
            scale(cross(ac, n), dot(ab, ab)),
        ),
        1.0 / denom,
    );
    let center = add(a, offset);
    Ok(Circumsphere {
        center,
        radius: distance(center, a),
    })
}

/// Circumsphere of the tetrahedron `(a, b, c, d)`.
///
/// # Errors
/// [`HemeshError::InvalidGeometry`] if the tetrahedron is degenerate
/// (near-zero volume).
pub fn tetrahedron_circumsphere(
    a: [f64; 3],
    b: [f64; 3],
    c: [f64; 3],
    d: [f64; 3],
) -> Result<Circumsphere, HemeshError> {
    let u = sub(b, a);
    let v = sub(c, a);
    let w = sub(d, a);
    let det = dot(u, cross(v, w));
    if !det.is_finite() || det.abs() <= EPS {
        return Err(HemeshError::InvalidGeometry(format!(
            "degenerate tetrahedron: determinant = {det}"
        )));
    }
    let offset = scale(
        add(
            add(
                scale(cross(v, w), dot(u, u)),
                scale(cross(w, u), dot(v, v)),
            ),
            scale(cross(u, v), dot(w, w)),
        ),
        1.0 / (2.0 * det),
    );
    let center = add(a, offset);
    Ok(Circumsphere {
        center,
        radius: distance(center, a),
    })
}
