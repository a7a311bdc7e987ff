//! Mesh denoising by iterative umbrella smoothing.
//!
//! Each pass moves every interior vertex a fraction of the way toward the
//! centroid of its 1-ring; boundary vertices stay pinned so open meshes
//! keep their rim. All geometry access goes through positions and the
//! one-ring iterator; connectivity is never touched.
//!
//! Randomness (for the noise-injection helper) is always caller-supplied,
//! so runs are reproducible from a seed.

use crate::geometry::vec3::{add, scale, sub};
use crate::mesh_error::HemeshError;
use crate::topology::mesh::HalfEdgeMesh;
use rand::Rng;

/// Parameters for [`umbrella_smooth`].
#[derive(Clone, Copy, Debug)]
pub struct DenoiseParams {
    /// Number of smoothing passes.
    pub iterations: usize,
    /// Fraction of the centroid offset applied per pass, in `(0, 1]`.
    pub step: f64,
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            iterations: 10,
            step: 0.5,
        }
    }
}

/// Runs umbrella (Laplacian) smoothing over all interior vertices.
///
/// # Errors
/// [`HemeshError::InvalidGeometry`] for a non-finite or out-of-range
/// `step`; propagated handle errors cannot occur for handles the mesh
/// itself yields.
pub fn umbrella_smooth(
    mesh: &mut HalfEdgeMesh,
    params: &DenoiseParams,
) -> Result<(), HemeshError> {
    if !params.step.is_finite() || params.step <= 0.0 || params.step > 1.0 {
        return Err(HemeshError::InvalidGeometry(format!(
            "smoothing step {} outside (0, 1]",
            params.step
        )));
    }

    for _ in 0..params.iterations {
        let mut updates = Vec::with_capacity(mesh.vertex_count());
        for v in mesh.vertices() {
            if mesh.is_boundary_vertex(v)? {
                continue;
            }
            let mut centroid = [0.0; 3];
            let mut ring = 0usize;
            for neighbor in mesh.one_ring(v) {
                centroid = add(centroid, mesh.position(neighbor)?);
                ring += 1;
            }
            if ring == 0 {
                continue;
            }
            let centroid = scale(centroid, 1.0 / ring as f64);
            let p = mesh.position(v)?;
            updates.push((v, add(p, scale(sub(centroid, p), params.step))));
        }
        for (v, p) in updates {
            mesh.set_position(v, p)?;
        }
    }
    Ok(())
}

/// Displaces every vertex by a uniform random offset in
/// `[-amplitude, amplitude]` per axis. Used to synthesize noisy input for
/// denoising tests and demos.
///
/// # Errors
/// [`HemeshError::InvalidGeometry`] for a non-finite or negative
/// amplitude.
pub fn perturb_positions<R: Rng>(
    mesh: &mut HalfEdgeMesh,
    amplitude: f64,
    rng: &mut R,
) -> Result<(), HemeshError> {
    if !amplitude.is_finite() || amplitude < 0.0 {
        return Err(HemeshError::InvalidGeometry(format!(
            "perturbation amplitude {amplitude} must be finite and non-negative"
        )));
    }
    let handles: Vec<_> = mesh.vertices().collect();
    for v in handles {
        let p = mesh.position(v)?;
        let jitter = [
            rng.gen_range(-amplitude..=amplitude),
            rng.gen_range(-amplitude..=amplitude),
            rng.gen_range(-amplitude..=amplitude),
        ];
        mesh.set_position(v, add(p, jitter))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    /// Fan of triangles around a center vertex lifted off the ring plane.
    fn spike_fan() -> (HalfEdgeMesh, crate::pool::handle::VertexHandle) {
        let mut mesh = HalfEdgeMesh::new();
        let center = mesh.add_vertex([0.0, 0.0, 1.0]);
        let ring: Vec<_> = (0..6)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 6.0;
                mesh.add_vertex([angle.cos(), angle.sin(), 0.0])
            })
            .collect();
        for i in 0..6 {
            mesh.add_face(&[center, ring[i], ring[(i + 1) % 6]]).unwrap();
        }
        (mesh, center)
    }

    #[test]
    fn smoothing_pulls_spike_toward_ring() {
        let (mut mesh, center) = spike_fan();
        umbrella_smooth(&mut mesh, &DenoiseParams::default()).unwrap();
        let z = mesh.position(center).unwrap()[2];
        assert!(z.abs() < 1e-2, "spike height {z} not flattened");
    }

    #[test]
    fn boundary_vertices_stay_pinned() {
        let (mut mesh, center) = spike_fan();
        let before: Vec<_> = mesh
            .vertices()
            .filter(|&v| v != center)
            .map(|v| mesh.position(v).unwrap())
            .collect();
        umbrella_smooth(&mut mesh, &DenoiseParams::default()).unwrap();
        let after: Vec<_> = mesh
            .vertices()
            .filter(|&v| v != center)
            .map(|v| mesh.position(v).unwrap())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn invalid_step_rejected() {
        let (mut mesh, _) = spike_fan();
        let params = DenoiseParams {
            iterations: 1,
            step: 0.0,
        };
        assert!(umbrella_smooth(&mut mesh, &params).is_err());
    }

    #[test]
    fn perturbation_is_seed_deterministic() {
        let (mut a, _) = spike_fan();
        let (mut b, _) = spike_fan();
        let mut rng_a = SmallRng::seed_from_u64(42);
        let mut rng_b = SmallRng::seed_from_u64(42);
        perturb_positions(&mut a, 0.1, &mut rng_a).unwrap();
        perturb_positions(&mut b, 0.1, &mut rng_b).unwrap();
        let pa: Vec<_> = a.vertices().map(|v| a.position(v).unwrap()).collect();
        let pb: Vec<_> = b.vertices().map(|v| b.position(v).unwrap()).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn smooth_then_denoise_recovers_flat_fan() {
        let mut mesh = HalfEdgeMesh::new();
        let center = mesh.add_vertex([0.0, 0.0, 0.0]);
        let ring: Vec<_> = (0..6)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 6.0;
                mesh.add_vertex([angle.cos(), angle.sin(), 0.0])
            })
            .collect();
        for i in 0..6 {
            mesh.add_face(&[center, ring[i], ring[(i + 1) % 6]]).unwrap();
        }
        // Lift only the interior vertex, then smooth it back down.
        mesh.set_position(center, [0.0, 0.0, 0.3]).unwrap();
        let params = DenoiseParams {
            iterations: 25,
            step: 0.8,
        };
        umbrella_smooth(&mut mesh, &params).unwrap();
        assert!(mesh.position(center).unwrap()[2].abs() < 1e-6);
    }
}
