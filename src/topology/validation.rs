//! Whole-mesh structural audit.
//!
//! Every mutating operation re-establishes the half-edge invariants
//! incrementally; this module re-derives them from scratch so debug
//! builds (and the `check-invariants` feature) catch a violation at the
//! mutation that introduced it, not at the traversal that trips over it.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::HemeshError;
use crate::topology::mesh::HalfEdgeMesh;
use hashbrown::HashSet;

/// Validates the half-edge connectivity of `mesh`.
///
/// Checked, in order:
/// - `sym` is an involution without fixed points;
/// - `next`/`prev` are mutually inverse and stay within live half-edges;
/// - every half-edge's edge points back at the half-edge or its `sym`;
/// - boundary loops are closed: the successor of a boundary half-edge is
///   a boundary half-edge;
/// - every face loop closes after exactly its degree (≥ 3) steps and owns
///   each half-edge on it;
/// - every vertex's star terminates, starts at an outgoing half-edge, and
///   honors the boundary-first convention.
///
/// # Errors
/// The first violated condition, as [`HemeshError::BrokenInvariant`].
pub fn validate_topology(mesh: &HalfEdgeMesh) -> Result<(), HemeshError> {
    let he_count = mesh.half_edge_count();

    for (h, rec) in mesh.half_edges.iter() {
        let sym_rec = mesh
            .half_edges
            .lookup(rec.sym)
            .ok_or_else(|| broken(format!("half-edge {h} has dead sym")))?;
        if rec.sym == h {
            return Err(broken(format!("half-edge {h} is its own sym")));
        }
        if sym_rec.sym != h {
            return Err(broken(format!("sym involution violated at half-edge {h}")));
        }
        let next_rec = mesh
            .half_edges
            .lookup(rec.next)
            .ok_or_else(|| broken(format!("half-edge {h} has dead next")))?;
        if next_rec.prev != h {
            return Err(broken(format!("next/prev not inverse at half-edge {h}")));
        }
        let edge_rec = mesh
            .edges
            .lookup(rec.edge)
            .ok_or_else(|| broken(format!("half-edge {h} has dead edge")))?;
        if edge_rec.half_edge != h && edge_rec.half_edge != rec.sym {
            return Err(broken(format!(
                "edge of half-edge {h} does not reference its pair"
            )));
        }
        if mesh.vertices.lookup(rec.vertex).is_none() {
            return Err(broken(format!("half-edge {h} targets dead vertex")));
        }
        if rec.face.is_none() && next_rec.face.is_some() {
            return Err(broken(format!("boundary loop broken after half-edge {h}")));
        }
    }

    for (e, rec) in mesh.edges.iter() {
        let he = mesh
            .half_edges
            .lookup(rec.half_edge)
            .ok_or_else(|| broken(format!("edge {e} references dead half-edge")))?;
        if he.edge != e {
            return Err(broken(format!("edge {e} and its half-edge disagree")));
        }
    }

    for (f, rec) in mesh.faces.iter() {
        let mut h = rec.half_edge;
        let mut degree = 0usize;
        loop {
            let he = mesh
                .half_edges
                .lookup(h)
                .ok_or_else(|| broken(format!("face {f} loop reaches dead half-edge")))?;
            if he.face != Some(f) {
                return Err(broken(format!(
                    "half-edge on face {f} loop owned by another face"
                )));
            }
            degree += 1;
            if degree > he_count {
                return Err(broken(format!("face {f} loop does not close")));
            }
            h = he.next;
            if h == rec.half_edge {
                break;
            }
        }
        if degree < 3 {
            return Err(broken(format!("face {f} has degree {degree}")));
        }
    }

    for (v, rec) in mesh.vertices.iter() {
        let Some(start) = rec.half_edge else {
            continue;
        };
        let mut seen = HashSet::new();
        let mut boundary_seen = false;
        let mut h = start;
        loop {
            if !seen.insert(h) {
                return Err(broken(format!("vertex {v} star revisits a half-edge")));
            }
            if seen.len() > he_count {
                return Err(broken(format!("vertex {v} star does not terminate")));
            }
            let he = mesh
                .half_edges
                .lookup(h)
                .ok_or_else(|| broken(format!("vertex {v} star reaches dead half-edge")))?;
            let sym_rec = mesh
                .half_edges
                .lookup(he.sym)
                .ok_or_else(|| broken(format!("vertex {v} star reaches dead sym")))?;
            if sym_rec.vertex != v {
                return Err(broken(format!(
                    "vertex {v} star contains a non-outgoing half-edge"
                )));
            }
            boundary_seen |= he.face.is_none();
            h = sym_rec.next;
            if h == start {
                break;
            }
        }
        // Boundary-first convention: if any outgoing half-edge is
        // boundary, the stored one must be.
        if boundary_seen {
            let stored = mesh
                .half_edges
                .lookup(start)
                .ok_or_else(|| broken(format!("vertex {v} references dead half-edge")))?;
            if stored.face.is_some() {
                return Err(broken(format!(
                    "boundary vertex {v} stores an interior half-edge"
                )));
            }
        }
    }

    Ok(())
}

impl DebugInvariants for HalfEdgeMesh {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "HalfEdgeMesh invalid");
    }

    fn validate_invariants(&self) -> Result<(), HemeshError> {
        validate_topology(self)
    }
}

fn broken(message: String) -> HemeshError {
    HemeshError::BrokenInvariant(message)
}
