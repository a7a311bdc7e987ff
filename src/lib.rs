//! # hemesh
//!
//! hemesh is a half-edge mesh library for geometry-processing codes. It
//! couples recycling entity pools (stable, generation-tagged handles over
//! chunked slab storage) with a runtime-extensible property system
//! (type-erased columns parallel-indexed to the pools) and the half-edge
//! connectivity graph with its family of local traversal iterators.
//!
//! ## Features
//! - Entity pools with soft deletion, free-list reuse, and skip-dead
//!   iteration for vertices, edges, half-edges, and faces
//! - Dynamic per-element properties: attach and detach typed columns at
//!   runtime without changing the element types
//! - Manifold-preserving `add_face`/`delete_face` with incremental
//!   boundary stitching and explicit error reporting
//! - Vertex-star, one-ring, and face-loop circulators plus mesh-wide
//!   iteration
//! - OBJ/PLY/`.m` readers and writers built on the boundary API
//! - Barycentric coordinates, circumsphere computation, and umbrella
//!   denoising as algorithm collaborators
//!
//! ## Determinism
//!
//! All randomized routines take a caller-supplied `Rng`, so runs are
//! reproducible. Unit tests fix `SmallRng` seeds explicitly.
//!
//! ## Concurrency
//!
//! The core is single-threaded and lock-free by design. Rust's aliasing
//! rules enforce the access contract: mutation requires `&mut
//! HalfEdgeMesh`, which cannot coexist with live iterators or shared
//! readers. Sharing `&HalfEdgeMesh` across threads for read-only access
//! is the caller's affair.
//!
//! ## Usage
//! Add `hemesh` as a dependency in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! hemesh = "0.4"
//! ```
//!
//! ```rust
//! use hemesh::prelude::*;
//!
//! let mut mesh = HalfEdgeMesh::new();
//! let a = mesh.add_vertex([0.0, 0.0, 0.0]);
//! let b = mesh.add_vertex([1.0, 0.0, 0.0]);
//! let c = mesh.add_vertex([0.0, 1.0, 0.0]);
//! let f = mesh.add_face(&[a, b, c])?;
//!
//! let weight = mesh.add_vertex_property::<f64>("weight");
//! *mesh.vertex_property_mut(weight, a)? = 2.5;
//!
//! assert_eq!(mesh.face_degree(f)?, 3);
//! assert_eq!(mesh.one_ring(a).count(), 2);
//! # Ok::<(), hemesh::mesh_error::HemeshError>(())
//! ```

// Re-export our major subsystems:
pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod io;
pub mod mesh_error;
pub mod pool;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::denoise::{DenoiseParams, perturb_positions, umbrella_smooth};
    pub use crate::data::property::{PropHandle, PropertyValue};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::barycentric::barycentric_coordinates;
    pub use crate::geometry::circumsphere::{
        Circumsphere, tetrahedron_circumsphere, triangle_circumsphere,
    };
    pub use crate::mesh_error::HemeshError;
    pub use crate::pool::handle::{
        EdgeHandle, FaceHandle, Handle, HalfEdgeHandle, RawHandle, VertexHandle,
    };
    pub use crate::pool::slab::EntityPool;
    pub use crate::topology::element::{Edge, Entity, EntityKind, Face, HalfEdge, Vertex};
    pub use crate::topology::mesh::HalfEdgeMesh;
    pub use crate::topology::validation::validate_topology;
}
