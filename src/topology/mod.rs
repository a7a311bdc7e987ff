//! Top-level module for the half-edge topology graph.
//!
//! This module provides the core types for representing and traversing a
//! manifold polygonal mesh:
//! - Element records and kind tags ([`element`])
//! - The [`HalfEdgeMesh`] connectivity graph and its mutating operations
//! - Local and mesh-wide traversal iterators ([`traversal`])
//! - A whole-mesh structural audit ([`validation`])
//!
//! Most users will interact with [`HalfEdgeMesh`] directly: insert
//! vertices and faces, attach properties, and walk neighborhoods through
//! the traversal iterators.

pub mod element;
pub mod mesh;
pub mod traversal;
pub mod validation;

pub use element::{Edge, Entity, EntityKind, Face, HalfEdge, Vertex};
pub use mesh::HalfEdgeMesh;
pub use traversal::{FaceHalfEdges, OutgoingHalfEdges};
pub use validation::validate_topology;
