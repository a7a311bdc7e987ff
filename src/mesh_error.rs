//! HemeshError: Unified error type for hemesh public APIs
//!
//! This error type is used throughout the hemesh library to provide robust,
//! non-panicking error handling for all public APIs.

use crate::topology::element::EntityKind;
use thiserror::Error;

/// Unified error type for hemesh operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HemeshError {
    /// A handle referred to a dead, stale (slot since recycled), or
    /// out-of-range pool slot.
    #[error("invalid {kind} handle: slot {index} is dead, stale, or out of range")]
    InvalidHandle {
        /// Element kind of the offending handle.
        kind: EntityKind,
        /// Flat slot index carried by the handle.
        index: u32,
    },
    /// A property handle or name referred to a removed or never-registered
    /// column.
    #[error("unknown property `{name}`")]
    UnknownProperty {
        /// Name the column was (or would have been) registered under.
        name: String,
    },
    /// A property was accessed with a value type other than the one it was
    /// registered with.
    #[error("property `{name}` holds `{stored}`, accessed as `{requested}`")]
    TypeMismatch {
        /// Registered column name.
        name: String,
        /// Type the column actually stores.
        stored: &'static str,
        /// Type the caller asked for.
        requested: &'static str,
    },
    /// An element index exceeded the length of a property column.
    #[error("element index {index} out of range for property column of length {len}")]
    IndexOutOfRange {
        /// Offending element index.
        index: u32,
        /// Current column length.
        len: usize,
    },
    /// An edge would gain a third incident face.
    #[error("non-manifold edge: a third face would claim the edge from vertex {from} to {to}")]
    NonManifoldEdge {
        /// Source vertex slot of the directed pair.
        from: u32,
        /// Target vertex slot of the directed pair.
        to: u32,
    },
    /// A face insertion would make a vertex's star non-manifold.
    #[error("non-manifold vertex: vertex {0} is already fully surrounded by faces")]
    NonManifoldVertex(u32),
    /// Fewer than 3 distinct vertices were supplied to `add_face`.
    #[error("degenerate face: {distinct} distinct vertices supplied, need at least 3")]
    DegenerateFace {
        /// Number of distinct vertices after deduplication.
        distinct: usize,
    },
    /// Geometric input was degenerate (zero area/volume, non-finite values).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A structural invariant was found violated (corrupt connectivity).
    #[error("broken topology invariant: {0}")]
    BrokenInvariant(String),
}
