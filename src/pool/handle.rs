//! `Handle`: a strong, zero-cost reference to a pool slot
//!
//! Every mesh element is named by an opaque handle instead of a raw
//! pointer or bare index. A handle carries the flat slot index together
//! with the slot's generation at the time the element was created, so a
//! handle that outlives its element is *detected* when resolved (the slot
//! generation has moved on) rather than silently aliasing the slot's new
//! occupant.
//!
//! This module provides:
//! - `RawHandle`, the untyped `(index, generation)` pair.
//! - `Handle<E>`, the same pair tagged with its element kind at the type
//!   level, so a `VertexHandle` cannot be passed where a `FaceHandle` is
//!   expected.
//! - Implementations of common traits (`Debug`, `Display`, ordering,
//!   hashing, serde) so handles can be used in maps, sets, and printed
//!   easily.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::topology::element::Entity;

/// Untyped slot reference: flat index plus slot generation.
///
/// # Memory layout
/// `repr(C)`: two `u32`s, 8 bytes total, `Copy` everywhere.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(C)]
pub struct RawHandle {
    index: u32,
    generation: u32,
}

impl RawHandle {
    /// Creates a raw handle from its parts.
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        RawHandle { index, generation }
    }

    /// Flat slot index into the owning pool.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawHandle")
            .field(&self.index)
            .field(&self.generation)
            .finish()
    }
}

/// Typed handle to an element of kind `E`.
///
/// The phantom parameter only tags the handle; the representation is
/// exactly a [`RawHandle`]. Handles are the only way external code names
/// an element; raw addresses are never exposed, and the topology graph
/// itself stores handles, never pointers.
#[repr(transparent)]
pub struct Handle<E> {
    raw: RawHandle,
    _kind: PhantomData<fn() -> E>,
}

/// Handle to a [`Vertex`](crate::topology::element::Vertex).
pub type VertexHandle = Handle<crate::topology::element::Vertex>;
/// Handle to an [`Edge`](crate::topology::element::Edge).
pub type EdgeHandle = Handle<crate::topology::element::Edge>;
/// Handle to a [`HalfEdge`](crate::topology::element::HalfEdge).
pub type HalfEdgeHandle = Handle<crate::topology::element::HalfEdge>;
/// Handle to a [`Face`](crate::topology::element::Face).
pub type FaceHandle = Handle<crate::topology::element::Face>;

impl<E> Handle<E> {
    /// Creates a typed handle from its parts.
    ///
    /// Pools are the only issuers of *valid* handles; constructing one by
    /// hand is allowed (it is just data) but resolving it is fallible.
    #[inline]
    pub const fn from_raw(raw: RawHandle) -> Self {
        Handle {
            raw,
            _kind: PhantomData,
        }
    }

    /// Creates a typed handle from index and generation.
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self::from_raw(RawHandle::new(index, generation))
    }

    /// The untyped `(index, generation)` pair.
    #[inline]
    pub const fn raw(self) -> RawHandle {
        self.raw
    }

    /// Flat slot index into the owning pool.
    #[inline]
    pub const fn index(self) -> u32 {
        self.raw.index()
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.raw.generation()
    }
}

// Manual trait impls: the derives would wrongly bound `E`.

impl<E> Copy for Handle<E> {}

impl<E> Clone for Handle<E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> PartialEq for Handle<E> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<E> Eq for Handle<E> {}

impl<E> PartialOrd for Handle<E> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Handle<E> {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<E> Hash for Handle<E> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<E: Entity> fmt::Debug for Handle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Handle<{}>({}, gen {})",
            E::KIND,
            self.raw.index(),
            self.raw.generation()
        )
    }
}

/// Prints only the slot index; the usual element name in diagnostics.
impl<E: Entity> fmt::Display for Handle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw.index())
    }
}

impl<E> serde::Serialize for Handle<E> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de, E> serde::Deserialize<'de> for Handle<E> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawHandle::deserialize(deserializer).map(Self::from_raw)
    }
}
