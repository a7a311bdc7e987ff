//! `HalfEdgeMesh`: the half-edge connectivity graph over four entity pools.
//!
//! All adjacency is stored as pool handles: the cyclic pointer graph of a
//! classic half-edge structure becomes an arena-plus-index design. Each
//! mutating operation re-establishes the manifold invariants incrementally;
//! there is no global rebuild step.
//!
//! Two conventions carry the boundary logic:
//! - a half-edge with `face: None` is a boundary half-edge, and boundary
//!   half-edges form closed loops around holes;
//! - a boundary vertex's stored outgoing half-edge is always a boundary
//!   half-edge, which makes the boundary gap around a vertex addressable
//!   in O(1) during face insertion.

use crate::data::property::{PropHandle, PropertyRegistry, PropertyValue};
use crate::mesh_error::HemeshError;
use crate::pool::handle::{EdgeHandle, FaceHandle, Handle, HalfEdgeHandle, VertexHandle};
use crate::pool::slab::EntityPool;
use crate::topology::element::{Edge, Face, HalfEdge, Vertex};

/// Placeholder written into half-edge links during pair construction and
/// overwritten before the mutation returns. Never observable from outside.
const NULL_HE: HalfEdgeHandle = Handle::new(u32::MAX, u32::MAX);

/// A manifold polygonal mesh in half-edge representation.
///
/// Elements live in recycling [`EntityPool`]s; per-element dynamic
/// properties live in one [`PropertyRegistry`] per element kind, indexed
/// by the same slots as the pools.
#[derive(Debug, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: EntityPool<Vertex>,
    pub(crate) edges: EntityPool<Edge>,
    pub(crate) half_edges: EntityPool<HalfEdge>,
    pub(crate) faces: EntityPool<Face>,
    vertex_props: PropertyRegistry<Vertex>,
    edge_props: PropertyRegistry<Edge>,
    half_edge_props: PropertyRegistry<HalfEdge>,
    face_props: PropertyRegistry<Face>,
}

impl HalfEdgeMesh {
    /// Creates a new, empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Element counts ---

    /// Number of live vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.live_count()
    }

    /// Number of live edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.live_count()
    }

    /// Number of live half-edges.
    #[inline]
    pub fn half_edge_count(&self) -> usize {
        self.half_edges.live_count()
    }

    /// Number of live faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.live_count()
    }

    // --- Element accessors ---

    /// Returns the vertex record behind `v`.
    ///
    /// # Errors
    /// `InvalidHandle` if `v` is dead, stale, or out of range.
    pub fn vertex(&self, v: VertexHandle) -> Result<&Vertex, HemeshError> {
        self.vertices.get(v)
    }

    /// Returns the edge record behind `e`.
    ///
    /// # Errors
    /// `InvalidHandle` if `e` is dead, stale, or out of range.
    pub fn edge(&self, e: EdgeHandle) -> Result<&Edge, HemeshError> {
        self.edges.get(e)
    }

    /// Returns the half-edge record behind `h`.
    ///
    /// # Errors
    /// `InvalidHandle` if `h` is dead, stale, or out of range.
    pub fn half_edge(&self, h: HalfEdgeHandle) -> Result<&HalfEdge, HemeshError> {
        self.half_edges.get(h)
    }

    /// Returns the face record behind `f`.
    ///
    /// # Errors
    /// `InvalidHandle` if `f` is dead, stale, or out of range.
    pub fn face(&self, f: FaceHandle) -> Result<&Face, HemeshError> {
        self.faces.get(f)
    }

    /// Position of vertex `v`.
    ///
    /// # Errors
    /// `InvalidHandle` if `v` is dead, stale, or out of range.
    pub fn position(&self, v: VertexHandle) -> Result<[f64; 3], HemeshError> {
        Ok(self.vertices.get(v)?.position)
    }

    /// Overwrites the position of vertex `v`.
    ///
    /// # Errors
    /// `InvalidHandle` if `v` is dead, stale, or out of range.
    pub fn set_position(&mut self, v: VertexHandle, position: [f64; 3]) -> Result<(), HemeshError> {
        self.vertices.get_mut(v)?.position = position;
        Ok(())
    }

    // --- Boundary and adjacency queries ---

    /// The vertex a half-edge points to.
    ///
    /// # Errors
    /// `InvalidHandle` if `h` is dead, stale, or out of range.
    pub fn to_vertex(&self, h: HalfEdgeHandle) -> Result<VertexHandle, HemeshError> {
        Ok(self.half_edges.get(h)?.vertex)
    }

    /// The vertex a half-edge leaves from.
    ///
    /// # Errors
    /// `InvalidHandle` if `h` is dead, stale, or out of range.
    pub fn from_vertex(&self, h: HalfEdgeHandle) -> Result<VertexHandle, HemeshError> {
        let sym = self.half_edges.get(h)?.sym;
        Ok(self.he(sym).vertex)
    }

    /// Whether `h` is a boundary half-edge (no owning face).
    ///
    /// # Errors
    /// `InvalidHandle` if `h` is dead, stale, or out of range.
    pub fn is_boundary_half_edge(&self, h: HalfEdgeHandle) -> Result<bool, HemeshError> {
        Ok(self.half_edges.get(h)?.face.is_none())
    }

    /// Whether `e` has a boundary side.
    ///
    /// # Errors
    /// `InvalidHandle` if `e` is dead, stale, or out of range.
    pub fn is_boundary_edge(&self, e: EdgeHandle) -> Result<bool, HemeshError> {
        let h = self.edges.get(e)?.half_edge;
        let rec = self.he(h);
        Ok(rec.face.is_none() || self.he(rec.sym).face.is_none())
    }

    /// Whether `v` lies on the mesh boundary (isolated vertices count as
    /// boundary).
    ///
    /// # Errors
    /// `InvalidHandle` if `v` is dead, stale, or out of range.
    pub fn is_boundary_vertex(&self, v: VertexHandle) -> Result<bool, HemeshError> {
        let rec = self.vertices.get(v)?;
        // Boundary-first convention: if any outgoing half-edge is boundary,
        // the stored one is.
        Ok(match rec.half_edge {
            None => true,
            Some(h) => self.he(h).face.is_none(),
        })
    }

    /// Finds the half-edge from `u` to `v`, if the mesh contains one.
    ///
    /// O(degree of `u`): scans the vertex star, no side table.
    ///
    /// # Errors
    /// `InvalidHandle` if either vertex handle is dead, stale, or out of
    /// range.
    pub fn find_half_edge(
        &self,
        u: VertexHandle,
        v: VertexHandle,
    ) -> Result<Option<HalfEdgeHandle>, HemeshError> {
        self.vertices.get(u)?;
        self.vertices.get(v)?;
        Ok(self.find_half_edge_internal(u, v))
    }

    // --- Mutating operations ---

    /// Inserts an isolated vertex at `position` and returns its handle.
    ///
    /// The vertex has no outgoing half-edge until a face first touches it.
    pub fn add_vertex(&mut self, position: [f64; 3]) -> VertexHandle {
        let v = self.vertices.insert(Vertex {
            half_edge: None,
            position,
        });
        self.vertex_props.ensure_capacity(self.vertices.capacity());
        self.vertex_props.reset_index(v.index());
        v
    }

    /// Inserts a face over `verts`, given in cyclic order.
    ///
    /// Existing boundary half-edges along the loop are reused; missing
    /// ones are allocated as fresh pairs (two half-edges, one edge). The
    /// surrounding boundary loops are re-stitched so every invariant holds
    /// again when this returns. No mutation happens on any error path.
    ///
    /// # Errors
    /// - `DegenerateFace` for fewer than 3 distinct vertices;
    /// - `InvalidHandle` for a dead or stale vertex handle;
    /// - `NonManifoldVertex` for a vertex already fully surrounded by
    ///   faces, or repeated within `verts`;
    /// - `NonManifoldEdge` if an edge of the loop already carries a face
    ///   on this side, or the surrounding boundary cannot be re-stitched.
    pub fn add_face(&mut self, verts: &[VertexHandle]) -> Result<FaceHandle, HemeshError> {
        let n = verts.len();
        let mut distinct = 0usize;
        let mut repeated = None;
        for (i, &v) in verts.iter().enumerate() {
            if verts[..i].contains(&v) {
                repeated.get_or_insert(v);
            } else {
                distinct += 1;
            }
        }
        if distinct < 3 {
            return Err(HemeshError::DegenerateFace { distinct });
        }
        if let Some(v) = repeated {
            // A repeated vertex would pinch the face into a non-manifold
            // configuration.
            return Err(HemeshError::NonManifoldVertex(v.index()));
        }

        for &v in verts {
            let rec = self.vertices.get(v)?;
            if let Some(h) = rec.half_edge {
                if self.he(h).face.is_some() {
                    return Err(HemeshError::NonManifoldVertex(v.index()));
                }
            }
        }

        // Locate existing half-edges along the loop; each must be boundary.
        let mut hes: Vec<Option<HalfEdgeHandle>> = Vec::with_capacity(n);
        for i in 0..n {
            let u = verts[i];
            let w = verts[(i + 1) % n];
            let found = self.find_half_edge_internal(u, w);
            if let Some(h) = found {
                if self.he(h).face.is_some() {
                    return Err(HemeshError::NonManifoldEdge {
                        from: u.index(),
                        to: w.index(),
                    });
                }
            }
            hes.push(found);
        }
        let is_new: Vec<bool> = hes.iter().map(Option::is_none).collect();

        // Where two existing boundary half-edges meet but are not yet
        // consecutive, the boundary chain between them must be relinked
        // into the gap elsewhere around the shared vertex. Record the
        // relinks now (read-only) so any failure leaves the mesh untouched.
        let mut next_cache: Vec<(HalfEdgeHandle, HalfEdgeHandle)> = Vec::with_capacity(6 * n);
        for i in 0..n {
            let ii = (i + 1) % n;
            let (Some(inner_prev), Some(inner_next)) = (hes[i], hes[ii]) else {
                continue;
            };
            if self.he(inner_prev).next == inner_next {
                continue;
            }
            let outer_prev = self.he(inner_next).sym;
            let mut boundary_prev = outer_prev;
            loop {
                boundary_prev = self.he(self.he(boundary_prev).next).sym;
                if self.he(boundary_prev).face.is_none() {
                    break;
                }
            }
            if boundary_prev == inner_prev {
                return Err(HemeshError::NonManifoldEdge {
                    from: verts[i].index(),
                    to: verts[ii].index(),
                });
            }
            let boundary_next = self.he(boundary_prev).next;
            let patch_start = self.he(inner_prev).next;
            let patch_end = self.he(inner_next).prev;
            next_cache.push((boundary_prev, patch_start));
            next_cache.push((patch_end, boundary_next));
            next_cache.push((inner_prev, inner_next));
        }

        // All checks passed; start mutating. Allocate the missing pairs.
        for i in 0..n {
            if hes[i].is_none() {
                hes[i] = Some(self.new_edge_pair(verts[i], verts[(i + 1) % n]));
            }
        }
        let hs: Vec<HalfEdgeHandle> = hes
            .into_iter()
            .map(|h| h.expect("every loop slot filled above"))
            .collect();

        let fh = self.faces.insert(Face {
            half_edge: hs[n - 1],
        });
        self.face_props.ensure_capacity(self.faces.capacity());
        self.face_props.reset_index(fh.index());

        // Wire each corner of the new face and stitch the boundary around
        // its vertex.
        let mut needs_adjust = vec![false; n];
        for i in 0..n {
            let ii = (i + 1) % n;
            let vh = verts[ii];
            let inner_prev = hs[i];
            let inner_next = hs[ii];
            match (is_new[i], is_new[ii]) {
                (false, false) => {
                    // Both edges existed; only the vertex's outgoing
                    // half-edge may need re-pointing once done.
                    needs_adjust[ii] = self.vertex_ref(vh).half_edge == Some(inner_next);
                }
                (true, false) => {
                    let outer_next = self.he(inner_prev).sym;
                    let boundary_prev = self.he(inner_next).prev;
                    next_cache.push((boundary_prev, outer_next));
                    next_cache.push((inner_prev, inner_next));
                    self.vertex_mut(vh).half_edge = Some(outer_next);
                }
                (false, true) => {
                    let outer_prev = self.he(inner_next).sym;
                    let boundary_next = self.he(inner_prev).next;
                    next_cache.push((outer_prev, boundary_next));
                    next_cache.push((inner_prev, inner_next));
                    self.vertex_mut(vh).half_edge = Some(boundary_next);
                }
                (true, true) => {
                    let outer_prev = self.he(inner_next).sym;
                    let outer_next = self.he(inner_prev).sym;
                    match self.vertex_ref(vh).half_edge {
                        None => {
                            // Isolated vertex: the two outer half-edges
                            // form its whole boundary loop for now.
                            self.vertex_mut(vh).half_edge = Some(outer_next);
                            next_cache.push((outer_prev, outer_next));
                        }
                        Some(boundary_next) => {
                            let boundary_prev = self.he(boundary_next).prev;
                            next_cache.push((boundary_prev, outer_next));
                            next_cache.push((outer_prev, boundary_next));
                        }
                    }
                    next_cache.push((inner_prev, inner_next));
                }
            }
            self.he_mut(hs[i]).face = Some(fh);
        }

        for (a, b) in next_cache {
            self.set_next(a, b);
        }
        for i in 0..n {
            if needs_adjust[i] {
                self.adjust_outgoing(verts[i]);
            }
        }

        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        crate::debug_invariants::DebugInvariants::debug_assert_invariants(self);
        Ok(fh)
    }

    /// Deletes face `f`.
    ///
    /// The face's half-edges are unlinked from face ownership and become
    /// boundary half-edges; the old face loop survives as a boundary
    /// loop, so a later `add_face` over the same vertices reuses it.
    /// Edges and vertices are never deleted implicitly; an edge left with
    /// boundary on both sides stays in the mesh until the caller runs
    /// [`prune_dangling_edges`](Self::prune_dangling_edges).
    ///
    /// # Errors
    /// `InvalidHandle` if `f` is dead, stale, or out of range.
    pub fn delete_face(&mut self, f: FaceHandle) -> Result<(), HemeshError> {
        self.faces.get(f)?;

        let loop_hes = self.collect_face_loop(f);
        for &h in &loop_hes {
            self.he_mut(h).face = None;
        }

        // Restore the boundary-first convention around the old loop.
        for &h in &loop_hes {
            let v = self.he(h).vertex;
            self.adjust_outgoing(v);
        }

        self.faces.remove(f)?;

        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        crate::debug_invariants::DebugInvariants::debug_assert_invariants(self);
        Ok(())
    }

    /// Soft-deletes every edge whose both sides are boundary, splicing the
    /// boundary chains around each removed pair.
    ///
    /// Face deletion leaves such edges behind by design; pruning them is a
    /// caller-triggered policy, like pool rebuilding. Returns the number
    /// of edges removed.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let doomed: Vec<EdgeHandle> = self
            .edges
            .iter()
            .filter(|(_, edge)| {
                let rec = self.he(edge.half_edge);
                rec.face.is_none() && self.he(rec.sym).face.is_none()
            })
            .map(|(e, _)| e)
            .collect();

        let mut touched: Vec<VertexHandle> = Vec::with_capacity(doomed.len() * 2);
        for &e in &doomed {
            let h0 = self
                .edges
                .lookup(e)
                .expect("doomed edge is live until removed below")
                .half_edge;
            let rec = self.he(h0);
            touched.push(rec.vertex);
            touched.push(self.he(rec.sym).vertex);
            self.remove_edge_pair(e);
        }
        for v in touched {
            self.adjust_outgoing(v);
        }

        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        crate::debug_invariants::DebugInvariants::debug_assert_invariants(self);
        doomed.len()
    }

    // --- Property API, one family per element kind ---

    /// Registers a vertex property column of `T` under `name`.
    pub fn add_vertex_property<T: PropertyValue>(&mut self, name: &str) -> PropHandle<Vertex, T> {
        self.vertex_props.ensure_capacity(self.vertices.capacity());
        self.vertex_props.add_property(name)
    }

    /// Removes a vertex property column.
    ///
    /// # Errors
    /// `UnknownProperty` if the handle is stale or already removed.
    pub fn remove_vertex_property<T: PropertyValue>(
        &mut self,
        handle: PropHandle<Vertex, T>,
    ) -> Result<(), HemeshError> {
        self.vertex_props.remove_property(handle)
    }

    /// Resolves a vertex property by name.
    ///
    /// # Errors
    /// `UnknownProperty` if absent, `TypeMismatch` if registered with a
    /// different value type.
    pub fn find_vertex_property<T: PropertyValue>(
        &self,
        name: &str,
    ) -> Result<PropHandle<Vertex, T>, HemeshError> {
        self.vertex_props.find_property(name)
    }

    /// Reads a vertex property value.
    ///
    /// # Errors
    /// `InvalidHandle` for a dead vertex, `UnknownProperty`/`TypeMismatch`
    /// /`IndexOutOfRange` from the registry.
    pub fn vertex_property<T: PropertyValue>(
        &self,
        handle: PropHandle<Vertex, T>,
        v: VertexHandle,
    ) -> Result<&T, HemeshError> {
        self.vertices.get(v)?;
        self.vertex_props.get(handle, v.index())
    }

    /// Mutable access to a vertex property value.
    ///
    /// # Errors
    /// As [`vertex_property`](Self::vertex_property).
    pub fn vertex_property_mut<T: PropertyValue>(
        &mut self,
        handle: PropHandle<Vertex, T>,
        v: VertexHandle,
    ) -> Result<&mut T, HemeshError> {
        self.vertices.get(v)?;
        self.vertex_props.get_mut(handle, v.index())
    }

    /// Registers an edge property column of `T` under `name`.
    pub fn add_edge_property<T: PropertyValue>(&mut self, name: &str) -> PropHandle<Edge, T> {
        self.edge_props.ensure_capacity(self.edges.capacity());
        self.edge_props.add_property(name)
    }

    /// Removes an edge property column.
    ///
    /// # Errors
    /// `UnknownProperty` if the handle is stale or already removed.
    pub fn remove_edge_property<T: PropertyValue>(
        &mut self,
        handle: PropHandle<Edge, T>,
    ) -> Result<(), HemeshError> {
        self.edge_props.remove_property(handle)
    }

    /// Resolves an edge property by name.
    ///
    /// # Errors
    /// `UnknownProperty` if absent, `TypeMismatch` on a different type.
    pub fn find_edge_property<T: PropertyValue>(
        &self,
        name: &str,
    ) -> Result<PropHandle<Edge, T>, HemeshError> {
        self.edge_props.find_property(name)
    }

    /// Reads an edge property value.
    ///
    /// # Errors
    /// As the vertex counterpart.
    pub fn edge_property<T: PropertyValue>(
        &self,
        handle: PropHandle<Edge, T>,
        e: EdgeHandle,
    ) -> Result<&T, HemeshError> {
        self.edges.get(e)?;
        self.edge_props.get(handle, e.index())
    }

    /// Mutable access to an edge property value.
    ///
    /// # Errors
    /// As the vertex counterpart.
    pub fn edge_property_mut<T: PropertyValue>(
        &mut self,
        handle: PropHandle<Edge, T>,
        e: EdgeHandle,
    ) -> Result<&mut T, HemeshError> {
        self.edges.get(e)?;
        self.edge_props.get_mut(handle, e.index())
    }

    /// Registers a half-edge property column of `T` under `name`.
    pub fn add_half_edge_property<T: PropertyValue>(
        &mut self,
        name: &str,
    ) -> PropHandle<HalfEdge, T> {
        self.half_edge_props
            .ensure_capacity(self.half_edges.capacity());
        self.half_edge_props.add_property(name)
    }

    /// Removes a half-edge property column.
    ///
    /// # Errors
    /// `UnknownProperty` if the handle is stale or already removed.
    pub fn remove_half_edge_property<T: PropertyValue>(
        &mut self,
        handle: PropHandle<HalfEdge, T>,
    ) -> Result<(), HemeshError> {
        self.half_edge_props.remove_property(handle)
    }

    /// Resolves a half-edge property by name.
    ///
    /// # Errors
    /// `UnknownProperty` if absent, `TypeMismatch` on a different type.
    pub fn find_half_edge_property<T: PropertyValue>(
        &self,
        name: &str,
    ) -> Result<PropHandle<HalfEdge, T>, HemeshError> {
        self.half_edge_props.find_property(name)
    }

    /// Reads a half-edge property value.
    ///
    /// # Errors
    /// As the vertex counterpart.
    pub fn half_edge_property<T: PropertyValue>(
        &self,
        handle: PropHandle<HalfEdge, T>,
        h: HalfEdgeHandle,
    ) -> Result<&T, HemeshError> {
        self.half_edges.get(h)?;
        self.half_edge_props.get(handle, h.index())
    }

    /// Mutable access to a half-edge property value.
    ///
    /// # Errors
    /// As the vertex counterpart.
    pub fn half_edge_property_mut<T: PropertyValue>(
        &mut self,
        handle: PropHandle<HalfEdge, T>,
        h: HalfEdgeHandle,
    ) -> Result<&mut T, HemeshError> {
        self.half_edges.get(h)?;
        self.half_edge_props.get_mut(handle, h.index())
    }

    /// Registers a face property column of `T` under `name`.
    pub fn add_face_property<T: PropertyValue>(&mut self, name: &str) -> PropHandle<Face, T> {
        self.face_props.ensure_capacity(self.faces.capacity());
        self.face_props.add_property(name)
    }

    /// Removes a face property column.
    ///
    /// # Errors
    /// `UnknownProperty` if the handle is stale or already removed.
    pub fn remove_face_property<T: PropertyValue>(
        &mut self,
        handle: PropHandle<Face, T>,
    ) -> Result<(), HemeshError> {
        self.face_props.remove_property(handle)
    }

    /// Resolves a face property by name.
    ///
    /// # Errors
    /// `UnknownProperty` if absent, `TypeMismatch` on a different type.
    pub fn find_face_property<T: PropertyValue>(
        &self,
        name: &str,
    ) -> Result<PropHandle<Face, T>, HemeshError> {
        self.face_props.find_property(name)
    }

    /// Reads a face property value.
    ///
    /// # Errors
    /// As the vertex counterpart.
    pub fn face_property<T: PropertyValue>(
        &self,
        handle: PropHandle<Face, T>,
        f: FaceHandle,
    ) -> Result<&T, HemeshError> {
        self.faces.get(f)?;
        self.face_props.get(handle, f.index())
    }

    /// Mutable access to a face property value.
    ///
    /// # Errors
    /// As the vertex counterpart.
    pub fn face_property_mut<T: PropertyValue>(
        &mut self,
        handle: PropHandle<Face, T>,
        f: FaceHandle,
    ) -> Result<&mut T, HemeshError> {
        self.faces.get(f)?;
        self.face_props.get_mut(handle, f.index())
    }

    // --- Internal plumbing ---
    //
    // Connectivity handles stored inside the mesh are kept valid by every
    // mutation; the infallible accessors below encode that invariant.

    #[inline]
    pub(crate) fn he(&self, h: HalfEdgeHandle) -> &HalfEdge {
        self.half_edges
            .lookup(h)
            .expect("stored half-edge handle is live")
    }

    #[inline]
    fn he_mut(&mut self, h: HalfEdgeHandle) -> &mut HalfEdge {
        self.half_edges
            .get_mut(h)
            .expect("stored half-edge handle is live")
    }

    #[inline]
    fn vertex_ref(&self, v: VertexHandle) -> &Vertex {
        self.vertices
            .lookup(v)
            .expect("stored vertex handle is live")
    }

    #[inline]
    fn vertex_mut(&mut self, v: VertexHandle) -> &mut Vertex {
        self.vertices
            .get_mut(v)
            .expect("stored vertex handle is live")
    }

    /// Sets `next(a) = b` and `prev(b) = a` together.
    #[inline]
    fn set_next(&mut self, a: HalfEdgeHandle, b: HalfEdgeHandle) {
        self.he_mut(a).next = b;
        self.he_mut(b).prev = a;
    }

    pub(crate) fn find_half_edge_internal(
        &self,
        u: VertexHandle,
        v: VertexHandle,
    ) -> Option<HalfEdgeHandle> {
        let start = self.vertices.lookup(u)?.half_edge?;
        let mut h = start;
        loop {
            let rec = self.half_edges.lookup(h)?;
            if rec.vertex == v {
                return Some(h);
            }
            h = self.half_edges.lookup(rec.sym)?.next;
            if h == start {
                return None;
            }
        }
    }

    /// Allocates a half-edge pair and its edge between `u` and `v`;
    /// returns the half-edge pointing at `v`. Links are placeholders
    /// until the caller stitches them.
    fn new_edge_pair(&mut self, u: VertexHandle, v: VertexHandle) -> HalfEdgeHandle {
        let e = self.edges.insert(Edge { half_edge: NULL_HE });
        let h0 = self.half_edges.insert(HalfEdge {
            vertex: v,
            edge: e,
            face: None,
            next: NULL_HE,
            prev: NULL_HE,
            sym: NULL_HE,
        });
        let h1 = self.half_edges.insert(HalfEdge {
            vertex: u,
            edge: e,
            face: None,
            next: NULL_HE,
            prev: NULL_HE,
            sym: h0,
        });
        self.he_mut(h0).sym = h1;
        self.edges
            .get_mut(e)
            .expect("edge inserted directly above")
            .half_edge = h0;

        self.edge_props.ensure_capacity(self.edges.capacity());
        self.edge_props.reset_index(e.index());
        self.half_edge_props
            .ensure_capacity(self.half_edges.capacity());
        self.half_edge_props.reset_index(h0.index());
        self.half_edge_props.reset_index(h1.index());
        h0
    }

    /// Soft-deletes an edge whose both sides are boundary, splicing the
    /// two boundary chains it sat on and healing vertex references.
    fn remove_edge_pair(&mut self, e: EdgeHandle) {
        let h0 = self
            .edges
            .lookup(e)
            .expect("stored edge handle is live")
            .half_edge;
        let rec0 = self.he(h0).clone();
        let h1 = rec0.sym;
        let rec1 = self.he(h1).clone();
        debug_assert!(rec0.face.is_none() && rec1.face.is_none());

        let v0 = rec0.vertex;
        let v1 = rec1.vertex;
        let (next0, prev0) = (rec0.next, rec0.prev);
        let (next1, prev1) = (rec1.next, rec1.prev);

        // Splice the chains around the removed pair. When the pair is its
        // own neighborhood (isolated edge), these writes are self-links on
        // doomed slots and harmless.
        self.set_next(prev0, next1);
        self.set_next(prev1, next0);

        // h1 leaves v0 and h0 leaves v1; heal stored outgoing half-edges.
        if self.vertex_ref(v0).half_edge == Some(h1) {
            self.vertex_mut(v0).half_edge = if next0 == h1 { None } else { Some(next0) };
        }
        if self.vertex_ref(v1).half_edge == Some(h0) {
            self.vertex_mut(v1).half_edge = if next1 == h0 { None } else { Some(next1) };
        }

        self.half_edges
            .remove(h0)
            .expect("half-edge pair is live until removed here");
        self.half_edges
            .remove(h1)
            .expect("half-edge pair is live until removed here");
        self.edges
            .remove(e)
            .expect("edge is live until removed here");
    }

    /// Collects a face's half-edge loop by walking `next`.
    fn collect_face_loop(&self, f: FaceHandle) -> Vec<HalfEdgeHandle> {
        let start = self
            .faces
            .lookup(f)
            .expect("face handle validated by caller")
            .half_edge;
        let mut out = Vec::new();
        let mut h = start;
        loop {
            out.push(h);
            h = self.he(h).next;
            if h == start {
                return out;
            }
        }
    }

    /// Re-points `v`'s stored outgoing half-edge at a boundary one, if its
    /// star has any.
    fn adjust_outgoing(&mut self, v: VertexHandle) {
        let Some(start) = self.vertex_ref(v).half_edge else {
            return;
        };
        let mut h = start;
        loop {
            if self.he(h).face.is_none() {
                self.vertex_mut(v).half_edge = Some(h);
                return;
            }
            h = self.he(self.he(h).sym).next;
            if h == start {
                return;
            }
        }
    }
}
