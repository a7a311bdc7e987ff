//! Structural invariants of the half-edge graph across mutations.

use hemesh::prelude::*;

fn triangle_mesh() -> (HalfEdgeMesh, [VertexHandle; 3]) {
    let mut mesh = HalfEdgeMesh::new();
    let vs = [
        mesh.add_vertex([0.0, 0.0, 0.0]),
        mesh.add_vertex([1.0, 0.0, 0.0]),
        mesh.add_vertex([0.0, 1.0, 0.0]),
    ];
    mesh.add_face(&vs).unwrap();
    (mesh, vs)
}

/// Regular tetrahedron surface: four faces, closed, every edge interior.
fn tetrahedron_mesh() -> (HalfEdgeMesh, [VertexHandle; 4]) {
    let mut mesh = HalfEdgeMesh::new();
    let vs = [
        mesh.add_vertex([0.0, 0.0, 0.0]),
        mesh.add_vertex([1.0, 0.0, 0.0]),
        mesh.add_vertex([0.0, 1.0, 0.0]),
        mesh.add_vertex([0.0, 0.0, 1.0]),
    ];
    mesh.add_face(&[vs[0], vs[2], vs[1]]).unwrap();
    mesh.add_face(&[vs[0], vs[1], vs[3]]).unwrap();
    mesh.add_face(&[vs[1], vs[2], vs[3]]).unwrap();
    mesh.add_face(&[vs[2], vs[0], vs[3]]).unwrap();
    (mesh, vs)
}

#[test]
fn sym_is_an_involution() {
    let (mesh, _) = tetrahedron_mesh();
    for h in mesh.half_edges() {
        let sym = mesh.half_edge(h).unwrap().sym;
        assert_ne!(sym, h);
        assert_eq!(mesh.half_edge(sym).unwrap().sym, h);
    }
}

#[test]
fn face_cycle_closes_after_exactly_degree_steps() {
    let (mesh, _) = tetrahedron_mesh();
    for f in mesh.faces() {
        let degree = mesh.face_degree(f).unwrap();
        assert_eq!(degree, 3);
        let start = mesh.face(f).unwrap().half_edge;
        let mut h = start;
        for step in 1..=degree {
            h = mesh.half_edge(h).unwrap().next;
            if step < degree {
                assert_ne!(h, start, "loop closed early at step {step}");
            }
        }
        assert_eq!(h, start);
    }
}

#[test]
fn closed_surface_has_no_boundary() {
    let (mesh, vs) = tetrahedron_mesh();
    assert_eq!(mesh.face_count(), 4);
    assert_eq!(mesh.edge_count(), 6);
    assert_eq!(mesh.half_edge_count(), 12);
    for v in vs {
        assert!(!mesh.is_boundary_vertex(v).unwrap());
        assert_eq!(mesh.vertex_degree(v).unwrap(), 3);
    }
    for e in mesh.edges() {
        assert!(!mesh.is_boundary_edge(e).unwrap());
    }
    validate_topology(&mesh).unwrap();
}

#[test]
fn third_face_on_an_edge_is_rejected() {
    let mut mesh = HalfEdgeMesh::new();
    let u = mesh.add_vertex([0.0, 0.0, 0.0]);
    let v = mesh.add_vertex([1.0, 0.0, 0.0]);
    let a = mesh.add_vertex([0.5, 1.0, 0.0]);
    let b = mesh.add_vertex([0.5, -1.0, 0.0]);
    let c = mesh.add_vertex([0.5, 0.0, 1.0]);

    mesh.add_face(&[u, v, a]).unwrap();
    mesh.add_face(&[v, u, b]).unwrap();

    // Both orientations of the shared edge are claimed now.
    assert!(matches!(
        mesh.add_face(&[u, v, c]),
        Err(HemeshError::NonManifoldEdge { .. })
    ));
    assert!(matches!(
        mesh.add_face(&[v, u, c]),
        Err(HemeshError::NonManifoldEdge { .. })
    ));
    // The failed attempts left nothing behind.
    assert_eq!(mesh.face_count(), 2);
    assert_eq!(mesh.edge_count(), 5);
    validate_topology(&mesh).unwrap();
}

#[test]
fn degenerate_faces_are_rejected() {
    let mut mesh = HalfEdgeMesh::new();
    let a = mesh.add_vertex([0.0, 0.0, 0.0]);
    let b = mesh.add_vertex([1.0, 0.0, 0.0]);
    assert!(matches!(
        mesh.add_face(&[a, b]),
        Err(HemeshError::DegenerateFace { distinct: 2 })
    ));
    assert!(matches!(
        mesh.add_face(&[a, b, a]),
        Err(HemeshError::DegenerateFace { distinct: 2 })
    ));
    assert!(matches!(
        mesh.add_face(&[]),
        Err(HemeshError::DegenerateFace { distinct: 0 })
    ));
}

#[test]
fn lone_triangle_scenario() {
    // Insert (0,0,0),(1,0,0),(0,1,0); add face (0,1,2).
    let (mesh, vs) = triangle_mesh();
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.half_edge_count(), 6); // 3 interior + 3 boundary sym
    assert_eq!(mesh.edge_count(), 3);
    let interior = mesh
        .half_edges()
        .filter(|&h| !mesh.is_boundary_half_edge(h).unwrap())
        .count();
    assert_eq!(interior, 3);
    for v in vs {
        assert!(mesh.is_boundary_vertex(v).unwrap());
    }
    validate_topology(&mesh).unwrap();
}

#[test]
fn deleting_the_lone_triangle_keeps_its_edges() {
    let (mut mesh, _) = triangle_mesh();
    let f = mesh.faces().next().unwrap();
    mesh.delete_face(f).unwrap();

    assert_eq!(mesh.face_count(), 0);
    // The edges survive as boundary-only edges; no second face ever
    // existed on either side.
    assert_eq!(mesh.edge_count(), 3);
    assert_eq!(mesh.half_edge_count(), 6);
    for e in mesh.edges() {
        assert!(mesh.is_boundary_edge(e).unwrap());
    }
    for h in mesh.half_edges() {
        assert!(mesh.is_boundary_half_edge(h).unwrap());
    }
    validate_topology(&mesh).unwrap();
}

#[test]
fn pruning_removes_fully_boundary_edges() {
    let (mut mesh, vs) = triangle_mesh();
    let f = mesh.faces().next().unwrap();
    mesh.delete_face(f).unwrap();

    assert_eq!(mesh.prune_dangling_edges(), 3);
    assert_eq!(mesh.edge_count(), 0);
    assert_eq!(mesh.half_edge_count(), 0);
    // Vertices are never deleted implicitly; they are isolated now.
    assert_eq!(mesh.vertex_count(), 3);
    for v in vs {
        assert_eq!(mesh.vertex_degree(v).unwrap(), 0);
    }
    validate_topology(&mesh).unwrap();
}

#[test]
fn face_can_be_rebuilt_over_deleted_region() {
    let (mut mesh, vs) = triangle_mesh();
    let f = mesh.faces().next().unwrap();
    mesh.delete_face(f).unwrap();

    // The boundary loop left behind is reused: no new edges appear.
    mesh.add_face(&[vs[0], vs[1], vs[2]]).unwrap();
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.edge_count(), 3);
    assert_eq!(mesh.half_edge_count(), 6);
    validate_topology(&mesh).unwrap();
}

#[test]
fn deleting_one_of_two_triangles_keeps_shared_edge_interior_side() {
    let mut mesh = HalfEdgeMesh::new();
    let u = mesh.add_vertex([0.0, 0.0, 0.0]);
    let v = mesh.add_vertex([1.0, 0.0, 0.0]);
    let a = mesh.add_vertex([0.5, 1.0, 0.0]);
    let b = mesh.add_vertex([0.5, -1.0, 0.0]);
    let f0 = mesh.add_face(&[u, v, a]).unwrap();
    let f1 = mesh.add_face(&[v, u, b]).unwrap();

    mesh.delete_face(f0).unwrap();
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.edge_count(), 5);
    // The shared edge still has its second face.
    let shared = mesh.find_half_edge(u, v).unwrap().unwrap();
    let shared_edge = mesh.half_edge(shared).unwrap().edge;
    assert!(mesh.is_boundary_edge(shared_edge).unwrap());
    assert_eq!(mesh.face_degree(f1).unwrap(), 3);
    validate_topology(&mesh).unwrap();

    // Nothing dangles until the second face goes too.
    assert_eq!(mesh.prune_dangling_edges(), 2);
    validate_topology(&mesh).unwrap();
    mesh.delete_face(f1).unwrap();
    assert_eq!(mesh.prune_dangling_edges(), 3);
    assert_eq!(mesh.edge_count(), 0);
    validate_topology(&mesh).unwrap();
}

#[test]
fn closing_a_fan_relinks_existing_boundary() {
    let mut mesh = HalfEdgeMesh::new();
    let center = mesh.add_vertex([0.0, 0.0, 0.0]);
    let ring: Vec<_> = (0..5)
        .map(|i| {
            let angle = f64::from(i) * std::f64::consts::TAU / 5.0;
            mesh.add_vertex([angle.cos(), angle.sin(), 0.0])
        })
        .collect();

    // Leave the last wedge open, then close it: two edges of the closing
    // face already exist and the center vertex becomes interior.
    for i in 0..4 {
        mesh.add_face(&[center, ring[i], ring[i + 1]]).unwrap();
        validate_topology(&mesh).unwrap();
    }
    mesh.add_face(&[center, ring[4], ring[0]]).unwrap();
    validate_topology(&mesh).unwrap();

    assert!(!mesh.is_boundary_vertex(center).unwrap());
    assert_eq!(mesh.vertex_degree(center).unwrap(), 5);
    assert_eq!(mesh.face_count(), 5);
    assert_eq!(mesh.incident_faces(center).count(), 5);
}

#[test]
fn stale_handles_are_detected_after_slot_reuse() {
    let (mut mesh, _) = triangle_mesh();
    let f = mesh.faces().next().unwrap();
    let stale_edge = mesh.edges().next().unwrap();
    mesh.delete_face(f).unwrap();
    mesh.prune_dangling_edges();

    // Recycle the edge slots with a fresh face.
    let a = mesh.add_vertex([2.0, 0.0, 0.0]);
    let b = mesh.add_vertex([3.0, 0.0, 0.0]);
    let c = mesh.add_vertex([2.0, 1.0, 0.0]);
    mesh.add_face(&[a, b, c]).unwrap();
    assert_eq!(mesh.edge_count(), 3);

    // The recycled slot answers to its new handle, not the stale one.
    assert!(matches!(
        mesh.edge(stale_edge),
        Err(HemeshError::InvalidHandle { .. })
    ));
}

#[test]
fn vertex_star_terminates_and_covers_incidences() {
    let (mesh, vs) = tetrahedron_mesh();
    for v in vs {
        let star: Vec<_> = mesh.outgoing_half_edges(v).collect();
        assert_eq!(star.len(), 3);
        assert_eq!(mesh.one_ring(v).count(), 3);
        assert_eq!(mesh.incident_faces(v).count(), 3);
        assert_eq!(mesh.incident_edges(v).count(), 3);
        for h in star {
            assert_eq!(mesh.from_vertex(h).unwrap(), v);
        }
    }
}
