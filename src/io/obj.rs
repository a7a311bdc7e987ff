//! Wavefront OBJ reader and writer.
//!
//! # Supported format
//! - ASCII `v x y z` vertex lines (extra components ignored).
//! - `f` lines with 1-based indices, `i`, `i/t`, `i/t/n`, and `i//n`
//!   references, and OBJ-style negative (relative) indices.
//!
//! # Limitations
//! - Normals, texture coordinates, materials, groups, and object names
//!   are skipped on read and never written.
//! - Faces are emitted with plain vertex references only.

use crate::io::error::{MeshIoError, parse_err};
use crate::pool::handle::VertexHandle;
use crate::topology::mesh::HalfEdgeMesh;
use hashbrown::HashMap;
use itertools::Itertools;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Parses an OBJ document into a fresh mesh.
///
/// Vertices are inserted in file order, so OBJ's implicit 1-based vertex
/// numbering maps onto insertion order.
///
/// # Errors
/// [`MeshIoError`] on stream failures, malformed lines, out-of-range
/// indices, or mesh contract violations (degenerate/non-manifold faces).
pub fn read_obj<R: Read>(mut reader: R) -> Result<HalfEdgeMesh, MeshIoError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;

    let mut mesh = HalfEdgeMesh::new();
    let mut verts: Vec<VertexHandle> = Vec::new();

    for (idx, raw) in contents.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let pos = parse_position(parts, lineno)?;
                verts.push(mesh.add_vertex(pos));
            }
            Some("f") => {
                let mut face = Vec::new();
                for token in parts {
                    face.push(resolve_index(token, verts.len(), lineno)?);
                }
                if face.len() < 3 {
                    return Err(parse_err(lineno, "face with fewer than 3 vertices"));
                }
                let handles: Vec<VertexHandle> = face.iter().map(|&i| verts[i]).collect();
                mesh.add_face(&handles)?;
            }
            // Everything else (vn, vt, o, g, s, usemtl, mtllib, ...) is
            // outside this reader's scope.
            Some(_) => {}
            None => {}
        }
    }

    log::debug!(
        "read OBJ: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Reads an OBJ file from disk. See [`read_obj`].
///
/// # Errors
/// As [`read_obj`], plus file-open failures.
pub fn read_obj_file<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh, MeshIoError> {
    read_obj(std::fs::File::open(path)?)
}

/// Writes `mesh` as an OBJ document.
///
/// Vertices are emitted in mesh iteration order; faces reference them by
/// the resulting 1-based positions.
///
/// # Errors
/// [`MeshIoError::Io`] on stream failures.
pub fn write_obj<W: Write>(mesh: &HalfEdgeMesh, writer: W) -> Result<(), MeshIoError> {
    let mut out = BufWriter::new(writer);
    let mut index: HashMap<VertexHandle, usize> = HashMap::new();
    for (i, v) in mesh.vertices().enumerate() {
        index.insert(v, i + 1);
        let [x, y, z] = mesh.position(v)?;
        writeln!(out, "v {x} {y} {z}")?;
    }
    for f in mesh.faces() {
        let refs = mesh.face_vertices(f).map(|v| index[&v]).join(" ");
        writeln!(out, "f {refs}")?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `mesh` to an OBJ file on disk. See [`write_obj`].
///
/// # Errors
/// As [`write_obj`], plus file-create failures.
pub fn write_obj_file<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<(), MeshIoError> {
    write_obj(mesh, std::fs::File::create(path)?)
}

fn parse_position<'a>(
    mut parts: impl Iterator<Item = &'a str>,
    lineno: usize,
) -> Result<[f64; 3], MeshIoError> {
    let mut pos = [0.0; 3];
    for coord in &mut pos {
        let token = parts
            .next()
            .ok_or_else(|| parse_err(lineno, "vertex with fewer than 3 coordinates"))?;
        *coord = token
            .parse::<f64>()
            .map_err(|_| parse_err(lineno, format!("invalid coordinate: {token}")))?;
    }
    Ok(pos)
}

/// Resolves an OBJ face token (`i`, `i/t`, `i/t/n`, `i//n`, possibly
/// negative) into a 0-based vertex index.
fn resolve_index(token: &str, vertex_count: usize, lineno: usize) -> Result<usize, MeshIoError> {
    let vertex_part = token
        .split('/')
        .next()
        .filter(|part| !part.is_empty())
        .ok_or_else(|| parse_err(lineno, format!("invalid face reference: {token}")))?;
    let raw = vertex_part
        .parse::<i64>()
        .map_err(|_| parse_err(lineno, format!("invalid face index: {token}")))?;
    let resolved = if raw < 0 {
        vertex_count as i64 + raw
    } else {
        raw - 1
    };
    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(parse_err(
            lineno,
            format!("face index {raw} out of range (have {vertex_count} vertices)"),
        ));
    }
    Ok(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
# a lone triangle
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";

    #[test]
    fn reads_triangle() {
        let mesh = read_obj(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 3);
    }

    #[test]
    fn slash_and_negative_references() {
        let doc = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1 2//2 -1\n";
        let mesh = read_obj(doc.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn out_of_range_index_rejected() {
        let doc = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n";
        assert!(matches!(
            read_obj(doc.as_bytes()),
            Err(MeshIoError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn short_face_rejected() {
        let doc = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(
            read_obj(doc.as_bytes()),
            Err(MeshIoError::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn round_trip_preserves_counts_and_positions() {
        let mesh = read_obj(TRIANGLE.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_obj(&mesh, &mut buffer).unwrap();
        let back = read_obj(buffer.as_slice()).unwrap();
        assert_eq!(back.vertex_count(), mesh.vertex_count());
        assert_eq!(back.face_count(), mesh.face_count());
        let a: Vec<_> = mesh
            .vertices()
            .map(|v| mesh.position(v).unwrap())
            .collect();
        let b: Vec<_> = back
            .vertices()
            .map(|v| back.position(v).unwrap())
            .collect();
        assert_eq!(a, b);
    }
}
