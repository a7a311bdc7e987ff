//! `.m` mesh format reader and writer.
//!
//! # Supported format
//! - `Vertex <id> <x> <y> <z>` and `Face <id> <v...>` records, one per
//!   line, with arbitrary positive integer ids.
//! - A trailing `{...}` annotation block on any record is parsed past and
//!   dropped.
//! - `#` comment lines.
//!
//! # Limitations
//! - `Edge` and `Corner` records, and the traits inside `{...}` blocks,
//!   are not interpreted.

use crate::io::error::{MeshIoError, parse_err};
use crate::pool::handle::VertexHandle;
use crate::topology::mesh::HalfEdgeMesh;
use hashbrown::HashMap;
use itertools::Itertools;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Parses a `.m` document into a fresh mesh.
///
/// Vertex records may appear in any id order; faces reference vertices by
/// their declared ids.
///
/// # Errors
/// [`MeshIoError`] on stream failures, malformed records, references to
/// undeclared ids, or mesh contract violations.
pub fn read_m<R: Read>(mut reader: R) -> Result<HalfEdgeMesh, MeshIoError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;

    let mut mesh = HalfEdgeMesh::new();
    let mut by_id: HashMap<u64, VertexHandle> = HashMap::new();

    for (idx, raw) in contents.lines().enumerate() {
        let lineno = idx + 1;
        // Annotations carry per-element traits this reader ignores.
        let line = match raw.find('{') {
            Some(brace) => raw[..brace].trim(),
            None => raw.trim(),
        };
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("Vertex") => {
                let id = parse_id(parts.next(), lineno)?;
                let mut pos = [0.0; 3];
                for coord in &mut pos {
                    let token = parts
                        .next()
                        .ok_or_else(|| parse_err(lineno, "Vertex with fewer than 3 coordinates"))?;
                    *coord = token
                        .parse::<f64>()
                        .map_err(|_| parse_err(lineno, format!("invalid coordinate: {token}")))?;
                }
                if by_id.contains_key(&id) {
                    return Err(parse_err(lineno, format!("duplicate vertex id {id}")));
                }
                by_id.insert(id, mesh.add_vertex(pos));
            }
            Some("Face") => {
                let _id = parse_id(parts.next(), lineno)?;
                let mut handles = Vec::new();
                for token in parts {
                    let vid = token
                        .parse::<u64>()
                        .map_err(|_| parse_err(lineno, format!("invalid vertex id: {token}")))?;
                    let handle = by_id
                        .get(&vid)
                        .copied()
                        .ok_or_else(|| parse_err(lineno, format!("undeclared vertex id {vid}")))?;
                    handles.push(handle);
                }
                if handles.len() < 3 {
                    return Err(parse_err(lineno, "Face with fewer than 3 vertices"));
                }
                mesh.add_face(&handles)?;
            }
            Some(other) => {
                log::warn!("skipping unsupported .m record `{other}` at line {lineno}");
            }
            None => {}
        }
    }

    log::debug!(
        "read .m: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Reads a `.m` file from disk. See [`read_m`].
///
/// # Errors
/// As [`read_m`], plus file-open failures.
pub fn read_m_file<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh, MeshIoError> {
    read_m(std::fs::File::open(path)?)
}

/// Writes `mesh` as a `.m` document with sequential 1-based ids.
///
/// # Errors
/// [`MeshIoError::Io`] on stream failures.
pub fn write_m<W: Write>(mesh: &HalfEdgeMesh, writer: W) -> Result<(), MeshIoError> {
    let mut out = BufWriter::new(writer);
    let mut index: HashMap<VertexHandle, u64> = HashMap::new();
    for (i, v) in mesh.vertices().enumerate() {
        let id = i as u64 + 1;
        index.insert(v, id);
        let [x, y, z] = mesh.position(v)?;
        writeln!(out, "Vertex {id} {x} {y} {z}")?;
    }
    for (i, f) in mesh.faces().enumerate() {
        let refs = mesh.face_vertices(f).map(|v| index[&v]).join(" ");
        writeln!(out, "Face {} {refs}", i + 1)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `mesh` to a `.m` file on disk. See [`write_m`].
///
/// # Errors
/// As [`write_m`], plus file-create failures.
pub fn write_m_file<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<(), MeshIoError> {
    write_m(mesh, std::fs::File::create(path)?)
}

fn parse_id(token: Option<&str>, lineno: usize) -> Result<u64, MeshIoError> {
    let token = token.ok_or_else(|| parse_err(lineno, "record without an id"))?;
    token
        .parse::<u64>()
        .map_err(|_| parse_err(lineno, format!("invalid id: {token}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
# a lone triangle
Vertex 1 0 0 0
Vertex 2 1 0 0
Vertex 3 0 1 0
Face 1 1 2 3
";

    #[test]
    fn reads_triangle() {
        let mesh = read_m(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn annotations_are_dropped() {
        let doc = "\
Vertex 10 0 0 0 {rgb=(1 0 0)}
Vertex 20 1 0 0
Vertex 30 0 1 0
Face 7 10 20 30 {source=(scan)}
";
        let mesh = read_m(doc.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn undeclared_vertex_id_rejected() {
        let doc = "Vertex 1 0 0 0\nVertex 2 1 0 0\nFace 1 1 2 3\n";
        assert!(matches!(
            read_m(doc.as_bytes()),
            Err(MeshIoError::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn duplicate_vertex_id_rejected() {
        let doc = "Vertex 1 0 0 0\nVertex 1 1 0 0\n";
        assert!(matches!(
            read_m(doc.as_bytes()),
            Err(MeshIoError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn round_trip_preserves_counts() {
        let mesh = read_m(TRIANGLE.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_m(&mesh, &mut buffer).unwrap();
        let back = read_m(buffer.as_slice()).unwrap();
        assert_eq!(back.vertex_count(), 3);
        assert_eq!(back.face_count(), 1);
        assert_eq!(back.edge_count(), 3);
    }
}
