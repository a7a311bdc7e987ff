//! PLY (Stanford polygon format) reader and writer.
//!
//! # Supported format
//! - ASCII PLY 1.0.
//! - A `vertex` element with scalar `x`, `y`, `z` properties in any
//!   declaration order; other scalar vertex properties are parsed past
//!   and dropped.
//! - A `face` element with a `vertex_indices` (or `vertex_index`) list
//!   property holding 0-based vertex references.
//!
//! # Limitations
//! - Binary PLY (little/big endian) is not supported.
//! - Elements other than `vertex` and `face` are skipped with a warning.

use crate::io::error::{MeshIoError, parse_err};
use crate::pool::handle::VertexHandle;
use crate::topology::mesh::HalfEdgeMesh;
use hashbrown::HashMap;
use itertools::Itertools;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
enum Property {
    Scalar(String),
    List(String),
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

/// Parses an ASCII PLY document into a fresh mesh.
///
/// # Errors
/// [`MeshIoError`] on stream failures, malformed headers or data lines,
/// out-of-range indices, or mesh contract violations.
pub fn read_ply<R: Read>(mut reader: R) -> Result<HalfEdgeMesh, MeshIoError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    let mut lines = contents.lines().enumerate();

    let (_, magic) = lines
        .next()
        .ok_or_else(|| parse_err(1, "empty document"))?;
    if magic.trim() != "ply" {
        return Err(parse_err(1, "missing `ply` magic line"));
    }

    // --- Header ---
    let mut elements: Vec<Element> = Vec::new();
    let mut format_seen = false;
    let mut header_end = 0usize;
    for (idx, raw) in &mut lines {
        let lineno = idx + 1;
        let line = raw.trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("comment") | Some("obj_info") | None => {}
            Some("format") => {
                let kind = parts.next().unwrap_or_default();
                if kind != "ascii" {
                    return Err(MeshIoError::Unsupported(format!("PLY format `{kind}`")));
                }
                format_seen = true;
            }
            Some("element") => {
                let name = parts
                    .next()
                    .ok_or_else(|| parse_err(lineno, "element without a name"))?;
                let count = parts
                    .next()
                    .and_then(|token| token.parse::<usize>().ok())
                    .ok_or_else(|| parse_err(lineno, "element without a count"))?;
                elements.push(Element {
                    name: name.to_owned(),
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let element = elements
                    .last_mut()
                    .ok_or_else(|| parse_err(lineno, "property before any element"))?;
                let kind = parts
                    .next()
                    .ok_or_else(|| parse_err(lineno, "property without a type"))?;
                let property = if kind == "list" {
                    // list <count-type> <item-type> <name>
                    let name = parts
                        .nth(2)
                        .ok_or_else(|| parse_err(lineno, "malformed list property"))?;
                    Property::List(name.to_owned())
                } else {
                    let name = parts
                        .next()
                        .ok_or_else(|| parse_err(lineno, "property without a name"))?;
                    Property::Scalar(name.to_owned())
                };
                element.properties.push(property);
            }
            Some("end_header") => {
                header_end = lineno;
                break;
            }
            Some(other) => {
                return Err(parse_err(lineno, format!("unknown header keyword `{other}`")));
            }
        }
    }
    if header_end == 0 {
        return Err(parse_err(1, "missing end_header"));
    }
    if !format_seen {
        return Err(parse_err(1, "missing format declaration"));
    }

    // --- Body ---
    let mut mesh = HalfEdgeMesh::new();
    let mut verts: Vec<VertexHandle> = Vec::new();

    for element in &elements {
        match element.name.as_str() {
            "vertex" => {
                let coord_slots = coordinate_slots(element, header_end)?;
                for _ in 0..element.count {
                    let (idx, raw) = lines
                        .next()
                        .ok_or_else(|| parse_err(header_end, "unexpected end of vertex list"))?;
                    let pos = parse_vertex_line(raw, element, coord_slots, idx + 1)?;
                    verts.push(mesh.add_vertex(pos));
                }
            }
            "face" => {
                for _ in 0..element.count {
                    let (idx, raw) = lines
                        .next()
                        .ok_or_else(|| parse_err(header_end, "unexpected end of face list"))?;
                    let lineno = idx + 1;
                    let handles = parse_face_line(raw, &verts, lineno)?;
                    mesh.add_face(&handles)?;
                }
            }
            other => {
                log::warn!(
                    "skipping unsupported PLY element `{other}` ({} rows)",
                    element.count
                );
                for _ in 0..element.count {
                    lines.next();
                }
            }
        }
    }

    log::debug!(
        "read PLY: {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Reads a PLY file from disk. See [`read_ply`].
///
/// # Errors
/// As [`read_ply`], plus file-open failures.
pub fn read_ply_file<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh, MeshIoError> {
    read_ply(std::fs::File::open(path)?)
}

/// Writes `mesh` as an ASCII PLY document with `x`/`y`/`z` vertex
/// properties and a `vertex_indices` face list.
///
/// # Errors
/// [`MeshIoError::Io`] on stream failures.
pub fn write_ply<W: Write>(mesh: &HalfEdgeMesh, writer: W) -> Result<(), MeshIoError> {
    let mut out = BufWriter::new(writer);
    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {}", mesh.vertex_count())?;
    writeln!(out, "property double x")?;
    writeln!(out, "property double y")?;
    writeln!(out, "property double z")?;
    writeln!(out, "element face {}", mesh.face_count())?;
    writeln!(out, "property list uchar int vertex_indices")?;
    writeln!(out, "end_header")?;

    let mut index: HashMap<VertexHandle, usize> = HashMap::new();
    for (i, v) in mesh.vertices().enumerate() {
        index.insert(v, i);
        let [x, y, z] = mesh.position(v)?;
        writeln!(out, "{x} {y} {z}")?;
    }
    for f in mesh.faces() {
        let refs: Vec<usize> = mesh.face_vertices(f).map(|v| index[&v]).collect();
        writeln!(out, "{} {}", refs.len(), refs.iter().join(" "))?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `mesh` to a PLY file on disk. See [`write_ply`].
///
/// # Errors
/// As [`write_ply`], plus file-create failures.
pub fn write_ply_file<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<(), MeshIoError> {
    write_ply(mesh, std::fs::File::create(path)?)
}

/// Positions of the `x`, `y`, `z` scalar properties within a vertex row.
fn coordinate_slots(element: &Element, header_end: usize) -> Result<[usize; 3], MeshIoError> {
    let mut slots = [usize::MAX; 3];
    for (i, property) in element.properties.iter().enumerate() {
        if let Property::Scalar(name) = property {
            match name.as_str() {
                "x" => slots[0] = i,
                "y" => slots[1] = i,
                "z" => slots[2] = i,
                _ => {}
            }
        }
    }
    if slots.contains(&usize::MAX) {
        return Err(parse_err(
            header_end,
            "vertex element lacks x/y/z properties",
        ));
    }
    Ok(slots)
}

fn parse_vertex_line(
    raw: &str,
    element: &Element,
    coord_slots: [usize; 3],
    lineno: usize,
) -> Result<[f64; 3], MeshIoError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let mut pos = [0.0; 3];
    let mut cursor = 0usize;
    for (i, property) in element.properties.iter().enumerate() {
        match property {
            Property::Scalar(_) => {
                let token = tokens
                    .get(cursor)
                    .ok_or_else(|| parse_err(lineno, "vertex row too short"))?;
                if let Some(axis) = coord_slots.iter().position(|&slot| slot == i) {
                    pos[axis] = token
                        .parse::<f64>()
                        .map_err(|_| parse_err(lineno, format!("invalid coordinate: {token}")))?;
                }
                cursor += 1;
            }
            Property::List(_) => {
                let len = tokens
                    .get(cursor)
                    .and_then(|token| token.parse::<usize>().ok())
                    .ok_or_else(|| parse_err(lineno, "malformed list value"))?;
                cursor += 1 + len;
            }
        }
    }
    Ok(pos)
}

fn parse_face_line(
    raw: &str,
    verts: &[VertexHandle],
    lineno: usize,
) -> Result<Vec<VertexHandle>, MeshIoError> {
    let mut tokens = raw.split_whitespace();
    let count = tokens
        .next()
        .and_then(|token| token.parse::<usize>().ok())
        .ok_or_else(|| parse_err(lineno, "face row without an index count"))?;
    let mut handles = Vec::with_capacity(count);
    for _ in 0..count {
        let token = tokens
            .next()
            .ok_or_else(|| parse_err(lineno, "face row shorter than declared"))?;
        let index = token
            .parse::<usize>()
            .map_err(|_| parse_err(lineno, format!("invalid face index: {token}")))?;
        let handle = verts
            .get(index)
            .copied()
            .ok_or_else(|| {
                parse_err(
                    lineno,
                    format!("face index {index} out of range (have {} vertices)", verts.len()),
                )
            })?;
        handles.push(handle);
    }
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
ply
format ascii 1.0
comment a lone triangle
element vertex 3
property double x
property double y
property double z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 2
";

    #[test]
    fn reads_triangle() {
        let mesh = read_ply(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn extra_vertex_properties_are_dropped() {
        let doc = "\
ply
format ascii 1.0
element vertex 3
property uchar red
property double z
property double x
property double y
element face 1
property list uchar int vertex_indices
end_header
255 0 0 0
255 0 1 0
255 0 0 1
3 0 1 2
";
        let mesh = read_ply(doc.as_bytes()).unwrap();
        // z precedes x/y in the declaration; values land on the right axes.
        let v0 = mesh.vertices().next().unwrap();
        assert_eq!(mesh.position(v0).unwrap(), [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn binary_format_rejected() {
        let doc = "ply\nformat binary_little_endian 1.0\nend_header\n";
        assert!(matches!(
            read_ply(doc.as_bytes()),
            Err(MeshIoError::Unsupported(_))
        ));
    }

    #[test]
    fn missing_coordinates_rejected() {
        let doc = "\
ply
format ascii 1.0
element vertex 1
property double x
property double y
end_header
0 0
";
        assert!(matches!(
            read_ply(doc.as_bytes()),
            Err(MeshIoError::Parse { .. })
        ));
    }

    #[test]
    fn round_trip_preserves_counts() {
        let mesh = read_ply(TRIANGLE.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_ply(&mesh, &mut buffer).unwrap();
        let back = read_ply(buffer.as_slice()).unwrap();
        assert_eq!(back.vertex_count(), 3);
        assert_eq!(back.edge_count(), 3);
        assert_eq!(back.face_count(), 1);
    }
}
