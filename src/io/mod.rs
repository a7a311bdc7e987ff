//! Mesh I/O: thin format translators around the core's boundary API.
//!
//! Readers populate a [`HalfEdgeMesh`](crate::topology::HalfEdgeMesh)
//! exclusively through `add_vertex`/`add_face`, keeping their own
//! file-id → handle table; writers walk the mesh-wide iterators and remap
//! handles to the target format's indexing convention. The core never
//! parses a file format itself.

pub mod error;
pub mod m;
pub mod obj;
pub mod ply;

pub use error::MeshIoError;
pub use m::{read_m, read_m_file, write_m, write_m_file};
pub use obj::{read_obj, read_obj_file, write_obj, write_obj_file};
pub use ply::{read_ply, read_ply_file, write_ply, write_ply_file};
