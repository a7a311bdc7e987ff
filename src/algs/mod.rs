//! Algorithms over the mesh core.
//!
//! Everything here manipulates the mesh exclusively through its public
//! surface: `add_vertex`/`add_face`/`delete_face`, the property API, and
//! the traversal iterators.

pub mod denoise;

pub use denoise::{DenoiseParams, perturb_positions, umbrella_smooth};
