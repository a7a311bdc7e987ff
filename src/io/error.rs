//! Error type for the mesh I/O subsystem.

use crate::mesh_error::HemeshError;
use thiserror::Error;

/// Errors produced by the file readers and writers.
#[derive(Debug, Error)]
pub enum MeshIoError {
    /// Underlying stream failure.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed input at a specific line (1-based).
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number in the input.
        line: usize,
        /// What was wrong with it.
        message: String,
    },
    /// A declared format feature this reader does not handle.
    #[error("unsupported format feature: {0}")]
    Unsupported(String),
    /// The parsed data violated a mesh contract (degenerate face,
    /// non-manifold connectivity, dangling index).
    #[error(transparent)]
    Mesh(#[from] HemeshError),
}

pub(crate) fn parse_err(line: usize, message: impl Into<String>) -> MeshIoError {
    MeshIoError::Parse {
        line,
        message: message.into(),
    }
}
