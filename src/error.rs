//! Error types for mesh loading and SDF construction.

use thiserror::Error;

/// Errors raised while loading an OBJ mesh.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("could not read obj file: {0}")]
    Io(#[from] std::io::Error),

    /// A face referenced a vertex index outside the range of vertices seen so far.
    #[error("face on line {line} references out-of-range vertex index {index}")]
    IndexOutOfRange {
        /// 1-indexed source line of the offending face.
        line: usize,
        /// The offending (1-indexed) vertex index as written in the file.
        index: i64,
    },
}

/// Errors raised while building or querying a signed distance field.
#[derive(Debug, Error)]
pub enum SdfError {
    /// An SDF cannot be built from a mesh with no triangles; its bounds are undefined.
    #[error("cannot build an SDF from an empty mesh")]
    EmptyMesh,

    /// Grid resolution must be at least 2 so that `cellSize` is well defined.
    #[error("SDF resolution must be >= 2, got {0}")]
    ResolutionTooSmall(usize),
}
