//! Map file error taxonomy
//!
//! Structural problems reject the whole file; nothing is partially loaded.
//! Recoverable oddities (dangling edges, disagreeing mirrors, unknown
//! transition types) are logged by the codec and repaired instead.

use gridloom_domain::DomainError;
use thiserror::Error;

/// Fatal problems with a map file
#[derive(Error, Debug)]
pub enum MapFileError {
    #[error("Invalid map JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Node at ({column}, {row}) is outside the {width}x{height} grid")]
    NodeOutOfBounds {
        column: i32,
        row: i32,
        width: u32,
        height: u32,
    },

    #[error("Duplicate node at ({column}, {row})")]
    DuplicateNode { column: i32, row: i32 },

    #[error("Default start ({x}, {y}) is outside the grid")]
    StartOutOfBounds { x: i32, y: i32 },

    #[error(transparent)]
    Domain(#[from] DomainError),
}
