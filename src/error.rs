//! Errors raised by the terrain generators.

use thiserror::Error;

/// Errors that can occur while building a height field or mesh.
///
/// All of these are caller mistakes detected before any noise is evaluated,
/// so a failed call never yields partial output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Grid {width}x{height} has more vertices than a u32 index buffer can address")]
    IndexOverflow { width: u32, height: u32 },
}

impl TerrainError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TerrainError::InvalidArgument(msg.into())
    }
}
