//! Error type shared by every terrain operator.

use thiserror::Error;

/// Errors raised by synthesizers, eroders and the classifier.
///
/// Operators validate before touching the grid, so an `Err` always means the
/// grid is unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Sample ({x}, {y}) is outside the {width}x{height} source")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("No layer rule matched cell ({x}, {y}); weights cannot be normalized")]
    DegenerateNormalization { x: usize, y: usize },

    #[error("Height rows are {got_width}x{got_height}, grid is {width}x{height}")]
    ShapeMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
}

impl TerrainError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used across the crate.
pub type TerrainResult<T> = Result<T, TerrainError>;
