use std::fmt;

/// Errors produced by the numeric core. Shape and index problems are caller
/// bugs and surface immediately; divergence is fatal for the whole training
/// run since the weights may already be corrupted.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Incompatible tensor dimensions (matmul, broadcasting, axis reductions).
    Shape(String),

    /// Out-of-bounds element access.
    Index {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Loss or gradient evaluated to NaN during training. Do not retry.
    Divergence(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Shape(msg) => write!(f, "Shape error: {}", msg),
            Error::Index { row, col, rows, cols } => write!(
                f,
                "Index error: ({}, {}) out of bounds for {}x{} tensor",
                row, col, rows, cols
            ),
            Error::Divergence(msg) => write!(f, "Training diverged: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
