//! Error types for the maze training crate

use thiserror::Error;

/// Main error type for the maze training crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("grid size mismatch: agent expects {expected}, grid is {actual}")]
    GridSizeMismatch { expected: usize, actual: usize },

    #[error("position ({x}, {y}) is out of bounds for grid size {size}")]
    OutOfBounds { x: usize, y: usize, size: usize },

    #[error("maze rows must be non-empty and square: {message}")]
    InvalidMazeShape { message: String },

    #[error("invalid character '{character}' at ({x}, {y}) in maze description")]
    InvalidCellCharacter { character: char, x: usize, y: usize },

    #[error("maze of size {size} has no path from start to goal after repair")]
    Disconnected { size: usize },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
