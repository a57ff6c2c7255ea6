//! Error types for chunk configuration.

use thiserror::Error;

/// Result type alias using ChunkError.
pub type ChunkResult<T> = Result<T, ChunkError>;

/// Errors raised while configuring the chunk calendar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk length must be at least one day, got {0}")]
    InvalidChunkDays(i64),

    #[error("spin-up must not be negative, got {0} hours")]
    InvalidSpinup(i64),

    #[error("date range is empty: {start} is not before {end}")]
    EmptyRange { start: String, end: String },
}
