//! Error types for band construction.

use thiserror::Error;

/// Result type alias using BandError.
pub type BandResult<T> = Result<T, BandError>;

/// Errors raised while building band arrays.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BandError {
    #[error("band {band}: expected {expected} samples for a {rows}x{cols} grid, got {actual}")]
    DataLength {
        band: u8,
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },

    #[error("band {0}: grid must have at least one row and one column")]
    EmptyGrid(u8),
}
