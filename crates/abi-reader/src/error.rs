//! Error types for band sources.

use sat_common::{BandError, BandIndex, TimeParseError};
use thiserror::Error;

/// Result type for band source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Error types for band sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Requested band is not part of the source
    #[error("band {0} is not available in this source")]
    MissingBand(BandIndex),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Band(#[from] BandError),

    #[error(transparent)]
    Time(#[from] TimeParseError),
}
