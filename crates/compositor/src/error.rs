//! Error types for composite evaluation.

use sat_common::{BandIndex, GridShape};
use thiserror::Error;

use crate::recipe::Channel;

/// Result type alias using CompositeError.
pub type CompositeResult<T> = Result<T, CompositeError>;

/// Validation failures for one composite.
///
/// All of these are deterministic: retrying with the same inputs fails the
/// same way.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompositeError {
    #[error("band {band} is not available")]
    MissingBand { band: BandIndex },

    #[error(
        "shape mismatch: band {first} has shape {first_shape} but band {second} has shape {second_shape}"
    )]
    ShapeMismatch {
        first: BandIndex,
        first_shape: GridShape,
        second: BandIndex,
        second_shape: GridShape,
    },

    #[error("{channel} layer has a degenerate clip range [{lower}, {upper}]")]
    DegenerateRange {
        channel: Channel,
        lower: f64,
        upper: f64,
    },

    #[error("{channel} layer has invalid gamma {gamma}: {reason}")]
    InvalidGammaConfiguration {
        channel: Channel,
        gamma: f64,
        reason: &'static str,
    },

    #[error("{channel} layer has an empty source expression")]
    EmptyExpression { channel: Channel },
}
