//! Error types for projection derivation.

use thiserror::Error;

use crate::geostationary::ScanAxis;

/// Result type for projection operations.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while deriving projection parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// A scan-angle coordinate sequence had no finite values.
    #[error("{axis} scan coordinate array is empty")]
    EmptyCoordinateArray { axis: ScanAxis },

    /// A projection constant is outside its physical range.
    #[error("invalid projection parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}
