//! Geostationary fixed-grid projection for GOES-R ABI imagery.
//!
//! Derives the projection description and the projection-plane extent of an
//! image from the four scalar constants stored in every ABI file plus the
//! scan-angle coordinate axes.

pub mod error;
pub mod geostationary;

pub use error::{ProjectionError, ProjectionResult};
pub use geostationary::{
    derive_projection, scan_axis, ImageExtent, ProjectionDescriptor, ProjectionScalars, ScanAxis,
    SweepAxis,
};
