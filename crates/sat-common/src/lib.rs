//! Common types shared across the compositing workspace.
//!
//! The data model here is deliberately small: a band is an immutable
//! row-major grid of `f64` samples tagged with its ABI band number, and
//! [`BandLookup`] is the only way the compositor reaches band data.

pub mod band;
pub mod error;
pub mod time;

pub use band::{BandArray, BandIndex, BandLookup, BandSet, GridShape};
pub use error::{BandError, BandResult};
pub use time::{ObservationWindow, TimeParseError};
