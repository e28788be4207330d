//! Band sources for GOES-R ABI Cloud and Moisture Imagery.
//!
//! A [`BandSource`] hands out calibrated band arrays together with the
//! projection constants and scan-angle axes of the scene they belong to.
//!
//! # Sources
//!
//! - [`MemorySource`]: bands already in memory
//! - [`synthetic_scene`]: deterministic 16-band scene on the GOES-16 CONUS grid
//! - [`native::open_mcmip`] (feature `netcdf`): ABI L2 MCMIP/CMIP NetCDF-4 files
//!
//! # GOES-R ABI Data Structure
//!
//! ABI L2 files store scan angles in radians as packed 16-bit integers on
//! the `x`/`y` axes. The imagery variables (`CMI` or `CMI_C01`..`CMI_C16`)
//! hold reflectance factors (bands 1-6) or brightness temperatures in
//! Kelvin (bands 7-16).

pub mod error;
pub mod filename;
pub mod memory;
#[cfg(feature = "netcdf")]
pub mod native;
pub mod source;
pub mod synthetic;

pub use error::{SourceError, SourceResult};
pub use filename::{AbiFileName, Scene};
pub use memory::MemorySource;
pub use source::{BandSource, ScanCoordinates, SourceMetadata};
pub use synthetic::synthetic_scene;
