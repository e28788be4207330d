//! Output of finished composites.
//!
//! - [`rgba`]: composite samples to 8-bit RGBA, missing pixels transparent
//! - [`png`]: PNG encoding
//! - [`sink`]: [`PngSink`], writing a PNG and a georeference sidecar per composite

pub mod error;
pub mod png;
pub mod rgba;
pub mod sink;

pub use error::{RenderError, RenderResult};
pub use sink::{encode_product, file_stem, GeoreferenceSidecar, PngSink};
