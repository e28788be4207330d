//! False-color composites from multi-band ABI imagery.
//!
//! A [`CompositeRecipe`] declares, for each of the red, green and blue
//! layers, which bands to combine and how to scale the result. [`compose`]
//! interprets any recipe uniformly:
//!
//! 1. weighted sum of the referenced bands
//! 2. clip to `[lower, upper]` and rescale to `[0, 1]`
//! 3. gamma correction (`v^(1/gamma)`)
//! 4. optional inversion (`1 - v`)
//!
//! The three layers are then stacked into a `rows × cols × 3` image.

pub mod engine;
pub mod error;
pub mod image;
pub mod presets;
pub mod recipe;

pub use engine::{apply_gamma, compose, evaluate_expression, evaluate_layer, invert, normalize};
pub use error::{CompositeError, CompositeResult};
pub use image::CompositeImage;
pub use presets::{preset, preset_names};
pub use recipe::{BandTerm, Channel, ClipBounds, CompositeRecipe, LayerRecipe, SourceExpression};
