//! Batch production of composites from one band source.
//!
//! The projection is derived once per source and shared by every
//! composite. Each recipe is then fetched, composed and handed to a
//! [`CompositeSink`] independently: one failing composite does not stop
//! its siblings.

pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::{resolve_recipes, ConfigError, PipelineConfig, RecipeEntry};
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{
    BatchReport, CompositeOutcome, CompositeProduct, CompositeSink, CompositeSummary, Pipeline,
};
