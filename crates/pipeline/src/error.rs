//! Error types for batch composite production.

use abi_reader::SourceError;
use compositor::CompositeError;
use projection::ProjectionError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias using PipelineError.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Projection could not be derived; fatal for the whole batch
    #[error("projection derivation failed: {0}")]
    Projection(#[from] ProjectionError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("composite error: {0}")]
    Composite(#[from] CompositeError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The sink failed to store a finished composite
    #[error("sink failed for '{recipe}': {source}")]
    Sink {
        recipe: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
