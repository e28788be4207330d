//! Error types for composite output.

use std::path::PathBuf;

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image of {width}x{height} needs {expected} bytes, got {actual}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Encode(#[source] std::io::Error),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("recipes '{recipe}' and '{other}' would both write '{stem}.png'")]
    NameCollision {
        recipe: String,
        other: String,
        stem: String,
    },

    #[error("failed to serialize sidecar: {0}")]
    Json(#[from] serde_json::Error),
}
