//! Writes composites to a directory as PNG plus JSON georeference sidecar.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use pipeline::{CompositeProduct, CompositeSink};
use projection::{ImageExtent, ProjectionDescriptor};
use sat_common::ObservationWindow;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RenderError, RenderResult};
use crate::png::create_png_with_text;
use crate::rgba::composite_to_rgba;

/// Contents of `<recipe>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoreferenceSidecar {
    pub recipe: String,
    pub description: String,
    pub width: usize,
    pub height: usize,
    pub projection: ProjectionDescriptor,
    pub proj_string: String,
    /// Projection-plane meters
    pub extent: ImageExtent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<ObservationWindow>,
}

impl GeoreferenceSidecar {
    pub fn from_product(product: &CompositeProduct) -> Self {
        Self {
            recipe: product.recipe_name.clone(),
            description: product.description.clone(),
            width: product.image.cols(),
            height: product.image.rows(),
            projection: product.projection.clone(),
            proj_string: product.projection.proj_string(),
            extent: product.extent,
            platform_id: product.metadata.platform_id.clone(),
            observation: product.metadata.window,
        }
    }
}

/// Writes `<recipe>.png` and `<recipe>.json` into one directory.
///
/// Each file stem belongs to the first recipe written under it; a different
/// recipe whose name sanitizes to the same stem is refused.
#[derive(Debug, Clone)]
pub struct PngSink {
    output_dir: PathBuf,
    /// file stem -> recipe name
    claimed: Arc<Mutex<HashMap<String, String>>>,
}

impl PngSink {
    /// Create the sink, creating `output_dir` if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> RenderResult<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| RenderError::Io {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self {
            output_dir,
            claimed: Arc::default(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn png_path(&self, recipe: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", file_stem(recipe)))
    }

    pub fn sidecar_path(&self, recipe: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", file_stem(recipe)))
    }

    fn claim_stem(&self, recipe: &str) -> RenderResult<()> {
        let stem = file_stem(recipe);
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        let owner = claimed
            .entry(stem.clone())
            .or_insert_with(|| recipe.to_string());
        if owner.as_str() != recipe {
            return Err(RenderError::NameCollision {
                recipe: recipe.to_string(),
                other: owner.clone(),
                stem,
            });
        }
        Ok(())
    }
}

/// Encode a product as PNG with its name and formula in `tEXt` chunks.
pub fn encode_product(product: &CompositeProduct) -> RenderResult<Vec<u8>> {
    let rgba = composite_to_rgba(&product.image);
    create_png_with_text(
        &rgba,
        product.image.cols(),
        product.image.rows(),
        &[
            ("Title", product.recipe_name.as_str()),
            ("Description", product.description.as_str()),
        ],
    )
}

impl CompositeSink for PngSink {
    type Error = RenderError;

    fn accept(&self, product: &CompositeProduct) -> Result<(), RenderError> {
        self.claim_stem(&product.recipe_name)?;
        let png = encode_product(product)?;
        let png_path = self.png_path(&product.recipe_name);
        write_file(&png_path, &png)?;

        let sidecar = serde_json::to_vec_pretty(&GeoreferenceSidecar::from_product(product))?;
        write_file(&self.sidecar_path(&product.recipe_name), &sidecar)?;

        info!(
            recipe = %product.recipe_name,
            path = %png_path.display(),
            bytes = png.len(),
            "Wrote composite"
        );
        Ok(())
    }
}

fn write_file(path: &Path, contents: &[u8]) -> RenderResult<()> {
    fs::write(path, contents).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Recipe name made safe for use as a file name.
pub fn file_stem(recipe: &str) -> String {
    let stem: String = recipe
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "composite".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("true_color"), "true_color");
        assert_eq!(file_stem("../etc/passwd"), "___etc_passwd");
        assert_eq!(file_stem("day cloud phase"), "day_cloud_phase");
        assert_eq!(file_stem(""), "composite");
    }

    #[test]
    fn test_stem_claims() {
        let dir = tempfile::tempdir().unwrap();
        let sink = PngSink::new(dir.path()).unwrap();
        sink.claim_stem("dust rgb").unwrap();
        sink.claim_stem("dust rgb").unwrap();

        let err = sink.claim_stem("dust_rgb").unwrap_err();
        match err {
            RenderError::NameCollision { recipe, other, stem } => {
                assert_eq!(recipe, "dust_rgb");
                assert_eq!(other, "dust rgb");
                assert_eq!(stem, "dust_rgb");
            }
            other => panic!("unexpected error {:?}", other),
        }

        // Clones share claims
        assert!(sink.clone().claim_stem("dust/rgb").is_err());
    }
}
