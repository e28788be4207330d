//! The band source contract.

use projection::ProjectionScalars;
use sat_common::{BandArray, BandIndex, BandSet, ObservationWindow};

use crate::error::SourceResult;

/// Scan-angle axes of a scene, in radians.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanCoordinates {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ScanCoordinates {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }
}

/// Descriptive attributes of a scene. Not used by compositing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMetadata {
    /// Platform identifier, e.g. "G16"
    pub platform_id: Option<String>,
    pub title: Option<String>,
    pub window: Option<ObservationWindow>,
}

/// Provider of the bands, projection constants and scan axes of one scene.
///
/// Sources are shared by reference across worker threads.
pub trait BandSource: Sync {
    /// Calibrated values of one band; `SourceError::MissingBand` if absent.
    fn band(&self, index: BandIndex) -> SourceResult<BandArray>;

    fn projection_scalars(&self) -> SourceResult<ProjectionScalars>;

    fn scan_coordinates(&self) -> SourceResult<ScanCoordinates>;

    fn metadata(&self) -> SourceMetadata {
        SourceMetadata::default()
    }

    /// Band indices this source can provide, ascending.
    fn available_bands(&self) -> Vec<BandIndex>;

    /// Fetch several bands at once, failing on the first missing one.
    fn bands(&self, indices: &[BandIndex]) -> SourceResult<BandSet> {
        indices.iter().map(|&index| self.band(index)).collect()
    }
}
