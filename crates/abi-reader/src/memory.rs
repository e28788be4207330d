//! In-memory band source.

use projection::ProjectionScalars;
use sat_common::{BandArray, BandIndex, BandLookup, BandSet};

use crate::error::{SourceError, SourceResult};
use crate::source::{BandSource, ScanCoordinates, SourceMetadata};

/// Band source over arrays that are already loaded.
///
/// ```
/// use abi_reader::{BandSource, MemorySource};
/// use projection::ProjectionScalars;
/// use sat_common::BandArray;
///
/// let source = MemorySource::new(ProjectionScalars::goes16(), vec![-0.1, 0.1], vec![0.1])
///     .with_band(BandArray::filled(13, 1, 2, 280.0).unwrap());
/// assert_eq!(source.available_bands(), vec![13]);
/// assert!(source.band(2).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MemorySource {
    bands: BandSet,
    scalars: ProjectionScalars,
    coordinates: ScanCoordinates,
    metadata: SourceMetadata,
}

impl MemorySource {
    pub fn new(scalars: ProjectionScalars, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            bands: BandSet::new(),
            scalars,
            coordinates: ScanCoordinates::new(x, y),
            metadata: SourceMetadata::default(),
        }
    }

    pub fn with_band(mut self, band: BandArray) -> Self {
        self.insert_band(band);
        self
    }

    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add or replace a band.
    pub fn insert_band(&mut self, band: BandArray) -> Option<BandArray> {
        self.bands.insert(band)
    }

    /// Borrowed view of the loaded bands.
    pub fn band_set(&self) -> &BandSet {
        &self.bands
    }
}

impl BandSource for MemorySource {
    fn band(&self, index: BandIndex) -> SourceResult<BandArray> {
        self.bands
            .band(index)
            .cloned()
            .ok_or(SourceError::MissingBand(index))
    }

    fn projection_scalars(&self) -> SourceResult<ProjectionScalars> {
        Ok(self.scalars)
    }

    fn scan_coordinates(&self) -> SourceResult<ScanCoordinates> {
        Ok(self.coordinates.clone())
    }

    fn metadata(&self) -> SourceMetadata {
        self.metadata.clone()
    }

    fn available_bands(&self) -> Vec<BandIndex> {
        self.bands.indices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_lookup() {
        let mut source = MemorySource::new(ProjectionScalars::goes18(), vec![0.0], vec![0.0]);
        assert!(source.insert_band(BandArray::filled(2, 1, 1, 0.3).unwrap()).is_none());
        assert!(source.insert_band(BandArray::filled(2, 1, 1, 0.4).unwrap()).is_some());

        assert_eq!(source.band(2).unwrap().values(), &[0.4]);
        assert!(matches!(source.band(3), Err(SourceError::MissingBand(3))));
    }

    #[test]
    fn test_bands_fails_on_first_missing() {
        let source = MemorySource::new(ProjectionScalars::goes16(), vec![0.0], vec![0.0])
            .with_band(BandArray::filled(13, 1, 1, 280.0).unwrap());

        assert_eq!(source.bands(&[13]).unwrap().len(), 1);
        assert!(matches!(
            source.bands(&[13, 15]),
            Err(SourceError::MissingBand(15))
        ));
    }
}
