//! Band arrays and lookup.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BandError, BandResult};

/// ABI band number (1-16).
pub type BandIndex = u8;

/// Dimensions of a 2D grid as (rows, columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of samples in the grid.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

/// One spectral band: an immutable row-major grid of samples.
///
/// Values are reflectance factors for bands 1-6 and brightness
/// temperatures in Kelvin for bands 7-16. Fill pixels are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandArray {
    index: BandIndex,
    shape: GridShape,
    data: Vec<f64>,
}

impl BandArray {
    /// Create a band from row-major samples.
    ///
    /// Fails if `data.len() != rows * cols` or the grid is empty.
    pub fn new(index: BandIndex, rows: usize, cols: usize, data: Vec<f64>) -> BandResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(BandError::EmptyGrid(index));
        }
        let expected = rows * cols;
        if data.len() != expected {
            return Err(BandError::DataLength {
                band: index,
                rows,
                cols,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            index,
            shape: GridShape::new(rows, cols),
            data,
        })
    }

    /// Create a band from a slice of rows. All rows must have the same length.
    pub fn from_rows(index: BandIndex, rows: &[Vec<f64>]) -> BandResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(index, rows.len(), cols, data)
    }

    /// A band filled with a single value.
    pub fn filled(index: BandIndex, rows: usize, cols: usize, value: f64) -> BandResult<Self> {
        Self::new(index, rows, cols, vec![value; rows * cols])
    }

    pub fn index(&self) -> BandIndex {
        self.index
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    /// Row-major sample buffer.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Sample at (row, col), or `None` if out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.shape.rows || col >= self.shape.cols {
            return None;
        }
        self.data.get(row * self.shape.cols + col).copied()
    }

    /// Whether this is a reflective (visible/near-IR) band.
    pub fn is_reflectance(&self) -> bool {
        self.index <= 6
    }
}

/// Maps a band index to an immutable band array.
pub trait BandLookup {
    fn band(&self, index: BandIndex) -> Option<&BandArray>;
}

impl BandLookup for HashMap<BandIndex, BandArray> {
    fn band(&self, index: BandIndex) -> Option<&BandArray> {
        self.get(&index)
    }
}

impl BandLookup for BTreeMap<BandIndex, BandArray> {
    fn band(&self, index: BandIndex) -> Option<&BandArray> {
        self.get(&index)
    }
}

/// Ordered collection of bands keyed by their own index.
#[derive(Debug, Clone, Default)]
pub struct BandSet {
    bands: BTreeMap<BandIndex, BandArray>,
}

impl BandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a band, replacing any band with the same index.
    pub fn insert(&mut self, band: BandArray) -> Option<BandArray> {
        self.bands.insert(band.index(), band)
    }

    pub fn contains(&self, index: BandIndex) -> bool {
        self.bands.contains_key(&index)
    }

    /// Band indices in ascending order.
    pub fn indices(&self) -> Vec<BandIndex> {
        self.bands.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BandArray> {
        self.bands.values()
    }
}

impl BandLookup for BandSet {
    fn band(&self, index: BandIndex) -> Option<&BandArray> {
        self.bands.get(&index)
    }
}

impl FromIterator<BandArray> for BandSet {
    fn from_iter<I: IntoIterator<Item = BandArray>>(iter: I) -> Self {
        let mut set = BandSet::new();
        for band in iter {
            set.insert(band);
        }
        set
    }
}
