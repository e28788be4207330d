//! Assembled three-layer composite image.

use sat_common::GridShape;

use crate::recipe::Channel;

/// A `rows × cols × 3` image, channel-last and row-major.
///
/// Values are nominally in `[0, 1]`; missing pixels are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeImage {
    shape: GridShape,
    data: Vec<f64>,
}

impl CompositeImage {
    /// Stack three equally sized layers along a trailing axis.
    pub(crate) fn from_layers(shape: GridShape, layers: [Vec<f64>; 3]) -> Self {
        let [red, green, blue] = layers;
        debug_assert!(red.len() == shape.len() && green.len() == shape.len() && blue.len() == shape.len());

        let mut data = Vec::with_capacity(shape.len() * 3);
        for ((r, g), b) in red.into_iter().zip(green).zip(blue) {
            data.extend_from_slice(&[r, g, b]);
        }
        Self { shape, data }
    }

    /// `(rows, cols, 3)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.shape.rows, self.shape.cols, 3)
    }

    pub fn grid_shape(&self) -> GridShape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    /// Interleaved RGB samples.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn pixel(&self, row: usize, col: usize) -> Option<[f64; 3]> {
        if row >= self.shape.rows || col >= self.shape.cols {
            return None;
        }
        let i = (row * self.shape.cols + col) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    pub fn value(&self, row: usize, col: usize, channel: Channel) -> Option<f64> {
        self.pixel(row, col).map(|p| p[channel.offset()])
    }

    /// Copy of one layer in row-major order.
    pub fn channel(&self, channel: Channel) -> Vec<f64> {
        self.data
            .iter()
            .skip(channel.offset())
            .step_by(3)
            .copied()
            .collect()
    }

    pub fn pixels(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    /// Smallest and largest finite sample, or `None` if every sample is `NaN`.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Number of pixels with at least one missing channel.
    pub fn missing_pixels(&self) -> usize {
        self.pixels()
            .filter(|p| p.iter().any(|v| v.is_nan()))
            .count()
    }
}
