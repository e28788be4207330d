//! Composite samples to 8-bit RGBA.

use compositor::CompositeImage;
use rayon::prelude::*;

/// Minimum pixels to benefit from parallel conversion
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Scale a `[0, 1]` sample to a byte, clamping out-of-range values.
#[inline]
pub fn to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn pixel_to_rgba(pixel: &[f64], out: &mut [u8]) {
    if pixel.iter().any(|v| v.is_nan()) {
        out.copy_from_slice(&[0, 0, 0, 0]);
    } else {
        out[0] = to_byte(pixel[0]);
        out[1] = to_byte(pixel[1]);
        out[2] = to_byte(pixel[2]);
        out[3] = 255;
    }
}

/// Convert a composite to row-major RGBA bytes.
///
/// A pixel with any missing channel becomes fully transparent.
pub fn composite_to_rgba(image: &CompositeImage) -> Vec<u8> {
    let samples = image.as_slice();
    let num_pixels = samples.len() / 3;
    let mut rgba = vec![0u8; num_pixels * 4];

    if num_pixels >= PARALLEL_THRESHOLD {
        rgba.par_chunks_mut(4)
            .zip(samples.par_chunks(3))
            .for_each(|(out, pixel)| pixel_to_rgba(pixel, out));
    } else {
        for (out, pixel) in rgba.chunks_mut(4).zip(samples.chunks(3)) {
            pixel_to_rgba(pixel, out);
        }
    }

    rgba
}
