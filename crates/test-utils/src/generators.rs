//! Synthetic band generators.
//!
//! All generators return row-major `Vec<f64>` buffers of `rows * cols`
//! samples, matching the layout of `BandArray`.

/// Creates a reflectance-factor grid in `[0, 1]`, dark in the top-left
/// corner and bright in the bottom-right.
pub fn create_reflectance_grid(rows: usize, cols: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let x = col as f64 / cols.saturating_sub(1).max(1) as f64;
            let y = row as f64 / rows.saturating_sub(1).max(1) as f64;
            data.push((x + y) / 2.0);
        }
    }
    data
}

/// Creates a brightness-temperature grid (Kelvin) ramping linearly from
/// `min_k` at the first sample to `max_k` at the last.
pub fn create_brightness_temperature_grid(
    rows: usize,
    cols: usize,
    min_k: f64,
    max_k: f64,
) -> Vec<f64> {
    let n = rows * cols;
    let span = n.saturating_sub(1).max(1) as f64;
    (0..n)
        .map(|i| min_k + (max_k - min_k) * i as f64 / span)
        .collect()
}

/// Creates a deterministic pseudo-random grid with values in `[lo, hi)`.
pub fn create_noise_grid(rows: usize, cols: usize, seed: u32, lo: f64, hi: f64) -> Vec<f64> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let unit = simple_hash(col as u32, row as u32, seed) as f64 / (u32::MAX as f64 + 1.0);
            data.push(lo + unit * (hi - lo));
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflectance_grid_range() {
        let grid = create_reflectance_grid(4, 6);
        assert_eq!(grid.len(), 24);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[23], 1.0);
        assert!(grid.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_brightness_temperature_grid_endpoints() {
        let grid = create_brightness_temperature_grid(3, 3, 200.0, 300.0);
        assert_eq!(grid[0], 200.0);
        assert_eq!(grid[8], 300.0);
    }

    #[test]
    fn test_noise_grid_is_deterministic() {
        let a = create_noise_grid(8, 8, 42, -5.0, 5.0);
        let b = create_noise_grid(8, 8, 42, -5.0, 5.0);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (-5.0..5.0).contains(v)));
        assert_ne!(a, create_noise_grid(8, 8, 43, -5.0, 5.0));
    }
}
