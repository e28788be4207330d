//! Deterministic synthetic ABI scenes.
//!
//! The scene covers the GOES-16 CONUS fixed-grid window at whatever
//! resolution is requested. A band of synthetic cloud runs diagonally
//! across a warm surface so every reference recipe has structure to show.

use chrono::{TimeZone, Utc};
use projection::{scan_axis, ProjectionScalars};
use sat_common::{BandArray, BandIndex, ObservationWindow};
use tracing::debug;

use crate::error::SourceResult;
use crate::memory::MemorySource;
use crate::source::SourceMetadata;

/// GOES-16 CONUS scan-angle window, radians (first pixel center, last pixel center).
const CONUS_X: (f64, f64) = (-0.101332, 0.038612);
const CONUS_Y: (f64, f64) = (0.128212, 0.044268);

/// Clear-sky brightness temperature offset per IR band (K), relative to C13.
fn clear_sky_offset(band: BandIndex) -> f64 {
    match band {
        7 => 4.0,
        8 => -52.0,
        9 => -42.0,
        10 => -33.0,
        11 => -3.0,
        12 => -28.0,
        13 => 0.0,
        14 => -1.0,
        15 => -3.5,
        16 => -12.0,
        _ => 0.0,
    }
}

/// Surface reflectance per visible/near-IR band.
fn surface_reflectance(band: BandIndex) -> f64 {
    match band {
        1 => 0.08,
        2 => 0.06,
        3 => 0.25,
        4 => 0.01,
        5 => 0.15,
        6 => 0.08,
        _ => 0.0,
    }
}

/// Cloud optical fraction in `[0, 1]` at normalized image position `(u, v)`.
fn cloud_fraction(u: f64, v: f64) -> f64 {
    let ridge = (-(((u - v) * 6.0).powi(2))).exp();
    let texture = 0.5 + 0.5 * (u * 23.0).sin() * (v * 17.0).cos();
    (ridge * (0.6 + 0.4 * texture)).clamp(0.0, 1.0)
}

fn axis(range: (f64, f64), len: usize) -> Vec<f64> {
    let step = (range.1 - range.0) / len.saturating_sub(1).max(1) as f64;
    scan_axis(range.0, step, len)
}

/// Build a 16-band scene of `rows × cols` pixels on the GOES-16 CONUS grid.
///
/// Fails only if `rows` or `cols` is zero.
pub fn synthetic_scene(rows: usize, cols: usize) -> SourceResult<MemorySource> {
    let x = axis(CONUS_X, cols);
    let y = axis(CONUS_Y, rows);

    let mut cloud = Vec::with_capacity(rows * cols);
    let mut latitude = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let v = row as f64 / rows.saturating_sub(1).max(1) as f64;
        for col in 0..cols {
            let u = col as f64 / cols.saturating_sub(1).max(1) as f64;
            cloud.push(cloud_fraction(u, v));
            latitude.push(v);
        }
    }

    let mut source = MemorySource::new(ProjectionScalars::goes16(), x, y)
        .with_metadata(synthetic_metadata());

    for band in 1..=16u8 {
        let data: Vec<f64> = if band <= 6 {
            cloud
                .iter()
                .map(|c| {
                    let surface = surface_reflectance(band);
                    surface + (0.85 - surface) * c
                })
                .collect()
        } else {
            cloud
                .iter()
                .zip(&latitude)
                .map(|(c, v)| {
                    // Warm south, cooler north, cold cloud tops
                    let surface = 300.0 - 25.0 * v + clear_sky_offset(band);
                    surface - 70.0 * c
                })
                .collect()
        };
        source.insert_band(BandArray::new(band, rows, cols, data)?);
    }

    debug!(rows = rows, cols = cols, "Built synthetic ABI scene");
    Ok(source)
}

fn synthetic_metadata() -> SourceMetadata {
    let start = Utc.with_ymd_and_hms(2023, 5, 3, 12, 0, 0).single();
    let end = Utc.with_ymd_and_hms(2023, 5, 3, 12, 2, 57).single();
    SourceMetadata {
        platform_id: Some("G16".to_string()),
        title: Some("Synthetic ABI L2 Cloud and Moisture Imagery".to_string()),
        window: start.zip(end).map(|(s, e)| ObservationWindow::new(s, e)),
    }
}
