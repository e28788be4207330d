//! Native NetCDF reading of ABI L2 Cloud and Moisture Imagery files.
//!
//! Requires the `netcdf` feature (libnetcdf and HDF5 at build time).
//! Whole files are read into a [`MemorySource`] so the result can be shared
//! across worker threads; libnetcdf handles are not.

use std::path::Path;
use std::sync::Once;

use netcdf::AttributeValue;
use projection::ProjectionScalars;
use sat_common::{BandArray, BandIndex, ObservationWindow};
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceResult};
use crate::memory::MemorySource;
use crate::source::SourceMetadata;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even for errors the Rust side
/// handles, e.g. probing for an optional attribute. Only needs to run once
/// per process; later calls are no-ops.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open an ABI L2 MCMIP file (all 16 `CMI_Cnn` variables) or a single-band
/// CMIP file (`CMI` plus `band_id`).
pub fn open_mcmip<P: AsRef<Path>>(path: P) -> SourceResult<MemorySource> {
    silence_hdf5_errors();
    let path = path.as_ref();

    let file = netcdf::open(path)
        .map_err(|e| SourceError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    let x = read_scan_axis(&file, "x")?;
    let y = read_scan_axis(&file, "y")?;
    let scalars = read_projection(&file)?;
    let metadata = read_metadata(&file);

    let (rows, cols) = (y.len(), x.len());
    let mut source = MemorySource::new(scalars, x, y).with_metadata(metadata);

    let mut found = 0;
    for band in 1..=16u8 {
        let name = format!("CMI_C{:02}", band);
        if let Some(var) = file.variable(&name) {
            source.insert_band(read_cmi(&var, band, rows, cols)?);
            found += 1;
        }
    }

    if found == 0 {
        let var = file
            .variable("CMI")
            .ok_or_else(|| SourceError::MissingData("CMI or CMI_Cnn variables".to_string()))?;
        let band = read_band_id(&file)?;
        source.insert_band(read_cmi(&var, band, rows, cols)?);
        found = 1;
    }

    info!(
        path = %path.display(),
        bands = found,
        rows,
        cols,
        "Loaded ABI file"
    );
    Ok(source)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Unpack one imagery variable: scale/offset applied, `_FillValue` as `NaN`.
fn read_cmi(
    var: &netcdf::Variable,
    band: BandIndex,
    rows: usize,
    cols: usize,
) -> SourceResult<BandArray> {
    let raw: Vec<i16> = var
        .get_values(..)
        .map_err(|e| SourceError::InvalidFormat(format!("Failed to read {}: {}", var.name(), e)))?;

    let scale_factor = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);
    let fill_value = get_i16_attr(var, "_FillValue");
    // ABI imagery is stored as unsigned 16-bit counts
    let unsigned = get_str_attr(var, "_Unsigned").is_some_and(|s| s == "true");

    let data: Vec<f64> = raw
        .iter()
        .map(|&val| {
            if Some(val) == fill_value {
                return f64::NAN;
            }
            let count = if unsigned { val as u16 as f64 } else { val as f64 };
            count * scale_factor + add_offset
        })
        .collect();

    debug!(band = band, scale_factor = scale_factor, add_offset = add_offset, "Unpacked band");
    Ok(BandArray::new(band, rows, cols, data)?)
}

fn read_scan_axis(file: &netcdf::File, name: &str) -> SourceResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| SourceError::MissingData(format!("{} variable", name)))?;
    let raw: Vec<i16> = var
        .get_values(..)
        .map_err(|e| SourceError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

    let scale = get_f64_attr(&var, "scale_factor")
        .ok_or_else(|| SourceError::MissingData(format!("{}:scale_factor", name)))?;
    let offset = get_f64_attr(&var, "add_offset")
        .ok_or_else(|| SourceError::MissingData(format!("{}:add_offset", name)))?;

    Ok(raw.iter().map(|&v| v as f64 * scale + offset).collect())
}

fn read_projection(file: &netcdf::File) -> SourceResult<ProjectionScalars> {
    let var = file
        .variable("goes_imager_projection")
        .ok_or_else(|| SourceError::MissingData("goes_imager_projection variable".to_string()))?;

    let required = |name: &str| {
        get_f64_attr(&var, name)
            .ok_or_else(|| SourceError::MissingData(format!("goes_imager_projection:{}", name)))
    };

    if let Some(sweep) = get_str_attr(&var, "sweep_angle_axis") {
        if sweep != "x" {
            warn!(sweep = %sweep, "Unexpected sweep angle axis");
        }
    }

    Ok(ProjectionScalars::new(
        required("perspective_point_height")?,
        required("semi_major_axis")?,
        required("semi_minor_axis")?,
        required("longitude_of_projection_origin")?,
    ))
}

fn read_band_id(file: &netcdf::File) -> SourceResult<BandIndex> {
    let var = file
        .variable("band_id")
        .ok_or_else(|| SourceError::MissingData("band_id variable".to_string()))?;
    let ids: Vec<i32> = var
        .get_values(..)
        .map_err(|e| SourceError::InvalidFormat(format!("Failed to read band_id: {}", e)))?;
    ids.first()
        .and_then(|&id| BandIndex::try_from(id).ok())
        .filter(|id| (1..=16).contains(id))
        .ok_or_else(|| SourceError::InvalidFormat(format!("band_id {:?}", ids)))
}

fn read_metadata(file: &netcdf::File) -> SourceMetadata {
    let window = match (
        get_global_str(file, "time_coverage_start"),
        get_global_str(file, "time_coverage_end"),
    ) {
        (Some(start), Some(end)) => match ObservationWindow::parse(&start, &end) {
            Ok(window) => Some(window),
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable time coverage");
                None
            }
        },
        _ => None,
    };

    SourceMetadata {
        platform_id: get_global_str(file, "platform_ID"),
        title: get_global_str(file, "title"),
        window,
    }
}

/// Check if a variable has an attribute with the given name.
/// Avoids HDF5 error spam when probing optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn get_i16_attr(var: &netcdf::Variable, name: &str) -> Option<i16> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    i16::try_from(attr_value).ok()
}

fn get_str_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn get_global_str(file: &netcdf::File, name: &str) -> Option<String> {
    match file.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
