//! Geostationary satellite projection.
//!
//! The satellite views Earth from a fixed position above the equator, and
//! ABI image coordinates are scan angles in radians from nadir. Multiplying a
//! scan angle by the satellite height gives the projection-plane distance
//! that map renderers expect for `+proj=geos`.
//!
//! Reference: GOES-R Product Definition and Users' Guide (PUG) Volume 4

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, ProjectionResult};

/// Scan-angle axis of an ABI image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanAxis {
    X,
    Y,
}

impl fmt::Display for ScanAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanAxis::X => f.write_str("x"),
            ScanAxis::Y => f.write_str("y"),
        }
    }
}

/// Axis the scanning mirror sweeps along ("x" for GOES-R, "y" for Meteosat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepAxis {
    X,
    Y,
}

impl fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepAxis::X => f.write_str("x"),
            SweepAxis::Y => f.write_str("y"),
        }
    }
}

/// The four projection constants stored in `goes_imager_projection`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionScalars {
    /// Satellite height above the ellipsoid (`perspective_point_height`, meters)
    pub satellite_height: f64,
    /// Equatorial radius (meters)
    pub semi_major_axis: f64,
    /// Polar radius (meters)
    pub semi_minor_axis: f64,
    /// Longitude of the sub-satellite point (degrees, negative west)
    pub central_longitude: f64,
}

impl ProjectionScalars {
    pub fn new(
        satellite_height: f64,
        semi_major_axis: f64,
        semi_minor_axis: f64,
        central_longitude: f64,
    ) -> Self {
        Self {
            satellite_height,
            semi_major_axis,
            semi_minor_axis,
            central_longitude,
        }
    }

    /// GOES-16 (GOES-East at 75.2°W) on the GRS80 ellipsoid.
    pub fn goes16() -> Self {
        Self::new(35786023.0, 6378137.0, 6356752.31414, -75.2)
    }

    /// GOES-18 (GOES-West at 137.2°W) on the GRS80 ellipsoid.
    pub fn goes18() -> Self {
        Self::new(35786023.0, 6378137.0, 6356752.31414, -137.2)
    }

    fn validate(&self) -> ProjectionResult<()> {
        let positive = [
            ("satellite_height", self.satellite_height),
            ("semi_major_axis", self.semi_major_axis),
            ("semi_minor_axis", self.semi_minor_axis),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ProjectionError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and positive",
                });
            }
        }
        if self.semi_minor_axis > self.semi_major_axis {
            return Err(ProjectionError::InvalidParameter {
                name: "semi_minor_axis",
                value: self.semi_minor_axis,
                reason: "must not exceed semi_major_axis",
            });
        }
        if !self.central_longitude.is_finite() {
            return Err(ProjectionError::InvalidParameter {
                name: "central_longitude",
                value: self.central_longitude,
                reason: "must be finite",
            });
        }
        Ok(())
    }
}

/// Geostationary projection description handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDescriptor {
    /// Semi-major axis of Earth ellipsoid (meters)
    pub semi_major_axis: f64,
    /// Semi-minor axis of Earth ellipsoid (meters)
    pub semi_minor_axis: f64,
    /// Satellite height above the ellipsoid (meters)
    pub satellite_height: f64,
    /// Longitude of projection origin (degrees)
    pub central_longitude: f64,
    /// Latitude of projection origin; geostationary platforms sit on the equator
    pub central_latitude: f64,
    pub sweep_axis: SweepAxis,
}

impl ProjectionDescriptor {
    pub fn from_scalars(scalars: &ProjectionScalars) -> Self {
        Self {
            semi_major_axis: scalars.semi_major_axis,
            semi_minor_axis: scalars.semi_minor_axis,
            satellite_height: scalars.satellite_height,
            central_longitude: scalars.central_longitude,
            central_latitude: 0.0,
            sweep_axis: SweepAxis::X,
        }
    }

    /// PROJ definition string for this projection.
    pub fn proj_string(&self) -> String {
        format!(
            "+proj=geos +h={} +a={} +b={} +lon_0={} +sweep={} +units=m +no_defs",
            self.satellite_height,
            self.semi_major_axis,
            self.semi_minor_axis,
            self.central_longitude,
            self.sweep_axis
        )
    }

    /// Distance from Earth center to the satellite (meters).
    fn orbit_radius(&self) -> f64 {
        self.satellite_height + self.semi_major_axis
    }

    /// Convert scan angles (radians) to geographic coordinates (lon, lat degrees).
    ///
    /// Based on GOES-R PUG Volume 4, Section 4.2.8.
    /// Returns `None` if the scan angle points to space.
    pub fn scan_to_geo(&self, x_rad: f64, y_rad: f64) -> Option<(f64, f64)> {
        let h = self.orbit_radius();
        let req = self.semi_major_axis;
        let rpol = self.semi_minor_axis;
        let lambda_0 = self.central_longitude.to_radians();

        let (sin_x, cos_x) = x_rad.sin_cos();
        let (sin_y, cos_y) = y_rad.sin_cos();

        // Distance to the surface along the line of sight solves a quadratic
        let a = sin_x.powi(2) + cos_x.powi(2) * (cos_y.powi(2) + (req / rpol).powi(2) * sin_y.powi(2));
        let b = -2.0 * h * cos_x * cos_y;
        let c = h.powi(2) - req.powi(2);

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let rs = (-b - discriminant.sqrt()) / (2.0 * a);

        let sx = rs * cos_x * cos_y;
        let sy = -rs * sin_x;
        let sz = rs * cos_x * sin_y;

        let lat = ((req / rpol).powi(2) * sz / (h - sx).hypot(sy)).atan();
        let lon = lambda_0 - sy.atan2(h - sx);

        Some((lon.to_degrees(), lat.to_degrees()))
    }

    /// Convert geographic coordinates (degrees) to scan angles (radians).
    ///
    /// Returns `None` if the point is beyond the limb as seen from the satellite.
    pub fn geo_to_scan(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        let h = self.orbit_radius();
        let req = self.semi_major_axis;
        let rpol = self.semi_minor_axis;
        let lambda_0 = self.central_longitude.to_radians();

        let lat = lat_deg.to_radians();
        let dlon = lon_deg.to_radians() - lambda_0;

        // Geocentric latitude and radius on the ellipsoid
        let phi_c = ((rpol / req).powi(2) * lat.tan()).atan();
        let e2 = 1.0 - (rpol / req).powi(2);
        let rc = rpol / (1.0 - e2 * phi_c.cos().powi(2)).sqrt();

        let sx = h - rc * phi_c.cos() * dlon.cos();
        let sy = -rc * phi_c.cos() * dlon.sin();
        let sz = rc * phi_c.sin();

        // Hidden behind the limb
        if h * (h - sx) < sy.powi(2) + (req / rpol).powi(2) * sz.powi(2) {
            return None;
        }

        let x_rad = (-sy / (sx.powi(2) + sy.powi(2) + sz.powi(2)).sqrt()).asin();
        let y_rad = (sz / sx).atan();
        Some((x_rad, y_rad))
    }
}

/// Image bounds in projection-plane meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageExtent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl ImageExtent {
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Scan-angle bounds (radians) for a given satellite height.
    pub fn scan_bounds(&self, satellite_height: f64) -> (f64, f64, f64, f64) {
        (
            self.west / satellite_height,
            self.east / satellite_height,
            self.south / satellite_height,
            self.north / satellite_height,
        )
    }

    /// As the `(west, east, south, north)` tuple renderers take.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.west, self.east, self.south, self.north)
    }
}

/// Derive the projection description and image extent for one data source.
///
/// The extent is `(min(x)·h, max(x)·h, min(y)·h, max(y)·h)`. `NaN`
/// coordinates are skipped; a sequence with no finite value is empty.
pub fn derive_projection(
    scalars: &ProjectionScalars,
    x_scan: &[f64],
    y_scan: &[f64],
) -> ProjectionResult<(ProjectionDescriptor, ImageExtent)> {
    scalars.validate()?;

    let (x_min, x_max) = finite_range(x_scan).ok_or(ProjectionError::EmptyCoordinateArray {
        axis: ScanAxis::X,
    })?;
    let (y_min, y_max) = finite_range(y_scan).ok_or(ProjectionError::EmptyCoordinateArray {
        axis: ScanAxis::Y,
    })?;

    let h = scalars.satellite_height;
    let extent = ImageExtent {
        west: x_min * h,
        east: x_max * h,
        south: y_min * h,
        north: y_max * h,
    };

    Ok((ProjectionDescriptor::from_scalars(scalars), extent))
}

/// Rebuild a scan-angle axis from packed-integer scale/offset attributes:
/// `value[i] = add_offset + i * scale_factor`.
pub fn scan_axis(add_offset: f64, scale_factor: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| add_offset + i as f64 * scale_factor).collect()
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
