//! ABI L2 file naming.
//!
//! `OR_ABI-L2-MCMIPC-M6_G16_s20231231200000_e20231231202373_c20231231202479.nc`
//!
//! | Field | Meaning |
//! |---|---|
//! | `OR` | operational, real-time |
//! | `ABI-L2-MCMIPC` | product (`MCMIP`) and scene (`C` = CONUS) |
//! | `M6` | scan mode, optionally followed by a band (`M6C13`) |
//! | `G16` | platform |
//! | `s`/`e`/`c` | scan start, scan end, file creation: `YYYYDDDHHMMSSt` |

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use sat_common::BandIndex;

use crate::error::{SourceError, SourceResult};

/// Scan sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    FullDisk,
    Conus,
    Mesoscale1,
    Mesoscale2,
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scene::FullDisk => "FullDisk",
            Scene::Conus => "CONUS",
            Scene::Mesoscale1 => "Mesoscale1",
            Scene::Mesoscale2 => "Mesoscale2",
        };
        f.write_str(name)
    }
}

/// Fields encoded in an ABI L2 file name.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiFileName {
    /// Product without the scene suffix, e.g. "MCMIP" or "CMIP"
    pub product: String,
    pub scene: Scene,
    /// Scan mode number (3, 4 or 6)
    pub scan_mode: u8,
    /// Band for single-band products
    pub band: Option<BandIndex>,
    /// Platform identifier, e.g. "G16"
    pub platform: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub created: Option<DateTime<Utc>>,
}

impl AbiFileName {
    /// Parse a bare file name or a path ending in one.
    pub fn parse(name: &str) -> SourceResult<Self> {
        let file_name = Path::new(name)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        let stem = file_name.strip_suffix(".nc").unwrap_or(file_name);

        let mut fields = stem.split('_');
        let _environment = fields.next();
        let product_field = fields.next().ok_or_else(|| invalid(name, "missing product"))?;
        let platform = fields.next().ok_or_else(|| invalid(name, "missing platform"))?;

        let mut start = None;
        let mut end = None;
        let mut created = None;
        for field in fields {
            if let Some(ts) = field.strip_prefix('s') {
                start = parse_timestamp(ts);
            } else if let Some(ts) = field.strip_prefix('e') {
                end = parse_timestamp(ts);
            } else if let Some(ts) = field.strip_prefix('c') {
                created = parse_timestamp(ts);
            }
        }
        let start = start.ok_or_else(|| invalid(name, "missing or malformed start time"))?;

        // ABI-L2-MCMIPC-M6 or ABI-L2-CMIPF-M6C13
        let (product_scene, mode_band) = product_field
            .rsplit_once('-')
            .ok_or_else(|| invalid(name, "missing scan mode"))?;
        let product_scene = product_scene
            .strip_prefix("ABI-L2-")
            .ok_or_else(|| invalid(name, "not an ABI L2 product"))?;
        let (product, scene) =
            split_scene(product_scene).ok_or_else(|| invalid(name, "unknown scene"))?;
        let (scan_mode, band) =
            parse_mode(mode_band).ok_or_else(|| invalid(name, "bad scan mode"))?;

        if !platform.starts_with('G') {
            return Err(invalid(name, "bad platform"));
        }

        Ok(Self {
            product: product.to_string(),
            scene,
            scan_mode,
            band,
            platform: platform.to_string(),
            start,
            end,
            created,
        })
    }

    /// True for multi-band MCMIP files.
    pub fn is_multiband(&self) -> bool {
        self.product == "MCMIP"
    }
}

impl FromStr for AbiFileName {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn invalid(name: &str, reason: &str) -> SourceError {
    SourceError::InvalidFormat(format!("{}: {}", name, reason))
}

fn split_scene(product_scene: &str) -> Option<(&str, Scene)> {
    if let Some(product) = product_scene.strip_suffix("M1") {
        return Some((product, Scene::Mesoscale1));
    }
    if let Some(product) = product_scene.strip_suffix("M2") {
        return Some((product, Scene::Mesoscale2));
    }
    if let Some(product) = product_scene.strip_suffix('F') {
        return Some((product, Scene::FullDisk));
    }
    if let Some(product) = product_scene.strip_suffix('C') {
        return Some((product, Scene::Conus));
    }
    None
}

/// `M6` or `M6C13`.
fn parse_mode(field: &str) -> Option<(u8, Option<BandIndex>)> {
    let rest = field.strip_prefix('M')?;
    match rest.split_once('C') {
        Some((mode, band)) => Some((mode.parse().ok()?, Some(band.parse().ok()?))),
        None => Some((rest.parse().ok()?, None)),
    }
}

/// `YYYYDDDHHMMSSt`: year, day of year, time, tenths of a second.
fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if ts.len() < 13 || !ts.is_ascii() {
        return None;
    }

    let year: i32 = ts[0..4].parse().ok()?;
    let day_of_year: u32 = ts[4..7].parse().ok()?;
    let hour: u32 = ts[7..9].parse().ok()?;
    let minute: u32 = ts[9..11].parse().ok()?;
    let second: u32 = ts[11..13].parse().ok()?;
    let tenths: i64 = match ts.get(13..14) {
        Some(t) => t.parse().ok()?,
        None => 0,
    };

    let date = NaiveDate::from_yo_opt(year, day_of_year)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    let dt = Utc.from_utc_datetime(&NaiveDateTime::new(date, time));
    Some(dt + Duration::milliseconds(tenths * 100))
}
