//! Geocode resolver.
//!
//! Filters the postcode gazetteer down to the postcodes that sit inside the
//! configured region: allowed outcode area and within `radius_km` of the
//! region centre by great-circle distance.

use crate::error::{DatasetError, Result};
use hedonic_data::{GazetteerReader, PostcodeRecord, postcode};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Haversine great-circle distance between two points, in kilometres.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Target region for the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Display name of the region
    #[serde(default = "default_name")]
    pub name: String,

    /// Region centre
    #[serde(default = "default_center")]
    pub center: GeoPoint,

    /// Inclusion radius around the centre
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,

    /// Postcode area prefixes (e.g. `SE`, `BR`) that may be included
    #[serde(default = "default_allowed_postcode_areas")]
    pub allowed_postcode_areas: Vec<String>,
}

fn default_name() -> String {
    "penge".to_string()
}

const fn default_center() -> GeoPoint {
    GeoPoint::new(51.4123, -0.0561)
}

const fn default_radius_km() -> f64 {
    5.0
}

fn default_allowed_postcode_areas() -> Vec<String> {
    vec!["SE".to_string(), "BR".to_string(), "CR".to_string()]
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            center: default_center(),
            radius_km: default_radius_km(),
            allowed_postcode_areas: default_allowed_postcode_areas(),
        }
    }
}

impl RegionConfig {
    /// Check that the region can include anything at all.
    pub fn validate(&self) -> Result<()> {
        if !self.center.lat.is_finite()
            || !self.center.lon.is_finite()
            || self.center.lat.abs() > 90.0
            || self.center.lon.abs() > 180.0
        {
            return Err(DatasetError::InvalidRegion(format!(
                "center ({}, {}) is not a valid coordinate",
                self.center.lat, self.center.lon
            )));
        }
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(DatasetError::InvalidRegion(format!(
                "radius_km must be positive, got {}",
                self.radius_km
            )));
        }
        if self.allowed_postcode_areas.iter().all(|area| area.trim().is_empty()) {
            return Err(DatasetError::InvalidRegion(
                "allowed_postcode_areas must name at least one area".to_string(),
            ));
        }
        Ok(())
    }
}

/// A postcode that passed the region filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeInfo {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Outward code of the normalized postcode
    pub outcode: String,
    /// Distance from the region centre
    pub distance_km: f64,
}

/// Read-only lookup from normalized postcode to [`PostcodeInfo`].
#[derive(Debug, Clone, Default)]
pub struct GeocodeLookup {
    entries: HashMap<String, PostcodeInfo>,
}

impl GeocodeLookup {
    /// Look up a postcode. The argument must already be normalized.
    pub fn get(&self, normalized_postcode: &str) -> Option<&PostcodeInfo> {
        self.entries.get(normalized_postcode)
    }

    /// Number of included postcodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no postcode was included.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(normalized postcode, info)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PostcodeInfo)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Counters describing one resolver pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeSummary {
    /// Rows examined
    pub total_scanned: u64,
    /// Distinct postcodes in the lookup
    pub total_included: u64,
    /// Rows skipped because the postcode is terminated
    pub terminated: u64,
    /// Rows skipped for non-finite coordinates
    pub invalid_coordinates: u64,
    /// Rows skipped because the outcode area is not allowed
    pub outside_area: u64,
    /// Rows skipped because they are beyond the radius
    pub outside_radius: u64,
}

/// Result of [`resolve`].
#[derive(Debug, Clone, Default)]
pub struct GeocodeResolution {
    /// Included postcodes
    pub lookup: GeocodeLookup,
    /// Scan counters
    pub summary: GeocodeSummary,
}

/// Filter gazetteer records down to the configured region.
pub fn resolve<I>(records: I, region: &RegionConfig) -> GeocodeResolution
where
    I: IntoIterator<Item = PostcodeRecord>,
{
    let mut lookup = GeocodeLookup::default();
    let mut summary = GeocodeSummary::default();

    for record in records {
        summary.total_scanned += 1;

        if record.is_terminated {
            summary.terminated += 1;
            continue;
        }
        if !record.latitude.is_finite() || !record.longitude.is_finite() {
            debug!("{}: non-finite coordinates", record.postcode);
            summary.invalid_coordinates += 1;
            continue;
        }

        let normalized = postcode::normalize(&record.postcode);
        let outcode = postcode::outcode(&normalized);
        if !postcode::area_allowed(outcode, &region.allowed_postcode_areas) {
            summary.outside_area += 1;
            continue;
        }

        let point = GeoPoint::new(record.latitude, record.longitude);
        let distance_km = haversine_km(region.center, point);
        if distance_km > region.radius_km {
            summary.outside_radius += 1;
            continue;
        }

        let info = PostcodeInfo {
            latitude: record.latitude,
            longitude: record.longitude,
            outcode: outcode.to_string(),
            distance_km,
        };
        lookup.entries.insert(normalized, info);
    }

    summary.total_included = lookup.len() as u64;
    info!(
        "Geocoded region '{}': {} of {} postcodes within {} km",
        region.name, summary.total_included, summary.total_scanned, region.radius_km
    );
    GeocodeResolution { lookup, summary }
}

/// Read a gazetteer file and resolve it against `region`.
///
/// Fails before scanning any row when the header lacks the postcode,
/// latitude or longitude column.
pub fn resolve_file(path: &Path, region: &RegionConfig) -> Result<GeocodeResolution> {
    let mut reader = GazetteerReader::from_path(path)?;
    Ok(resolve(reader.records(), region))
}
