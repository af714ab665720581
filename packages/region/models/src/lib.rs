#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Gyeonggi-do region reference data.
//!
//! The 31 cities and counties of the province are embedded at compile
//! time from `data/regions.toml` and parsed once on first access. The
//! list is immutable: lookups hand out `&'static` references.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Number of regions in the embedded reference list. Enforced by a test.
pub const EXPECTED_REGION_COUNT: usize = 31;

/// Province center used when no region is selected.
pub const GYEONGGI_CENTER: LatLng = LatLng {
    lat: 37.4138,
    lng: 127.0183,
};

/// Map zoom level for the whole province.
pub const DEFAULT_ZOOM: u8 = 10;
/// Map zoom level when a city or county is selected.
pub const CITY_ZOOM: u8 = 12;
/// Map zoom level when a district is selected.
pub const DISTRICT_ZOOM: u8 = 14;

const REGIONS_TOML: &str = include_str!("../data/regions.toml");

static REGIONS: LazyLock<Vec<Region>> = LazyLock::new(|| {
    toml::from_str::<RegionFile>(REGIONS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded region list: {e}"))
        .regions
});

/// A WGS84 coordinate in map order (latitude first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A city or county of Gyeonggi-do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Romanized slug (e.g. `"suwon"`).
    pub id: String,
    /// Korean name including the 시/군 suffix (e.g. `"수원시"`).
    pub name: String,
    /// Five-digit administrative code (e.g. `"41110"`).
    pub code: String,
    /// Map center.
    pub center: LatLng,
    /// Sub-districts (구), empty for most regions.
    #[serde(default)]
    pub districts: Vec<District>,
}

/// A district (구) inside a [`Region`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    /// Romanized slug.
    pub id: String,
    /// Korean name.
    pub name: String,
    /// Map center.
    pub center: LatLng,
}

/// Result of a keyword search over regions and their districts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionMatch {
    /// The matched region.
    pub region: &'static Region,
    /// The district whose name matched, if the keyword hit a district.
    pub district: Option<&'static District>,
}

impl RegionMatch {
    /// Map center and zoom level appropriate for this match.
    #[must_use]
    pub fn viewport(&self) -> (LatLng, u8) {
        self.district.map_or((self.region.center, CITY_ZOOM), |d| {
            (d.center, DISTRICT_ZOOM)
        })
    }
}

#[derive(Deserialize)]
struct RegionFile {
    regions: Vec<Region>,
}

/// Returns every region in declaration order (cities, then counties).
#[must_use]
pub fn all_regions() -> &'static [Region] {
    &REGIONS
}

/// Looks up a region by its exact Korean name.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.name == name)
}

/// Looks up a region by its administrative code.
#[must_use]
pub fn by_code(code: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.code == code)
}

/// Looks up a region by its slug.
#[must_use]
pub fn by_id(id: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.id == id)
}

/// Resolves free-form user input to a region.
///
/// Tries the slug, the administrative code and the exact name first,
/// then falls back to [`search`].
#[must_use]
pub fn resolve(input: &str) -> Option<&'static Region> {
    let input = input.trim();
    by_id(input)
        .or_else(|| by_code(input))
        .or_else(|| by_name(input))
        .or_else(|| search(input).map(|m| m.region))
}

/// Finds the first region whose name, or one of whose district names,
/// contains `keyword`.
///
/// Returns `None` for a blank keyword.
#[must_use]
pub fn search(keyword: &str) -> Option<RegionMatch> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return None;
    }

    let region = REGIONS.iter().find(|r| {
        r.name.contains(keyword) || r.districts.iter().any(|d| d.name.contains(keyword))
    })?;
    let district = region.districts.iter().find(|d| d.name.contains(keyword));

    Some(RegionMatch { region, district })
}
