#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Representative-point extraction for WFS feature geometries.
//!
//! Features arrive as `GeoJSON` `Point`, `Polygon` or `MultiPolygon`
//! geometries in `[lng, lat]` order. The map needs a single `[lat, lng]`
//! marker position per feature, so the first vertex of the first ring is
//! used as the representative point. This is not a centroid.
//!
//! Some layers ignore the requested `EPSG:4326` and answer in a projected
//! metric system (Korea 2000 / Central Belt, `EPSG:5186`). Those values
//! are recovered with a coarse linear approximation. Anything that still
//! falls outside the province bounding box is reported as not plottable.

use std::ops::RangeInclusive;

use flood_map_region_models::LatLng;

/// Latitude range accepted as a position inside the province.
pub const LAT_BOUNDS: RangeInclusive<f64> = 36.0..=39.0;

/// Longitude range accepted as a position inside the province.
pub const LNG_BOUNDS: RangeInclusive<f64> = 125.0..=130.0;

/// Both raw values must exceed this to be treated as projected meters.
const PROJECTED_THRESHOLD: f64 = 100_000.0;

/// False northing/easting origin and meters-per-degree used by the
/// approximate projected-to-geographic conversion.
const ORIGIN_NORTHING: f64 = 2_000_000.0;
const ORIGIN_EASTING: f64 = 1_000_000.0;
const ORIGIN_LAT: f64 = 38.0;
const ORIGIN_LNG: f64 = 127.0;
const METERS_PER_DEGREE_LAT: f64 = 110_000.0;
const METERS_PER_DEGREE_LNG: f64 = 90_000.0;

/// Returns `true` if the position lies inside the province bounding box.
#[must_use]
pub fn is_in_bounds(position: LatLng) -> bool {
    LAT_BOUNDS.contains(&position.lat) && LNG_BOUNDS.contains(&position.lng)
}

/// Approximates a geographic position from projected `(easting,
/// northing)` meters.
///
/// Low accuracy (hundreds of meters); good enough to drop a marker in the
/// right neighborhood.
#[must_use]
pub fn approximate_from_projected(easting: f64, northing: f64) -> LatLng {
    LatLng::new(
        ORIGIN_LAT + (northing - ORIGIN_NORTHING) / METERS_PER_DEGREE_LAT,
        ORIGIN_LNG + (easting - ORIGIN_EASTING) / METERS_PER_DEGREE_LNG,
    )
}

/// Extracts a plottable `[lat, lng]` position from a raw `GeoJSON`
/// geometry.
///
/// Returns `None` when the geometry is missing, malformed, of an
/// unsupported type, or outside the province after the projected
/// fallback. Callers treat `None` as "not plottable".
#[must_use]
pub fn extract_position(geometry: &serde_json::Value) -> Option<LatLng> {
    let (x, y) = first_vertex(geometry)?;

    let direct = LatLng::new(y, x);
    if is_in_bounds(direct) {
        return Some(direct);
    }

    if x > PROJECTED_THRESHOLD && y > PROJECTED_THRESHOLD {
        let approx = approximate_from_projected(x, y);
        if is_in_bounds(approx) {
            return Some(approx);
        }
    }

    None
}

/// Formats the representative vertex of a geometry for display, without
/// any bounds check or reprojection.
///
/// Polygon kinds are suffixed so a reader knows the point is a vertex,
/// not the feature itself.
#[must_use]
pub fn format_coordinates(geometry: &serde_json::Value) -> Option<String> {
    let (x, y) = first_vertex(geometry)?;
    let suffix = match geometry_type(geometry) {
        Some("Polygon") => " (polygon)",
        Some("MultiPolygon") => " (multipolygon)",
        _ => "",
    };
    Some(format!("{y:.5}, {x:.5}{suffix}"))
}

/// Returns the `GeoJSON` `type` tag of a raw geometry.
#[must_use]
pub fn geometry_type(geometry: &serde_json::Value) -> Option<&str> {
    geometry
        .get("type")
        .and_then(serde_json::Value::as_str)
        .filter(|t| !t.is_empty())
}

/// First vertex of the first ring of the first polygon, as raw `(x, y)`.
///
/// Only the path down to that vertex is read, so a malformed later ring
/// or polygon does not hide a usable first position.
fn first_vertex(geometry: &serde_json::Value) -> Option<(f64, f64)> {
    let pointer = match geometry_type(geometry)? {
        "Point" => "/coordinates",
        "Polygon" => "/coordinates/0/0",
        "MultiPolygon" => "/coordinates/0/0/0",
        _ => return None,
    };
    let position: geojson::Position =
        serde_json::from_value(geometry.pointer(pointer)?.clone()).ok()?;

    match position.as_slice() {
        [x, y, ..] if x.is_finite() && y.is_finite() => Some((*x, *y)),
        _ => None,
    }
}
