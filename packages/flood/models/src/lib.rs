#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flood statistics and detail record types.
//!
//! These are transient view-layer records: they are built fresh for each
//! region selection from WFS responses and discarded on the next one.
//! The danger index (0..1) and the danger rank come from a different
//! source layer than the per-facility risk grade (0..5); the two scales
//! are never mixed.

pub mod grade;

use flood_map_region_models::LatLng;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use grade::{FloodZone, MarkerColors, grade_label, marker_colors};

/// Danger index at or above which a region is classified [`DangerBand::High`].
pub const HIGH_DANGER_THRESHOLD: f64 = 0.8;

/// Danger index at or above which a region is classified [`DangerBand::Medium`].
pub const MEDIUM_DANGER_THRESHOLD: f64 = 0.5;

/// Aggregated flood statistics for one region.
///
/// Each data field is `None` when its own sub-query failed. `error` is
/// only set when the aggregation could not start at all, in which case
/// every data field is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    /// Flood danger index in `[0, 1]`, higher is more dangerous.
    pub flood_danger_idx: Option<f64>,
    /// Flood danger rank among the province's regions (1 = most dangerous).
    pub flood_danger_rank: Option<u32>,
    /// Number of recorded flood traces in the region.
    pub flood_trace_count: Option<u64>,
    /// Number of weak facilities (grade >= 3 inside a flood zone).
    pub weak_facility_count: Option<u64>,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Error message for a total aggregation failure.
    pub error: Option<String>,
}

impl RegionStats {
    /// Placeholder shown while a fetch is in flight.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// Record for a total aggregation failure: every field empty.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// A row of the per-region flood danger ranking layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodDanger {
    /// Region name as stored in the layer.
    pub region_name: String,
    /// Administrative code as stored in the layer.
    pub region_code: String,
    /// Flood danger index in `[0, 1]`.
    pub danger_index: Option<f64>,
    /// Flood danger rank (1 = most dangerous).
    pub danger_rank: Option<u32>,
}

/// Qualitative band for a flood danger index, ordered from safest.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DangerBand {
    /// Index below 0.5.
    Low,
    /// Index in `[0.5, 0.8)`.
    Medium,
    /// Index of 0.8 or more.
    High,
}

impl DangerBand {
    /// Display label for this band.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Style tag used by the map view for this band.
    #[must_use]
    pub const fn style_tag(self) -> &'static str {
        match self {
            Self::Low => "cs-riskLow",
            Self::Medium => "cs-riskMid",
            Self::High => "cs-riskHigh",
        }
    }
}

/// Display classification of a danger index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DangerLevel {
    /// The band, or `None` when there is no index.
    pub band: Option<DangerBand>,
    /// Display label (`"High"`, `"Medium"`, `"Low"` or `"—"`).
    pub label: &'static str,
    /// Style tag for the view layer.
    pub style_tag: &'static str,
}

/// Label shown when no danger index is available.
pub const NO_DATA_LABEL: &str = "—";

/// Style tag used when no danger index is available.
pub const NO_DATA_STYLE: &str = "cs-statNoData";

/// Classifies a danger index into a [`DangerLevel`].
///
/// Band boundaries are inclusive on the upper band: `0.8` is high and
/// `0.5` is medium.
#[must_use]
pub fn classify(index: Option<f64>) -> DangerLevel {
    let Some(index) = index else {
        return DangerLevel {
            band: None,
            label: NO_DATA_LABEL,
            style_tag: NO_DATA_STYLE,
        };
    };

    let band = if index >= HIGH_DANGER_THRESHOLD {
        DangerBand::High
    } else if index >= MEDIUM_DANGER_THRESHOLD {
        DangerBand::Medium
    } else {
        DangerBand::Low
    };

    DangerLevel {
        band: Some(band),
        label: band.label(),
        style_tag: band.style_tag(),
    }
}

/// A recorded flood trace (past inundation) feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodTraceDetail {
    /// Feature identifier, or `trace-{index}` when the feature has none.
    pub id: String,
    /// Administrative code of the trace.
    pub region_code: String,
    /// Damaged district name.
    pub district_name: Option<String>,
    /// Cause of flooding.
    pub cause_detail: Option<String>,
    /// Flood start date as provided by the source.
    pub start_date: Option<String>,
    /// Flood end date as provided by the source.
    pub end_date: Option<String>,
    /// Flood depth in centimeters.
    pub flood_depth: Option<f64>,
    /// Flooded area in square meters.
    pub flood_area: Option<f64>,
    /// `GeoJSON` geometry type tag, if any.
    pub geometry_type: Option<String>,
    /// Human-readable representative coordinate.
    pub coordinates: Option<String>,
    /// Raw `GeoJSON` geometry as received.
    pub geometry: Option<serde_json::Value>,
    /// Map-plottable position, `None` when the geometry is unusable.
    pub position: Option<LatLng>,
    /// Whether any descriptive attribute is present.
    pub has_detail_info: bool,
    /// All raw feature properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// A flood-vulnerable facility with derived display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakFacilityDetail {
    /// Feature identifier, or `facility-{index}` when the feature has none.
    pub id: String,
    /// Derived facility name.
    pub facility_name: String,
    /// Derived facility type.
    pub facility_type: String,
    /// Floor count and approval date summary.
    pub address: String,
    /// Human-readable representative coordinate.
    pub coordinates: Option<String>,
    /// Raw `GeoJSON` geometry as received.
    pub geometry: Option<serde_json::Value>,
    /// Map-plottable position, `None` when the geometry is unusable.
    pub position: Option<LatLng>,
    /// Flood danger grade, `0` (safe) to `5` (danger).
    pub risk_grade: Option<u8>,
    /// Label for the grade.
    pub risk_level: Option<String>,
    /// Reference year of the grade.
    pub risk_criteria_year: Option<String>,
    /// Reasons this facility is considered vulnerable.
    pub vulnerability_reasons: Vec<String>,
    /// Labels of the flood zones the facility lies in.
    pub flood_zone_info: Vec<String>,
    /// Has at least one basement floor.
    pub has_basement: bool,
    /// Approved for use more than 20 years ago.
    pub is_old_building: bool,
    /// Built with seismic design.
    pub has_earthquake_design: bool,
    /// All raw feature properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl WeakFacilityDetail {
    /// Marker colors for this facility's grade.
    #[must_use]
    pub const fn marker_colors(&self) -> MarkerColors {
        marker_colors(self.risk_grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_band_boundaries() {
        assert_eq!(classify(Some(0.79)).label, "Medium");
        assert_eq!(classify(Some(0.8)).label, "High");
        assert_eq!(classify(Some(0.5)).label, "Medium");
        assert_eq!(classify(Some(0.49)).label, "Low");
        assert_eq!(classify(Some(1.0)).band, Some(DangerBand::High));
        assert_eq!(classify(Some(0.0)).band, Some(DangerBand::Low));
    }

    #[test]
    fn classify_missing_index() {
        let level = classify(None);
        assert_eq!(level.label, "—");
        assert_eq!(level.band, None);
        assert_eq!(level.style_tag, NO_DATA_STYLE);
    }

    #[test]
    fn classify_style_tags() {
        assert_eq!(classify(Some(0.9)).style_tag, "cs-riskHigh");
        assert_eq!(classify(Some(0.6)).style_tag, "cs-riskMid");
        assert_eq!(classify(Some(0.1)).style_tag, "cs-riskLow");
    }

    #[test]
    fn bands_are_ordered() {
        assert!(DangerBand::Low < DangerBand::Medium);
        assert!(DangerBand::Medium < DangerBand::High);
    }

    #[test]
    fn failed_stats_have_no_data() {
        let stats = RegionStats::failed("boom");
        assert_eq!(stats.error.as_deref(), Some("boom"));
        assert!(stats.flood_danger_idx.is_none());
        assert!(stats.flood_danger_rank.is_none());
        assert!(stats.flood_trace_count.is_none());
        assert!(stats.weak_facility_count.is_none());
        assert!(!stats.loading);
    }

    #[test]
    fn stats_serialize_camel_case() {
        let stats = RegionStats {
            flood_danger_idx: Some(0.42),
            ..RegionStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["floodDangerIdx"], 0.42);
        assert!(json["weakFacilityCount"].is_null());
    }
}
