#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the flood map server.
//!
//! These types define the JSON contract between the Actix-Web backend and
//! the map frontend. Field names are camelCase on the wire.

use flood_map_flood_models::{
    DangerLevel, FloodTraceDetail, MarkerColors, RegionStats, WeakFacilityDetail, classify,
};
use flood_map_recommend::{RankedSolution, SolutionCard, SolutionCategory};
use flood_map_region_models::{District, LatLng, Region, RegionMatch};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// A region as listed by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegion {
    pub id: String,
    pub name: String,
    pub code: String,
    pub center: LatLng,
    pub districts: Vec<District>,
}

impl From<&Region> for ApiRegion {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id.clone(),
            name: region.name.clone(),
            code: region.code.clone(),
            center: region.center,
            districts: region.districts.clone(),
        }
    }
}

/// Query parameters for `GET /api/regions/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionSearchParams {
    /// Region or district keyword.
    pub q: String,
}

/// A keyword search hit with the viewport to fly to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegionMatch {
    pub region: ApiRegion,
    /// Set when the keyword matched a district rather than the region.
    pub district: Option<District>,
    pub center: LatLng,
    pub zoom: u8,
}

impl From<RegionMatch> for ApiRegionMatch {
    fn from(found: RegionMatch) -> Self {
        let (center, zoom) = found.viewport();
        Self {
            region: found.region.into(),
            district: found.district.cloned(),
            center,
            zoom,
        }
    }
}

/// Region statistics with the classified danger level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegionStats {
    pub region_code: String,
    pub region_name: String,
    pub stats: RegionStats,
    pub danger_level: DangerLevel,
}

impl ApiRegionStats {
    #[must_use]
    pub fn new(region: &Region, stats: RegionStats) -> Self {
        Self {
            region_code: region.code.clone(),
            region_name: region.name.clone(),
            danger_level: classify(stats.flood_danger_idx),
            stats,
        }
    }
}

/// Flood traces of a region.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTraces {
    pub region_code: String,
    pub traces: Vec<FloodTraceDetail>,
    /// Number of traces with a map-plottable position.
    pub plottable: usize,
}

/// A facility marker ready for the map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFacilityMarker {
    pub id: String,
    pub facility_name: String,
    pub position: LatLng,
    pub risk_grade: Option<u8>,
    pub colors: MarkerColors,
}

impl ApiFacilityMarker {
    /// Marker for `facility`, or `None` when it has no usable position.
    #[must_use]
    pub fn for_facility(facility: &WeakFacilityDetail) -> Option<Self> {
        Some(Self {
            id: facility.id.clone(),
            facility_name: facility.facility_name.clone(),
            position: facility.position?,
            risk_grade: facility.risk_grade,
            colors: facility.marker_colors(),
        })
    }
}

/// Weak facilities of a region and their plottable markers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFacilities {
    pub region_code: String,
    pub facilities: Vec<WeakFacilityDetail>,
    pub markers: Vec<ApiFacilityMarker>,
}

impl ApiFacilities {
    #[must_use]
    pub fn new(region_code: impl Into<String>, facilities: Vec<WeakFacilityDetail>) -> Self {
        let markers = facilities
            .iter()
            .filter_map(ApiFacilityMarker::for_facility)
            .collect();
        Self {
            region_code: region_code.into(),
            facilities,
            markers,
        }
    }
}

/// A ranked solution category with its card.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecommendation {
    pub category: SolutionCategory,
    pub score: u32,
    pub is_priority: bool,
    pub card: &'static SolutionCard,
}

impl From<RankedSolution> for ApiRecommendation {
    fn from(ranked: RankedSolution) -> Self {
        Self {
            category: ranked.category,
            score: ranked.score,
            is_priority: ranked.is_priority,
            card: ranked.card(),
        }
    }
}

/// Solution ranking for a region.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecommendations {
    pub region_code: String,
    pub danger_level: DangerLevel,
    /// Every category, best first.
    pub ranking: Vec<ApiRecommendation>,
    /// Categories of the top three entries.
    pub top: Vec<SolutionCategory>,
}

/// A WMS overlay layer with a ready-to-use `GetMap` URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLayer {
    pub id: String,
    pub name: String,
    pub layer: String,
    pub url: String,
}

/// Body of `POST /api/store/reports`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReportRequest {
    pub location_text: String,
    pub description: String,
}

/// Result of `POST /api/store/rewards/{id}/redeem`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRedeemResult {
    pub redeemed: bool,
    /// Balance after the attempt.
    pub points: u64,
}

#[cfg(test)]
mod tests {
    use flood_map_region_models::by_id;

    use super::*;

    fn facility(position: Option<LatLng>, grade: Option<u8>) -> WeakFacilityDetail {
        WeakFacilityDetail {
            id: "f1".to_string(),
            facility_name: "Hall".to_string(),
            facility_type: "Office".to_string(),
            address: "Details not provided".to_string(),
            coordinates: None,
            geometry: None,
            position,
            risk_grade: grade,
            risk_level: None,
            risk_criteria_year: None,
            vulnerability_reasons: Vec::new(),
            flood_zone_info: Vec::new(),
            has_basement: false,
            is_old_building: false,
            has_earthquake_design: false,
            properties: serde_json::Map::new(),
        }
    }

    #[test]
    fn facilities_without_position_get_no_marker() {
        let response = ApiFacilities::new(
            "41110",
            vec![
                facility(Some(LatLng::new(37.3, 127.0)), Some(5)),
                facility(None, Some(4)),
            ],
        );
        assert_eq!(response.facilities.len(), 2);
        assert_eq!(response.markers.len(), 1);
        assert_eq!(
            response.markers[0].colors,
            flood_map_flood_models::marker_colors(Some(5))
        );
    }

    #[test]
    fn region_stats_are_classified() {
        let region = by_id("suwon").unwrap();
        let stats = RegionStats {
            flood_danger_idx: Some(0.8),
            ..RegionStats::default()
        };
        let json = serde_json::to_value(ApiRegionStats::new(region, stats)).unwrap();
        assert_eq!(json["regionCode"], "41110");
        assert_eq!(json["dangerLevel"]["label"], "High");
        assert_eq!(json["stats"]["floodDangerIdx"], 0.8);
    }

    #[test]
    fn add_report_request_uses_camel_case() {
        let body: AddReportRequest = serde_json::from_str(
            r#"{"locationText":"Main St","description":"Drain blocked"}"#,
        )
        .unwrap();
        assert_eq!(body.location_text, "Main St");
    }
}
