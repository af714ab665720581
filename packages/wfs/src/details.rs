//! Per-region detail lists for map markers.
//!
//! Both fetchers are bounded to [`DETAIL_LIMIT`] features and never fail:
//! a query error is logged and yields an empty list. Derivation of the
//! display fields is pure and lives in [`trace_from_feature`] and
//! [`facility_from_feature`].

use flood_map_flood_models::{FloodTraceDetail, FloodZone, WeakFacilityDetail, grade_label};
use flood_map_geometry::{extract_position, format_coordinates, geometry_type};
use serde_json::Value;

use crate::{
    FeatureCollection, FeatureQuery, FeatureSource, cql,
    layers::{FLOOD_TRACE_TYPE, WEAK_FACILITY_TYPE},
    props::{self, Properties, f64_prop, feature_id, flag_prop, int_prop, str_prop},
};

/// Maximum number of features fetched per detail list.
pub const DETAIL_LIMIT: u32 = 500;

const UNCLASSIFIED_TYPE: &str = "Unclassified";
const NO_ADDRESS: &str = "Details not provided";

/// Fetches the recorded flood traces of a region.
pub async fn fetch_trace_details<S: FeatureSource + ?Sized>(
    source: &S,
    region_code: &str,
) -> Vec<FloodTraceDetail> {
    let collection = match fetch(source, FLOOD_TRACE_TYPE, region_code, cql::trace_filter).await {
        Ok(collection) => collection,
        Err(e) => {
            log::error!("Flood trace details failed for {region_code}: {e}");
            return Vec::new();
        }
    };

    log_first_feature("Flood trace", &collection);

    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| trace_from_feature(index, feature))
        .collect()
}

/// Fetches the weak facilities of a region.
pub async fn fetch_facility_details<S: FeatureSource + ?Sized>(
    source: &S,
    region_code: &str,
) -> Vec<WeakFacilityDetail> {
    let collection = match fetch(
        source,
        WEAK_FACILITY_TYPE,
        region_code,
        cql::weak_facility_filter,
    )
    .await
    {
        Ok(collection) => collection,
        Err(e) => {
            log::error!("Weak facility details failed for {region_code}: {e}");
            return Vec::new();
        }
    };

    log_first_feature("Weak facility", &collection);

    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| facility_from_feature(index, feature))
        .collect()
}

async fn fetch<S: FeatureSource + ?Sized>(
    source: &S,
    type_name: &str,
    region_code: &str,
    filter: fn(&str) -> Result<String, crate::WfsError>,
) -> Result<FeatureCollection, crate::WfsError> {
    let query = FeatureQuery::new(type_name)
        .filter(filter(region_code)?)
        .max_features(DETAIL_LIMIT);
    source.get_feature(&query).await
}

fn log_first_feature(label: &str, collection: &FeatureCollection) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    if let Some(first) = collection.features.first() {
        let props = props::properties(first);
        log::debug!(
            "{label} features: {} (first has geometry: {}), attributes: {:?}",
            collection.features.len(),
            first.get("geometry").is_some_and(|g| !g.is_null()),
            props.keys().collect::<Vec<_>>()
        );
    }
}

fn geometry_of(feature: &Value) -> Option<Value> {
    feature.get("geometry").filter(|g| !g.is_null()).cloned()
}

/// Builds a trace record from a raw feature at position `index`.
#[must_use]
pub fn trace_from_feature(index: usize, feature: &Value) -> FloodTraceDetail {
    let props = props::properties(feature);
    let geometry = geometry_of(feature);

    let district_name = str_prop(&props, "fldn_dstr_nm");
    let cause_detail = str_prop(&props, "fldn_cs_dtl_expln");
    let start_date = str_prop(&props, "fldn_bgng_ymd");
    let flood_depth = f64_prop(&props, "fldn_dowa");

    let has_detail_info = district_name.is_some()
        || cause_detail.is_some()
        || start_date.is_some()
        || flood_depth.is_some_and(|d| d != 0.0);

    FloodTraceDetail {
        id: feature_id(feature, || format!("trace-{index}")),
        region_code: str_prop(&props, "stdg_sgg_cd").unwrap_or_default(),
        district_name,
        cause_detail,
        start_date,
        end_date: str_prop(&props, "fldn_end_ymd"),
        flood_depth,
        flood_area: f64_prop(&props, "fldn_area"),
        geometry_type: geometry.as_ref().and_then(geometry_type).map(str::to_string),
        coordinates: geometry.as_ref().and_then(format_coordinates),
        position: geometry.as_ref().and_then(extract_position),
        geometry,
        has_detail_info,
        properties: props,
    }
}

/// Builds a facility record from a raw feature at position `index`.
///
/// Every rule is evaluated independently; missing attributes only affect
/// the fields derived from them.
#[must_use]
pub fn facility_from_feature(index: usize, feature: &Value) -> WeakFacilityDetail {
    let props = props::properties(feature);
    let geometry = geometry_of(feature);

    let grade = int_prop(&props, "flod_dngr_grd");
    let basement_floors = int_prop(&props, "udgd_nofl")
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n >= 1);
    let (vulnerability_reasons, flood_zone_info) = flood_zone_reasons(&props, basement_floors);

    WeakFacilityDetail {
        id: feature_id(feature, || format!("facility-{index}")),
        facility_name: facility_name(&props, index),
        facility_type: str_prop(&props, "bdrg_knd_nm")
            .or_else(|| str_prop(&props, "main_usg_nm"))
            .unwrap_or_else(|| UNCLASSIFIED_TYPE.to_string()),
        address: floor_summary(&props),
        coordinates: geometry.as_ref().and_then(format_coordinates),
        position: geometry.as_ref().and_then(extract_position),
        geometry,
        risk_grade: grade.and_then(|g| u8::try_from(g).ok()).filter(|g| *g <= 5),
        risk_level: grade.map(grade_label),
        risk_criteria_year: str_prop(&props, "flod_dngr_crtr_yr"),
        vulnerability_reasons,
        flood_zone_info,
        has_basement: basement_floors.is_some(),
        is_old_building: flag_prop(&props, "use_aprv_day_20yr_ovr_yn"),
        has_earthquake_design: flag_prop(&props, "etrs_design_yn"),
        properties: props,
    }
}

fn facility_name(props: &Properties, index: usize) -> String {
    let building = str_prop(props, "bldg_nm");
    let detail = str_prop(props, "bldg_dtl_nm");

    match (building, detail) {
        (Some(building), Some(detail)) if building != detail => format!("{building} ({detail})"),
        (Some(building), _) => building,
        (None, Some(detail)) => detail,
        (None, None) => str_prop(props, "main_usg_nm")
            .unwrap_or_else(|| format!("Facility {}", index + 1)),
    }
}

fn floor_summary(props: &Properties) -> String {
    let floors = [
        ("Ground", int_prop(props, "grnd_nofl")),
        ("Basement", int_prop(props, "udgd_nofl")),
    ]
    .into_iter()
    .filter_map(|(label, n)| n.filter(|n| *n != 0).map(|n| format!("{label} {n} floors")))
    .collect::<Vec<_>>()
    .join(", ");

    match (floors.is_empty(), str_prop(props, "use_aprv_ymd")) {
        (true, None) => NO_ADDRESS.to_string(),
        (false, None) => floors,
        (true, Some(date)) => format!("Approved: {date}"),
        (false, Some(date)) => format!("{floors} (approved: {date})"),
    }
}

/// One reason and one zone label per flagged zone. Only the first flagged
/// zone carries the basement floor count.
fn flood_zone_reasons(props: &Properties, basement_floors: Option<u32>) -> (Vec<String>, Vec<String>) {
    let mut reasons = Vec::new();
    let mut labels = Vec::new();
    let mut basement = basement_floors;

    for zone in FloodZone::all() {
        if !flag_prop(props, zone.attribute()) {
            continue;
        }
        labels.push(zone.label().to_string());
        reasons.push(match basement.take() {
            Some(floors) => zone.reason_with_basement(floors),
            None => zone.reason().to_string(),
        });
    }

    (reasons, labels)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::MockSource;

    fn facility(props: Value) -> Value {
        json!({
            "type": "Feature",
            "id": "flod_weak_fclt.1",
            "geometry": { "type": "Point", "coordinates": [127.0286, 37.2636] },
            "properties": props
        })
    }

    #[test]
    fn basement_enriches_only_first_flagged_zone() {
        let detail = facility_from_feature(
            0,
            &facility(json!({
                "flod_dngr_grd": 4,
                "ntn_rvr_yr200_freq_rnfl_fldn_yn": "Y",
                "lcl_rvr_yr100_freq_rnfl_fldn_yn": "Y",
                "udgd_nofl": 2
            })),
        );

        assert_eq!(
            detail.vulnerability_reasons,
            vec![
                "National river flood expected (basement 2 floors)".to_string(),
                "Local river flood zone".to_string(),
            ]
        );
        assert_eq!(
            detail.flood_zone_info,
            vec!["National river flood".to_string(), "Local river flood".to_string()]
        );
        assert!(detail.has_basement);
        assert_eq!(detail.risk_grade, Some(4));
        assert_eq!(detail.risk_level.as_deref(), Some("Alert"));
    }

    #[test]
    fn basement_goes_to_urban_when_only_zone() {
        let detail = facility_from_feature(
            0,
            &facility(json!({ "cty_fldn_yr100_freq_rnfl_fldn_yn": "Y", "udgd_nofl": "1" })),
        );
        assert_eq!(
            detail.vulnerability_reasons,
            vec!["Urban flood expected (basement 1 floors)".to_string()]
        );
    }

    #[test]
    fn basement_alone_gives_no_reason() {
        let detail = facility_from_feature(0, &facility(json!({ "udgd_nofl": 3 })));
        assert!(detail.vulnerability_reasons.is_empty());
        assert!(detail.flood_zone_info.is_empty());
        assert!(detail.has_basement);
    }

    #[test]
    fn name_combines_building_and_detail() {
        let detail = facility_from_feature(
            0,
            &facility(json!({ "bldg_nm": "Hall", "bldg_dtl_nm": "Annex" })),
        );
        assert_eq!(detail.facility_name, "Hall (Annex)");

        let same = facility_from_feature(
            0,
            &facility(json!({ "bldg_nm": "Hall", "bldg_dtl_nm": "Hall" })),
        );
        assert_eq!(same.facility_name, "Hall");
    }

    #[test]
    fn name_and_type_fallbacks() {
        let usage = facility_from_feature(0, &facility(json!({ "main_usg_nm": "Retail" })));
        assert_eq!(usage.facility_name, "Retail");
        assert_eq!(usage.facility_type, "Retail");

        let bare = facility_from_feature(4, &json!({ "properties": {} }));
        assert_eq!(bare.facility_name, "Facility 5");
        assert_eq!(bare.facility_type, "Unclassified");
        assert_eq!(bare.id, "facility-4");
        assert_eq!(bare.address, "Details not provided");
        assert_eq!(bare.risk_grade, None);
        assert_eq!(bare.risk_level, None);
        assert!(bare.position.is_none());
    }

    #[test]
    fn address_summarizes_floors_and_approval() {
        let full = facility_from_feature(
            0,
            &facility(json!({ "grnd_nofl": 5, "udgd_nofl": 1, "use_aprv_ymd": "19980312" })),
        );
        assert_eq!(full.address, "Ground 5 floors, Basement 1 floors (approved: 19980312)");

        let date_only = facility_from_feature(0, &facility(json!({ "use_aprv_ymd": "2001" })));
        assert_eq!(date_only.address, "Approved: 2001");

        let ground_only = facility_from_feature(0, &facility(json!({ "grnd_nofl": "3" })));
        assert_eq!(ground_only.address, "Ground 3 floors");
    }

    #[test]
    fn unknown_grade_gets_fallback_label() {
        let detail = facility_from_feature(0, &facility(json!({ "flod_dngr_grd": "7" })));
        assert_eq!(detail.risk_grade, None);
        assert_eq!(detail.risk_level.as_deref(), Some("Grade 7"));
    }

    #[test]
    fn facility_flags_and_position() {
        let detail = facility_from_feature(
            0,
            &facility(json!({
                "use_aprv_day_20yr_ovr_yn": "Y",
                "etrs_design_yn": "N",
                "flod_dngr_crtr_yr": "2023"
            })),
        );
        assert!(detail.is_old_building);
        assert!(!detail.has_earthquake_design);
        assert_eq!(detail.risk_criteria_year.as_deref(), Some("2023"));
        assert_eq!(detail.coordinates.as_deref(), Some("37.26360, 127.02860"));
        assert!(detail.position.is_some());
        assert_eq!(detail.id, "flod_weak_fclt.1");
    }

    #[test]
    fn trace_fields_and_detail_flag() {
        let trace = trace_from_feature(
            2,
            &json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[127.0, 37.5], [127.1, 37.5], [127.1, 37.6], [127.0, 37.5]]]
                },
                "properties": {
                    "stdg_sgg_cd": "41110",
                    "fldn_dstr_nm": "Jangan",
                    "fldn_dowa": "30",
                    "fldn_area": 1200.5
                }
            }),
        );
        assert_eq!(trace.id, "trace-2");
        assert_eq!(trace.region_code, "41110");
        assert_eq!(trace.district_name.as_deref(), Some("Jangan"));
        assert_eq!(trace.flood_depth, Some(30.0));
        assert_eq!(trace.flood_area, Some(1200.5));
        assert_eq!(trace.geometry_type.as_deref(), Some("Polygon"));
        assert_eq!(trace.coordinates.as_deref(), Some("37.50000, 127.00000 (polygon)"));
        assert!(trace.has_detail_info);
    }

    #[test]
    fn zero_depth_alone_is_not_detail_info() {
        let trace = trace_from_feature(0, &json!({ "properties": { "fldn_dowa": 0 } }));
        assert!(!trace.has_detail_info);
        assert!(trace.geometry.is_none());
        assert!(trace.position.is_none());
    }

    #[tokio::test]
    async fn fetch_errors_yield_empty_lists() {
        let source = MockSource::new()
            .fail(FLOOD_TRACE_TYPE, 500)
            .fail(WEAK_FACILITY_TYPE, 500);

        assert!(fetch_trace_details(&source, "41110").await.is_empty());
        assert!(fetch_facility_details(&source, "41110").await.is_empty());
    }

    #[tokio::test]
    async fn fetches_are_bounded_and_mapped() {
        let source = MockSource::new().respond(
            WEAK_FACILITY_TYPE,
            json!({ "features": [facility(json!({ "bldg_nm": "A" })), facility(json!({}))] }),
        );

        let details = fetch_facility_details(&source, "4111010100").await;

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].facility_name, "A");
        let query = &source.queries()[0];
        assert_eq!(query.max_features, Some(DETAIL_LIMIT));
        assert!(query.cql_filter.as_deref().unwrap().starts_with("sigun_cd LIKE '41110%'"));
    }

    #[tokio::test]
    async fn invalid_code_yields_empty_list_without_query() {
        let source = MockSource::new();
        assert!(fetch_trace_details(&source, "abc").await.is_empty());
        assert!(source.queries().is_empty());
    }
}
