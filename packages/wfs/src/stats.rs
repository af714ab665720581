//! Region statistics aggregation.
//!
//! Three independent queries run concurrently per region. Each one fills
//! its own field of [`RegionStats`]; a failed query leaves its field empty
//! and never affects the others. Only invalid input, detected before any
//! query is sent, fails the whole record.

use flood_map_flood_models::{FloodDanger, RegionStats};

use crate::{
    FeatureQuery, FeatureSource, WfsError, cql,
    layers::{DANGER_RANK_TYPE, FLOOD_TRACE_TYPE, WEAK_FACILITY_TYPE},
    props::{self, f64_prop, int_prop, str_prop},
};

/// Attributes requested from the danger-rank layer.
const DANGER_PROPERTIES: &str = "sigun_nm,sigun_cd,flod_dngr_idx,flod_dng_rnk";

/// Looks up the danger index and rank for a region by fuzzy name match.
///
/// Returns `Ok(None)` when no row matches.
///
/// # Errors
///
/// Returns [`WfsError`] if the name is invalid or the query fails.
pub async fn fetch_flood_danger<S: FeatureSource + ?Sized>(
    source: &S,
    region_name: &str,
) -> Result<Option<FloodDanger>, WfsError> {
    let query = FeatureQuery::new(DANGER_RANK_TYPE)
        .properties(DANGER_PROPERTIES)
        .filter(cql::danger_name_filter(region_name)?)
        .max_features(1);

    let collection = source.get_feature(&query).await?;
    let Some(feature) = collection.features.first() else {
        log::debug!("No danger rank row for {region_name}");
        return Ok(None);
    };

    let props = props::properties(feature);
    Ok(Some(FloodDanger {
        region_name: str_prop(&props, "sigun_nm").unwrap_or_default(),
        region_code: str_prop(&props, "sigun_cd").unwrap_or_default(),
        danger_index: f64_prop(&props, "flod_dngr_idx"),
        danger_rank: int_prop(&props, "flod_dng_rnk").and_then(|r| u32::try_from(r).ok()),
    }))
}

/// Counts recorded flood traces whose code starts with the region prefix.
///
/// # Errors
///
/// Returns [`WfsError`] if the code is invalid or the query fails.
pub async fn fetch_flood_trace_count<S: FeatureSource + ?Sized>(
    source: &S,
    region_code: &str,
) -> Result<u64, WfsError> {
    let query = FeatureQuery::new(FLOOD_TRACE_TYPE)
        .properties("stdg_sgg_cd")
        .filter(cql::trace_filter(region_code)?);

    let collection = source.get_feature(&query).await?;
    Ok(collection.features.len() as u64)
}

/// Counts weak facilities in the region.
///
/// Only one feature is transferred; the count comes from `totalFeatures`.
///
/// # Errors
///
/// Returns [`WfsError`] if the code is invalid or the query fails.
pub async fn fetch_weak_facility_count<S: FeatureSource + ?Sized>(
    source: &S,
    region_code: &str,
) -> Result<u64, WfsError> {
    let query = FeatureQuery::new(WEAK_FACILITY_TYPE)
        .properties("sigun_cd")
        .filter(cql::weak_facility_filter(region_code)?)
        .max_features(1);

    Ok(source.get_feature(&query).await?.total())
}

/// Fetches and merges the three statistics for a region.
///
/// Never fails: sub-query errors are logged and leave their field `None`.
/// Invalid input yields [`RegionStats::failed`] without any query sent.
pub async fn fetch_region_stats<S: FeatureSource + ?Sized>(
    source: &S,
    region_name: &str,
    region_code: &str,
) -> RegionStats {
    if let Err(e) = cql::region_name_stem(region_name)
        .and_then(|_| cql::region_code_prefix(region_code))
    {
        log::error!("Cannot fetch stats for {region_name} ({region_code}): {e}");
        return RegionStats::failed(e.to_string());
    }

    log::info!("Fetching flood stats for {region_name} ({region_code})");

    let (danger, traces, facilities) = tokio::join!(
        fetch_flood_danger(source, region_name),
        fetch_flood_trace_count(source, region_code),
        fetch_weak_facility_count(source, region_code),
    );

    let danger = danger
        .inspect_err(|e| log::error!("Flood danger lookup failed for {region_name}: {e}"))
        .ok()
        .flatten();
    let flood_trace_count = traces
        .inspect_err(|e| log::error!("Flood trace count failed for {region_code}: {e}"))
        .ok();
    let weak_facility_count = facilities
        .inspect_err(|e| log::error!("Weak facility count failed for {region_code}: {e}"))
        .ok();

    RegionStats {
        flood_danger_idx: danger.as_ref().and_then(|d| d.danger_index),
        flood_danger_rank: danger.as_ref().and_then(|d| d.danger_rank),
        flood_trace_count,
        weak_facility_count,
        loading: false,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::MockSource;

    fn danger_row() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "sigun_nm": "수원시",
                    "sigun_cd": "41110",
                    "flod_dngr_idx": 0.83,
                    "flod_dng_rnk": "4"
                }
            }]
        })
    }

    fn features(n: usize) -> serde_json::Value {
        json!({ "features": vec![json!({ "type": "Feature", "properties": {} }); n] })
    }

    #[tokio::test]
    async fn merges_all_three_queries() {
        let source = MockSource::new()
            .respond(DANGER_RANK_TYPE, danger_row())
            .respond(FLOOD_TRACE_TYPE, features(7))
            .respond(
                WEAK_FACILITY_TYPE,
                json!({ "totalFeatures": 12, "features": [{}] }),
            );

        let stats = fetch_region_stats(&source, "수원시", "41110").await;

        assert_eq!(stats.flood_danger_idx, Some(0.83));
        assert_eq!(stats.flood_danger_rank, Some(4));
        assert_eq!(stats.flood_trace_count, Some(7));
        assert_eq!(stats.weak_facility_count, Some(12));
        assert!(!stats.loading);
        assert!(stats.error.is_none());
    }

    #[tokio::test]
    async fn failed_danger_query_leaves_other_fields() {
        let source = MockSource::new()
            .fail(DANGER_RANK_TYPE, 500)
            .respond(FLOOD_TRACE_TYPE, features(3))
            .respond(WEAK_FACILITY_TYPE, features(2));

        let stats = fetch_region_stats(&source, "수원시", "41110").await;

        assert_eq!(stats.flood_danger_idx, None);
        assert_eq!(stats.flood_danger_rank, None);
        assert_eq!(stats.flood_trace_count, Some(3));
        assert_eq!(stats.weak_facility_count, Some(2));
        assert!(stats.error.is_none());
    }

    #[tokio::test]
    async fn failed_count_queries_are_isolated() {
        let source = MockSource::new()
            .respond(DANGER_RANK_TYPE, danger_row())
            .fail(FLOOD_TRACE_TYPE, 503)
            .fail(WEAK_FACILITY_TYPE, 404);

        let stats = fetch_region_stats(&source, "수원시", "41110").await;

        assert_eq!(stats.flood_danger_idx, Some(0.83));
        assert_eq!(stats.flood_trace_count, None);
        assert_eq!(stats.weak_facility_count, None);
        assert!(stats.error.is_none());
    }

    #[tokio::test]
    async fn invalid_code_fails_before_any_query() {
        let source = MockSource::new().respond(DANGER_RANK_TYPE, danger_row());

        let stats = fetch_region_stats(&source, "수원시", "41' OR 1=1").await;

        assert!(stats.error.is_some());
        assert_eq!(stats.flood_danger_idx, None);
        assert_eq!(stats.flood_trace_count, None);
        assert!(source.queries().is_empty());
    }

    #[tokio::test]
    async fn missing_danger_row_is_absent_not_error() {
        let source = MockSource::new();

        let stats = fetch_region_stats(&source, "가평군", "41820").await;

        assert_eq!(stats.flood_danger_idx, None);
        assert_eq!(stats.flood_trace_count, Some(0));
        assert_eq!(stats.weak_facility_count, Some(0));
        assert!(stats.error.is_none());
    }

    #[tokio::test]
    async fn queries_use_expected_filters() {
        let source = MockSource::new();

        fetch_region_stats(&source, "수원시", "41110").await;

        let queries = source.queries();
        assert_eq!(queries.len(), 3);

        let danger = queries.iter().find(|q| q.type_name == DANGER_RANK_TYPE).unwrap();
        assert_eq!(danger.cql_filter.as_deref(), Some("sigun_nm LIKE '%수원%'"));
        assert_eq!(danger.max_features, Some(1));

        let traces = queries.iter().find(|q| q.type_name == FLOOD_TRACE_TYPE).unwrap();
        assert_eq!(traces.cql_filter.as_deref(), Some("stdg_sgg_cd LIKE '41110%'"));
        assert_eq!(traces.max_features, None);

        let facilities = queries
            .iter()
            .find(|q| q.type_name == WEAK_FACILITY_TYPE)
            .unwrap();
        assert_eq!(facilities.max_features, Some(1));
    }

    #[tokio::test]
    async fn reselecting_a_region_queries_again() {
        let source = MockSource::new()
            .respond(DANGER_RANK_TYPE, danger_row())
            .respond(FLOOD_TRACE_TYPE, features(1));

        let first = fetch_region_stats(&source, "수원시", "41110").await;
        source.replace(FLOOD_TRACE_TYPE, features(3));
        let second = fetch_region_stats(&source, "수원시", "41110").await;

        assert_eq!(source.queries().len(), 6);
        assert_eq!(first.flood_trace_count, Some(1));
        assert_eq!(second.flood_trace_count, Some(3));
        assert_eq!(second.flood_danger_idx, Some(0.83));
    }
}
