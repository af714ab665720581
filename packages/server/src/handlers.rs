//! HTTP handler functions for the flood map API.

use actix_web::{HttpResponse, web};
use flood_map_recommend::{rank, top};
use flood_map_region_models::{Region, all_regions, resolve, search};
use flood_map_server_models::{
    AddReportRequest, ApiFacilities, ApiHealth, ApiLayer, ApiRecommendation, ApiRecommendations,
    ApiRedeemResult, ApiRegion, ApiRegionMatch, ApiRegionStats, ApiTraces, RegionSearchParams,
};
use flood_map_store::SelectedRegion;
use flood_map_wfs::{
    fetch_facility_details, fetch_region_stats, fetch_trace_details,
    layers::{WMS_LAYERS, wms_url},
};

use crate::AppState;

fn not_found(message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": message.into() }))
}

/// Resolves the `{region}` path segment (slug, code or name).
fn find_region(input: &str) -> Result<&'static Region, HttpResponse> {
    resolve(input).ok_or_else(|| not_found(format!("Unknown region: {input}")))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/regions`
///
/// Lists all 31 cities and counties.
pub async fn regions() -> HttpResponse {
    let regions: Vec<ApiRegion> = all_regions().iter().map(ApiRegion::from).collect();
    HttpResponse::Ok().json(regions)
}

/// `GET /api/regions/search?q=`
///
/// Finds the first region whose name, or one of whose district names,
/// contains the keyword.
pub async fn search_regions(params: web::Query<RegionSearchParams>) -> HttpResponse {
    search(&params.q).map_or_else(
        || not_found(format!("No region matches {:?}", params.q)),
        |found| HttpResponse::Ok().json(ApiRegionMatch::from(found)),
    )
}

/// `GET /api/regions/{region}/stats`
pub async fn region_stats(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let region = match find_region(&path) {
        Ok(region) => region,
        Err(response) => return response,
    };

    let stats = fetch_region_stats(state.source.as_ref(), &region.name, &region.code).await;
    if let Some(error) = &stats.error {
        log::error!("Stats for {} failed: {error}", region.code);
        return HttpResponse::InternalServerError().json(serde_json::json!({ "error": error }));
    }

    HttpResponse::Ok().json(ApiRegionStats::new(region, stats))
}

/// `GET /api/regions/{region}/traces`
pub async fn region_traces(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let region = match find_region(&path) {
        Ok(region) => region,
        Err(response) => return response,
    };

    let traces = fetch_trace_details(state.source.as_ref(), &region.code).await;
    let plottable = traces.iter().filter(|t| t.position.is_some()).count();

    HttpResponse::Ok().json(ApiTraces {
        region_code: region.code.clone(),
        traces,
        plottable,
    })
}

/// `GET /api/regions/{region}/facilities`
///
/// Weak facilities with markers for those that have a usable position.
pub async fn region_facilities(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let region = match find_region(&path) {
        Ok(region) => region,
        Err(response) => return response,
    };

    let facilities = fetch_facility_details(state.source.as_ref(), &region.code).await;
    HttpResponse::Ok().json(ApiFacilities::new(region.code.clone(), facilities))
}

/// `GET /api/regions/{region}/recommendations`
pub async fn recommendations(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let region = match find_region(&path) {
        Ok(region) => region,
        Err(response) => return response,
    };

    let stats = fetch_region_stats(state.source.as_ref(), &region.name, &region.code).await;
    let ranking = rank(&stats);
    let level = ApiRegionStats::new(region, stats).danger_level;

    HttpResponse::Ok().json(ApiRecommendations {
        region_code: region.code.clone(),
        danger_level: level,
        top: top(&ranking).iter().map(|r| r.category).collect(),
        ranking: ranking.into_iter().map(ApiRecommendation::from).collect(),
    })
}

/// `GET /api/layers`
///
/// WMS overlay layers with their `GetMap` base URLs.
pub async fn layers(state: web::Data<AppState>) -> HttpResponse {
    let result: Result<Vec<ApiLayer>, _> = WMS_LAYERS
        .iter()
        .map(|layer| {
            wms_url(&state.config, layer).map(|url| ApiLayer {
                id: layer.id.to_string(),
                name: layer.name.to_string(),
                layer: layer.layer.to_string(),
                url: url.to_string(),
            })
        })
        .collect();

    match result {
        Ok(layers) => HttpResponse::Ok().json(layers),
        Err(e) => {
            log::error!("Layer URL error: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// `GET /api/store`
pub async fn store_state(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.store().state())
}

/// `PUT /api/store/region`
pub async fn set_region(
    state: web::Data<AppState>,
    body: web::Json<SelectedRegion>,
) -> HttpResponse {
    let mut store = state.store();
    store.set_region(body.into_inner());
    HttpResponse::Ok().json(store.state())
}

/// `POST /api/store/reports`
///
/// Records a report in the selected region and awards points.
pub async fn add_report(
    state: web::Data<AppState>,
    body: web::Json<AddReportRequest>,
) -> HttpResponse {
    let AddReportRequest {
        location_text,
        description,
    } = body.into_inner();

    if description.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "description must not be empty" }));
    }

    let mut store = state.store();
    match store.add_report(location_text, description) {
        Some(report) => HttpResponse::Created().json(report),
        None => {
            log::error!("Report was not recorded");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "report was not recorded" }))
        }
    }
}

/// `POST /api/store/rewards/{id}/redeem`
///
/// Answers `redeemed: false` when the balance is too low.
pub async fn redeem_reward(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let reward_id = path.into_inner();
    let mut store = state.store();

    if store.state().reward(&reward_id).is_none() {
        return not_found(format!("Unknown reward: {reward_id}"));
    }

    let redeemed = store.use_reward(&reward_id);
    HttpResponse::Ok().json(ApiRedeemResult {
        redeemed,
        points: store.state().points,
    })
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    use actix_web::{App, test};
    use flood_map_store::{AppStore, KeyValueStorage, MemoryStorage};
    use flood_map_wfs::{
        FeatureCollection, FeatureQuery, FeatureSource, WfsConfig, WfsError,
        layers::{DANGER_RANK_TYPE, FLOOD_TRACE_TYPE, WEAK_FACILITY_TYPE},
    };
    use serde_json::{Value, json};

    use crate::{AppState, configure};

    /// Answers each feature type with a fixed collection.
    #[derive(Default)]
    struct StaticSource {
        responses: BTreeMap<&'static str, Value>,
    }

    #[async_trait::async_trait]
    impl FeatureSource for StaticSource {
        async fn get_feature(&self, query: &FeatureQuery) -> Result<FeatureCollection, WfsError> {
            let value = self
                .responses
                .get(query.type_name.as_str())
                .cloned()
                .unwrap_or_else(|| json!({ "features": [] }));
            Ok(serde_json::from_value(value)?)
        }
    }

    fn flood_source() -> StaticSource {
        StaticSource {
            responses: BTreeMap::from([
                (
                    DANGER_RANK_TYPE,
                    json!({ "features": [{ "properties": {
                        "sigun_nm": "수원시", "sigun_cd": "41110",
                        "flod_dngr_idx": 0.85, "flod_dng_rnk": 2
                    }}]}),
                ),
                (
                    FLOOD_TRACE_TYPE,
                    json!({ "features": [
                        { "id": "t1", "geometry": { "type": "Point", "coordinates": [127.01, 37.26] }, "properties": {} },
                        { "id": "t2", "geometry": null, "properties": {} },
                        { "id": "t3", "geometry": null, "properties": {} }
                    ]}),
                ),
                (
                    WEAK_FACILITY_TYPE,
                    json!({ "totalFeatures": 12, "features": [
                        { "id": "f1",
                          "geometry": { "type": "Point", "coordinates": [127.02, 37.27] },
                          "properties": { "bldg_nm": "Hall", "flod_dngr_grd": 5 } },
                        { "id": "f2", "geometry": null, "properties": { "flod_dngr_grd": 3 } }
                    ]}),
                ),
            ]),
        }
    }

    fn state(source: StaticSource) -> actix_web::web::Data<AppState> {
        let storage: Box<dyn KeyValueStorage> = Box::new(MemoryStorage::new());
        actix_web::web::Data::new(AppState {
            source: Arc::new(source),
            store: Mutex::new(AppStore::open(storage)),
            config: WfsConfig::from_lookup(|key| {
                (key == "GG_API_KEY").then(|| "secret".to_string())
            }),
        })
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = app!(state(StaticSource::default()));
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn lists_all_regions() {
        let app = app!(state(StaticSource::default()));
        let req = test::TestRequest::get().uri("/api/regions").to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 31);
    }

    #[actix_web::test]
    async fn search_misses_are_not_found() {
        let app = app!(state(StaticSource::default()));
        let req = test::TestRequest::get()
            .uri("/api/regions/search?q=nowhere")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn stats_are_merged_and_classified() {
        let app = app!(state(flood_source()));
        let req = test::TestRequest::get()
            .uri("/api/regions/41110/stats")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["regionName"], "수원시");
        assert_eq!(body["stats"]["floodDangerIdx"], 0.85);
        assert_eq!(body["stats"]["floodDangerRank"], 2);
        assert_eq!(body["stats"]["floodTraceCount"], 3);
        assert_eq!(body["stats"]["weakFacilityCount"], 12);
        assert_eq!(body["dangerLevel"]["label"], "High");
    }

    #[actix_web::test]
    async fn unknown_region_is_not_found() {
        let app = app!(state(flood_source()));
        let req = test::TestRequest::get()
            .uri("/api/regions/99999/stats")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn traces_count_plottable_positions() {
        let app = app!(state(flood_source()));
        let req = test::TestRequest::get()
            .uri("/api/regions/suwon/traces")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["traces"].as_array().unwrap().len(), 3);
        assert_eq!(body["plottable"], 1);
    }

    #[actix_web::test]
    async fn facilities_carry_markers_for_positioned_entries() {
        let app = app!(state(flood_source()));
        let req = test::TestRequest::get()
            .uri("/api/regions/41110/facilities")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["facilities"].as_array().unwrap().len(), 2);
        let markers = body["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0]["id"], "f1");
        assert_eq!(markers[0]["riskGrade"], 5);
    }

    #[actix_web::test]
    async fn recommendations_rank_building_first_for_many_facilities() {
        let app = app!(state(flood_source()));
        let req = test::TestRequest::get()
            .uri("/api/regions/41110/recommendations")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let ranking = body["ranking"].as_array().unwrap();
        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking[0]["isPriority"], true);
        assert_eq!(ranking[1]["isPriority"], false);
        assert_eq!(body["top"].as_array().unwrap().len(), 3);
        assert!(ranking[0]["card"]["title"].is_string());
    }

    #[actix_web::test]
    async fn layers_include_api_key() {
        let app = app!(state(StaticSource::default()));
        let req = test::TestRequest::get().uri("/api/layers").to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.len(), 3);
        let url = body[0]["url"].as_str().unwrap();
        assert!(url.contains("apiKey=secret"));
        assert!(url.contains("transparent=true"));
    }

    #[actix_web::test]
    async fn reports_award_points_and_rewards_spend_them() {
        let app = app!(state(StaticSource::default()));

        for _ in 0..80 {
            let req = test::TestRequest::post()
                .uri("/api/store/reports")
                .set_json(json!({ "locationText": "Main St", "description": "Drain blocked" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 201);
        }

        let req = test::TestRequest::post()
            .uri("/api/store/rewards/gs25/redeem")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["redeemed"], true);
        assert_eq!(body["points"], 0);

        let req = test::TestRequest::post()
            .uri("/api/store/rewards/gs25/redeem")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["redeemed"], false);
    }

    #[actix_web::test]
    async fn unknown_reward_is_not_found() {
        let app = app!(state(StaticSource::default()));
        let req = test::TestRequest::post()
            .uri("/api/store/rewards/nope/redeem")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn empty_report_is_rejected() {
        let app = app!(state(StaticSource::default()));
        let req = test::TestRequest::post()
            .uri("/api/store/reports")
            .set_json(json!({ "locationText": "x", "description": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn region_selection_is_stored() {
        let app = app!(state(StaticSource::default()));
        let req = test::TestRequest::put()
            .uri("/api/store/region")
            .set_json(json!({ "sido": "경기도", "sigungu": "성남시" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["region"]["sigungu"], "성남시");

        let req = test::TestRequest::get().uri("/api/store").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["region"]["sigungu"], "성남시");
    }
}
