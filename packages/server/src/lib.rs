#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the flood map application.
//!
//! Serves region statistics, flood trace and weak facility details and
//! solution recommendations pulled live from the Gyeonggi climate
//! platform's WFS endpoint, the WMS overlay catalog, and the locally
//! persisted app store (selected region, reports, points and rewards).

mod handlers;
pub mod interactive;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use flood_map_store::{AppStore, FileStorage, KeyValueStorage, data_dir_from_env};
use flood_map_wfs::{FeatureSource, WfsClient, WfsConfig};

/// Shared application state.
pub struct AppState {
    /// Feature source for all WFS lookups.
    pub source: Arc<dyn FeatureSource>,
    /// Persisted app store.
    pub store: Mutex<AppStore<Box<dyn KeyValueStorage>>>,
    /// Platform endpoints, used to build WMS layer URLs.
    pub config: WfsConfig,
}

impl AppState {
    /// Locks the app store, recovering from poisoning.
    pub fn store(&self) -> MutexGuard<'_, AppStore<Box<dyn KeyValueStorage>>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/regions", web::get().to(handlers::regions))
            .route("/regions/search", web::get().to(handlers::search_regions))
            .route("/regions/{region}/stats", web::get().to(handlers::region_stats))
            .route("/regions/{region}/traces", web::get().to(handlers::region_traces))
            .route(
                "/regions/{region}/facilities",
                web::get().to(handlers::region_facilities),
            )
            .route(
                "/regions/{region}/recommendations",
                web::get().to(handlers::recommendations),
            )
            .route("/layers", web::get().to(handlers::layers))
            .route("/store", web::get().to(handlers::store_state))
            .route("/store/region", web::put().to(handlers::set_region))
            .route("/store/reports", web::post().to(handlers::add_report))
            .route(
                "/store/rewards/{id}/redeem",
                web::post().to(handlers::redeem_reward),
            ),
    );
}

/// Starts the flood map API server.
///
/// Reads the platform configuration from the environment, opens the app
/// store under the data directory, and starts the Actix-Web HTTP server.
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the WFS client cannot be built,
/// or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    // Already installed when launched from the CLI.
    pretty_env_logger::try_init_custom_env("RUST_LOG").ok();

    let config = WfsConfig::from_env();
    log::info!("Using WFS endpoint {}", config.wfs_base_url);
    let client = WfsClient::new(&config).map_err(std::io::Error::other)?;

    let data_dir = data_dir_from_env();
    log::info!("Opening app store in {}", data_dir.display());
    let storage: Box<dyn KeyValueStorage> = Box::new(FileStorage::new(data_dir));

    let state = web::Data::new(AppState {
        source: Arc::new(client),
        store: Mutex::new(AppStore::open(storage)),
        config,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
