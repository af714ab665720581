#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flood data retrieval from the Gyeonggi climate platform's `GeoServer`.
//!
//! Everything here talks to a single WFS `GetFeature` endpoint through
//! the [`FeatureSource`] trait:
//!
//! * [`stats`] fans out three independent queries per region and merges
//!   them into a [`RegionStats`](flood_map_flood_models::RegionStats),
//!   isolating failures per field.
//! * [`details`] fetches bounded lists of flood traces and weak
//!   facilities and derives display fields from their raw attributes.
//! * [`view`] holds the current region's stats and discards responses
//!   from superseded selections.
//!
//! The WMS overlay layers shown under the markers are listed in
//! [`layers`].

pub mod client;
pub mod config;
pub mod cql;
pub mod details;
pub mod layers;
mod props;
pub mod stats;
pub mod view;

#[cfg(test)]
mod testing;

use thiserror::Error;

pub use client::{FeatureCollection, FeatureQuery, FeatureSource, WfsClient};
pub use config::WfsConfig;
pub use details::{fetch_facility_details, fetch_trace_details};
pub use stats::fetch_region_stats;
pub use view::RegionStatsView;

/// Errors that can occur while querying the WFS endpoint.
#[derive(Debug, Error)]
pub enum WfsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("WFS request for {type_name} failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Feature type that was requested.
        type_name: String,
    },

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value that would be interpolated into a query is unusable.
    #[error("Invalid query input: {message}")]
    InvalidInput {
        /// Description of what went wrong.
        message: String,
    },
}
