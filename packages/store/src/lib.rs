#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Local state persisted as whole JSON documents in key-value storage.
//!
//! Two independent slices live here:
//!
//! * [`app::AppStore`]: selected region, locally recorded reports, point
//!   balance and the reward catalog, driven by a pure reducer.
//! * [`reports::ReportCache`]: the citizen hazard report list shown on
//!   the report board.
//!
//! Each slice is read once when opened and rewritten in full after every
//! change.

pub mod app;
pub mod reports;
pub mod storage;

use std::path::PathBuf;

use thiserror::Error;

pub use app::{Action, AppState, AppStore, Report, Reward, SelectedRegion, reduce};
pub use reports::{CitizenReport, NewCitizenReport, ReportCache, ReportKind, ReportStatus};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// Directory used for file storage when `FLOOD_MAP_DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Errors that can occur while reading or writing local storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage keys must be usable as file names.
    #[error("Invalid storage key: {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },
}

/// Storage directory from `FLOOD_MAP_DATA_DIR`, defaulting to
/// [`DEFAULT_DATA_DIR`].
#[must_use]
pub fn data_dir_from_env() -> PathBuf {
    std::env::var("FLOOD_MAP_DATA_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from)
}
