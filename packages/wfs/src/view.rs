//! Current-region statistics with a stale-response guard.
//!
//! Rapid region switching can leave a slow request in flight after a
//! newer, faster one has already completed. [`RegionStatsView`] stamps
//! every selection with a monotonic sequence number and drops any result
//! whose number is no longer the latest, so the displayed stats always
//! belong to the last selected region.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use flood_map_flood_models::RegionStats;

use crate::{FeatureSource, fetch_region_stats};

/// Stats currently shown for the selected region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedStats {
    /// Administrative code of the region the stats belong to.
    pub region_code: Option<String>,
    /// The stats record.
    pub stats: RegionStats,
}

/// Holds the stats of the most recent region selection.
#[derive(Debug, Default)]
pub struct RegionStatsView {
    latest: AtomicU64,
    current: Mutex<SelectedStats>,
}

impl RegionStatsView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current stats.
    #[must_use]
    pub fn current(&self) -> SelectedStats {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Selects a region and fetches its stats.
    ///
    /// The view shows [`RegionStats::pending`] until the fetch completes.
    /// Returns `true` if the result was applied, `false` if a later
    /// selection superseded it while it was in flight.
    pub async fn select<S: FeatureSource + ?Sized>(
        &self,
        source: &S,
        region_name: &str,
        region_code: &str,
    ) -> bool {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.apply(token, region_code, RegionStats::pending());

        let stats = fetch_region_stats(source, region_name, region_code).await;

        let applied = self.apply(token, region_code, stats);
        if !applied {
            log::debug!("Discarding stale stats for {region_name} ({region_code})");
        }
        applied
    }

    fn apply(&self, token: u64, region_code: &str, stats: RegionStats) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if self.latest.load(Ordering::SeqCst) != token {
            return false;
        }
        *current = SelectedStats {
            region_code: Some(region_code.to_string()),
            stats,
        };
        true
    }
}
