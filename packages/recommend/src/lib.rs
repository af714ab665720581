#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flood mitigation solution ranking.
//!
//! Four solution categories are scored from a region's aggregated
//! statistics and ordered by score. Ties keep the declaration order of
//! [`SolutionCategory`], so infiltration wins when nothing else stands
//! out.

use flood_map_flood_models::{DangerBand, RegionStats, classify};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Trace count at or above which storage and infiltration are favored.
pub const MANY_TRACES: u64 = 5;

/// Weak facility count at or above which monitoring is favored.
pub const MANY_FACILITIES: u64 = 10;

/// Number of solutions shown on the partner screen.
pub const TOP_SOLUTIONS: usize = 3;

/// Mitigation solution categories, in tie-breaking order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SolutionCategory {
    /// Permeable surfaces and infiltration trenches.
    Infiltration,
    /// Detention tanks and rainwater storage.
    Storage,
    /// Flood-proofing of buildings and underground facilities.
    Building,
    /// Sensor-based water level monitoring.
    Smart,
}

impl SolutionCategory {
    /// All categories in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Infiltration, Self::Storage, Self::Building, Self::Smart]
    }

    /// Display card for this category.
    #[must_use]
    pub const fn card(self) -> &'static SolutionCard {
        match self {
            Self::Infiltration => &INFILTRATION,
            Self::Storage => &STORAGE,
            Self::Building => &BUILDING,
            Self::Smart => &SMART,
        }
    }
}

/// Static description of a solution category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolutionCard {
    pub title: &'static str,
    pub description: &'static str,
    /// Default reason shown for recommending this category.
    pub reason: &'static str,
    /// Representative products or techniques.
    pub tags: &'static [&'static str],
}

const INFILTRATION: SolutionCard = SolutionCard {
    title: "Permeable & infiltration",
    description: "Lets rainwater soak into the ground to reduce runoff",
    reason: "Many flood traces and a high share of impervious surface",
    tags: &["Permeable blocks", "Infiltration trench", "Infiltration gutter"],
};

const STORAGE: SolutionCard = SolutionCard {
    title: "Detention & storage",
    description: "Temporarily stores rainwater to flatten peak runoff",
    reason: "Storm drains at risk of overflowing during heavy rain",
    tags: &["Detention tank", "Rain barrel", "Underground storage"],
};

const BUILDING: SolutionCard = SolutionCard {
    title: "Building & facility protection",
    description: "Reinforces flood weak points of buildings and basements",
    reason: "Many weak facilities rated grade 3 or higher",
    tags: &["Flood barrier", "Backflow valve", "Drainage pump"],
};

const SMART: SolutionCard = SolutionCard {
    title: "Smart monitoring",
    description: "Watches and forecasts water levels with IoT sensors",
    reason: "Near rivers, needs integration with flood forecasts",
    tags: &["Water level sensor", "CCTV", "AI forecasting"],
};

/// A scored category in a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSolution {
    pub category: SolutionCategory,
    pub score: u32,
    /// Set on the first entry of a ranking only.
    pub is_priority: bool,
}

impl RankedSolution {
    #[must_use]
    pub const fn card(&self) -> &'static SolutionCard {
        self.category.card()
    }
}

/// Scores every category for the given stats.
#[must_use]
pub fn score(stats: &RegionStats) -> [(SolutionCategory, u32); 4] {
    let mut infiltration = 1;
    let mut storage = 0;
    let mut building = 0;
    let mut smart = 0;

    if classify(stats.flood_danger_idx).band == Some(DangerBand::High) {
        building += 3;
        storage += 2;
    }
    if stats.flood_trace_count.is_some_and(|n| n >= MANY_TRACES) {
        storage += 3;
        infiltration += 2;
    }
    if stats.weak_facility_count.is_some_and(|n| n >= MANY_FACILITIES) {
        smart += 3;
        building += 1;
    }

    [
        (SolutionCategory::Infiltration, infiltration),
        (SolutionCategory::Storage, storage),
        (SolutionCategory::Building, building),
        (SolutionCategory::Smart, smart),
    ]
}

/// Ranks all four categories by descending score.
///
/// The sort is stable: equal scores keep declaration order. Exactly one
/// entry, the first, is flagged as priority.
#[must_use]
pub fn rank(stats: &RegionStats) -> Vec<RankedSolution> {
    let mut scored = score(stats).to_vec();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (category, score))| RankedSolution {
            category,
            score,
            is_priority: i == 0,
        })
        .collect()
}

/// The first [`TOP_SOLUTIONS`] entries of a ranking.
#[must_use]
pub fn top(ranking: &[RankedSolution]) -> &[RankedSolution] {
    &ranking[..ranking.len().min(TOP_SOLUTIONS)]
}
