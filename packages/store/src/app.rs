//! Reducer-driven app state: selected region, local reports, points and
//! rewards.
//!
//! [`reduce`] is a pure function over an immutable snapshot. [`AppStore`]
//! owns the current snapshot, applies actions through the reducer and
//! writes the new state to storage only after a transition commits.

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStorage, storage_get, storage_set};

/// Storage key of the app state document.
pub const STORAGE_KEY: &str = "climate-safety-hub-mvp";

/// Points awarded for each recorded report.
pub const REPORT_POINTS: u64 = 10;

/// Region chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedRegion {
    /// Province (`시도`).
    pub sido: String,
    /// City, county or district (`시군구`).
    pub sigungu: String,
    /// Town or neighborhood (`읍면동`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eupmyeondong: Option<String>,
}

impl Default for SelectedRegion {
    fn default() -> Self {
        Self {
            sido: "경기도".to_string(),
            sigungu: "수원시".to_string(),
            eupmyeondong: None,
        }
    }
}

/// A report recorded locally, with the points it earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub region: SelectedRegion,
    pub location_text: String,
    pub description: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    pub points: u64,
}

/// A reward redeemable with points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: String,
    pub title: String,
    pub cost: u64,
}

/// The whole persisted app state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub region: SelectedRegion,
    /// Newest first.
    pub reports: Vec<Report>,
    pub points: u64,
    pub rewards: Vec<Reward>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            region: SelectedRegion::default(),
            reports: Vec::new(),
            points: 0,
            rewards: default_rewards(),
        }
    }
}

impl AppState {
    /// Looks up a reward in the catalog.
    #[must_use]
    pub fn reward(&self, id: &str) -> Option<&Reward> {
        self.rewards.iter().find(|r| r.id == id)
    }
}

fn default_rewards() -> Vec<Reward> {
    vec![
        Reward {
            id: "gs25".to_string(),
            title: "GS25 mobile voucher".to_string(),
            cost: 800,
        },
        Reward {
            id: "cafe".to_string(),
            title: "Neighborhood cafe discount".to_string(),
            cost: 1500,
        },
    ]
}

/// A state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replaces the entire state.
    Load(AppState),
    /// Changes the selected region.
    SetRegion(SelectedRegion),
    /// Records a report in the current region and awards
    /// [`REPORT_POINTS`].
    AddReport {
        id: String,
        created_at: String,
        location_text: String,
        description: String,
    },
    /// Spends points on a reward. Ignored if the reward is unknown or the
    /// balance is too low.
    UseReward { reward_id: String },
}

impl Action {
    /// An [`Action::AddReport`] stamped with a fresh id and the current
    /// time.
    #[must_use]
    pub fn add_report(location_text: impl Into<String>, description: impl Into<String>) -> Self {
        Self::AddReport {
            id: uuid::Uuid::new_v4().simple().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            location_text: location_text.into(),
            description: description.into(),
        }
    }

    #[must_use]
    pub fn use_reward(reward_id: impl Into<String>) -> Self {
        Self::UseReward {
            reward_id: reward_id.into(),
        }
    }
}

/// Applies an action to a state snapshot.
///
/// A rejected redemption returns the snapshot unchanged. Redemptions are
/// not deduplicated: dispatching the same one twice deducts twice.
#[must_use]
pub fn reduce(state: &AppState, action: Action) -> AppState {
    match action {
        Action::Load(loaded) => loaded,
        Action::SetRegion(region) => AppState {
            region,
            ..state.clone()
        },
        Action::AddReport {
            id,
            created_at,
            location_text,
            description,
        } => {
            let report = Report {
                id,
                region: state.region.clone(),
                location_text,
                description,
                created_at,
                points: REPORT_POINTS,
            };
            let mut reports = Vec::with_capacity(state.reports.len() + 1);
            reports.push(report);
            reports.extend(state.reports.iter().cloned());
            AppState {
                reports,
                points: state.points.saturating_add(REPORT_POINTS),
                ..state.clone()
            }
        }
        Action::UseReward { reward_id } => match state.reward(&reward_id) {
            Some(reward) if state.points >= reward.cost => AppState {
                points: state.points - reward.cost,
                ..state.clone()
            },
            _ => state.clone(),
        },
    }
}

/// Owns the app state and mirrors it to storage.
pub struct AppStore<S: KeyValueStorage> {
    storage: S,
    state: AppState,
}

impl<S: KeyValueStorage> AppStore<S> {
    /// Opens the store, loading saved state once if present.
    pub fn open(storage: S) -> Self {
        let mut store = Self {
            state: AppState::default(),
            storage,
        };
        if let Some(saved) = storage_get::<AppState>(&store.storage, STORAGE_KEY) {
            log::debug!("Loaded saved app state ({} reports)", saved.reports.len());
            store.dispatch(Action::Load(saved));
        }
        store
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Applies an action and persists the result if it changed anything.
    ///
    /// Returns whether the state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let next = reduce(&self.state, action);
        if next == self.state {
            return false;
        }
        self.state = next;
        storage_set(&self.storage, STORAGE_KEY, &self.state);
        true
    }

    pub fn set_region(&mut self, region: SelectedRegion) -> bool {
        self.dispatch(Action::SetRegion(region))
    }

    /// Records a report and returns it.
    pub fn add_report(
        &mut self,
        location_text: impl Into<String>,
        description: impl Into<String>,
    ) -> Option<&Report> {
        self.dispatch(Action::add_report(location_text, description));
        self.state.reports.first()
    }

    /// Redeems a reward. Returns `false` if the reward is unknown or the
    /// balance is insufficient.
    pub fn use_reward(&mut self, reward_id: &str) -> bool {
        self.dispatch(Action::use_reward(reward_id))
    }
}
