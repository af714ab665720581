//! Session state driven by auth events.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tokio::time::timeout;

use crate::{
    AuthSubscription, AuthUser, DocumentStore, NewReportRecord, REPORT_POINTS, ReportRecord,
    STORE_TIMEOUT, SessionError, UserType,
};

/// Display name used when neither the store nor the identity provider
/// has one.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Points needed for [`Level::Silver`].
pub const SILVER_POINTS: u64 = 200;

/// Points needed for [`Level::Gold`].
pub const GOLD_POINTS: u64 = 500;

/// Membership level derived from points.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Level {
    Bronze,
    Silver,
    Gold,
}

impl Level {
    #[must_use]
    pub const fn for_points(points: u64) -> Self {
        if points >= GOLD_POINTS {
            Self::Gold
        } else if points >= SILVER_POINTS {
            Self::Silver
        } else {
            Self::Bronze
        }
    }
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub user_type: Option<UserType>,
    pub points: u64,
    pub level: Level,
    pub report_count: u64,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Profile built from identity provider data alone: no type, zero
    /// points, bronze.
    #[must_use]
    pub fn fallback(user: &AuthUser) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone().unwrap_or_default(),
            display_name: user
                .display_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            user_type: None,
            points: 0,
            level: Level::Bronze,
            report_count: 0,
            created_at: Utc::now(),
        }
    }

    fn award(&mut self, points: u64) {
        self.points = self.points.saturating_add(points);
        self.report_count = self.report_count.saturating_add(1);
        self.level = Level::for_points(self.points);
    }
}

/// Snapshot of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<AuthUser>,
    pub profile: Option<UserProfile>,
    /// Newest first.
    pub reports: Vec<ReportRecord>,
    /// `true` until the first auth event has been handled.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            profile: None,
            reports: Vec::new(),
            loading: true,
        }
    }
}

/// Keeps the session in sync with auth events and the document store.
pub struct SessionManager<D: DocumentStore + ?Sized> {
    store: Arc<D>,
    state: Mutex<SessionState>,
}

impl<D: DocumentStore + ?Sized> SessionManager<D> {
    #[must_use]
    pub fn new(store: Arc<D>) -> Self {
        Self {
            store,
            state: Mutex::new(SessionState::default()),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handles auth events until the hub goes away.
    pub async fn run(&self, mut subscription: AuthSubscription) {
        while let Some(user) = subscription.next().await {
            self.handle_auth_event(user).await;
        }
        log::debug!("Auth subscription closed");
    }

    /// Applies a sign-in or sign-out.
    ///
    /// On sign-in the profile and the report list are loaded, each within
    /// [`STORE_TIMEOUT`]. A timeout substitutes the fallback profile or an
    /// empty list and is logged as a warning.
    pub async fn handle_auth_event(&self, user: Option<AuthUser>) {
        self.lock().user.clone_from(&user);

        let Some(user) = user else {
            let mut state = self.lock();
            state.profile = None;
            state.reports.clear();
            state.loading = false;
            return;
        };

        let profile = match timeout(STORE_TIMEOUT, self.load_profile(&user)).await {
            Ok(profile) => profile,
            Err(_) => {
                log::warn!("Profile load for {} timed out, using default", user.uid);
                UserProfile::fallback(&user)
            }
        };

        let reports = match timeout(STORE_TIMEOUT, self.load_reports(&user.uid)).await {
            Ok(reports) => reports,
            Err(_) => {
                log::warn!("Report load for {} timed out", user.uid);
                Vec::new()
            }
        };

        let mut state = self.lock();
        // A sign-out may have arrived while loading.
        if state.user.as_ref().is_some_and(|u| u.uid == user.uid) {
            state.profile = Some(profile);
            state.reports = reports;
        }
        state.loading = false;
    }

    async fn load_profile(&self, user: &AuthUser) -> UserProfile {
        match self.store.get_user(&user.uid).await {
            Ok(Some(doc)) => UserProfile {
                uid: user.uid.clone(),
                email: doc.email.unwrap_or_default(),
                display_name: doc
                    .display_name
                    .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
                user_type: doc.user_type,
                points: doc.points,
                level: Level::for_points(doc.points),
                report_count: doc.report_count,
                created_at: doc.created_at.unwrap_or_else(Utc::now),
            },
            Ok(None) => UserProfile::fallback(user),
            Err(e) => {
                log::error!("Failed to load profile for {}: {e}", user.uid);
                UserProfile::fallback(user)
            }
        }
    }

    async fn load_reports(&self, uid: &str) -> Vec<ReportRecord> {
        match self.store.reports_for_user(uid).await {
            Ok(mut reports) => {
                reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                reports
            }
            Err(e) => {
                log::error!("Failed to load reports for {uid}: {e}");
                Vec::new()
            }
        }
    }

    /// Reloads the signed-in user's reports.
    pub async fn refresh_reports(&self) {
        let Some(uid) = self.lock().user.as_ref().map(|u| u.uid.clone()) else {
            return;
        };
        let reports = self.load_reports(&uid).await;
        self.lock().reports = reports;
    }

    /// Records a report for the signed-in user and awards
    /// [`REPORT_POINTS`].
    ///
    /// The local profile is updated even when the store write fails or
    /// times out; the failure is only logged. Returns the updated profile.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] if no profile is loaded.
    pub async fn record_report(&self, report: NewReportRecord) -> Result<UserProfile, SessionError> {
        let Some(profile) = self.lock().profile.clone() else {
            return Err(SessionError::NotSignedIn);
        };

        let mut updated = profile;
        updated.award(REPORT_POINTS);

        match self.persist_report(&updated, report).await {
            Ok(()) => {
                if let Ok(reports) =
                    timeout(STORE_TIMEOUT, self.load_reports(&updated.uid)).await
                {
                    self.lock().reports = reports;
                }
            }
            Err(e) => log::error!("Failed to save report for {}: {e}", updated.uid),
        }

        let mut state = self.lock();
        if let Some(current) = state.profile.as_mut().filter(|p| p.uid == updated.uid) {
            current.award(REPORT_POINTS);
            return Ok(current.clone());
        }
        drop(state);
        Ok(updated)
    }

    async fn persist_report(
        &self,
        profile: &UserProfile,
        report: NewReportRecord,
    ) -> Result<(), SessionError> {
        timeout(
            STORE_TIMEOUT,
            self.store.add_report(&profile.uid, report, REPORT_POINTS),
        )
        .await??;
        timeout(
            STORE_TIMEOUT,
            self.store
                .update_user_stats(&profile.uid, profile.points, profile.report_count),
        )
        .await??;
        Ok(())
    }

    /// Sets the signed-in user's account type.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] if nobody is signed in, or the
    /// store error if the update fails.
    pub async fn update_user_type(&self, user_type: UserType) -> Result<(), SessionError> {
        let Some(uid) = self.lock().user.as_ref().map(|u| u.uid.clone()) else {
            return Err(SessionError::NotSignedIn);
        };

        self.store.update_user_type(&uid, user_type).await?;

        if let Some(profile) = self.lock().profile.as_mut() {
            profile.user_type = Some(user_type);
        }
        Ok(())
    }
}
