//! Document store interface for user profiles and report records.

use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::SessionError;

/// Whether an account belongs to a citizen or a business partner.
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
pub enum UserType {
    Citizen,
    Business,
}

/// Stored user document, keyed by uid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub user_type: Option<UserType>,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub report_count: u64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Hazard category of a recorded report.
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
pub enum RecordKind {
    Flood,
    Drain,
    Etc,
}

/// Review state of a recorded report.
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
pub enum RecordStatus {
    Pending,
    Reviewing,
    Completed,
}

/// A report stored against a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub address: String,
    pub address_detail: String,
    pub coordinates: String,
    pub description: String,
    pub contact: String,
    pub status: RecordStatus,
    pub points: u64,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when recording a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReportRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub address: String,
    pub address_detail: String,
    pub coordinates: String,
    pub description: String,
    pub contact: String,
}

impl NewReportRecord {
    /// A pending record for `user_id`, awarded `points`.
    #[must_use]
    pub fn into_record(self, id: String, user_id: String, points: u64) -> ReportRecord {
        ReportRecord {
            id,
            user_id,
            kind: self.kind,
            address: self.address,
            address_detail: self.address_detail,
            coordinates: self.coordinates,
            description: self.description,
            contact: self.contact,
            status: RecordStatus::Pending,
            points,
            created_at: Utc::now(),
        }
    }
}

/// Remote document store holding user profiles and their reports.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a user document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store request fails.
    async fn get_user(&self, uid: &str) -> Result<Option<UserDocument>, SessionError>;

    /// Updates a user's point balance and report count.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store request fails.
    async fn update_user_stats(
        &self,
        uid: &str,
        points: u64,
        report_count: u64,
    ) -> Result<(), SessionError>;

    /// Updates a user's account type.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store request fails.
    async fn update_user_type(&self, uid: &str, user_type: UserType) -> Result<(), SessionError>;

    /// All reports of a user, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store request fails.
    async fn reports_for_user(&self, uid: &str) -> Result<Vec<ReportRecord>, SessionError>;

    /// Stores a new report and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store request fails.
    async fn add_report(
        &self,
        user_id: &str,
        report: NewReportRecord,
        points: u64,
    ) -> Result<String, SessionError>;
}

/// In-process document store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    users: Mutex<BTreeMap<String, UserDocument>>,
    reports: Mutex<Vec<ReportRecord>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user document.
    pub fn put_user(&self, uid: &str, user: UserDocument) {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uid.to_string(), user);
    }

    /// Inserts a report record as-is.
    pub fn put_report(&self, report: ReportRecord) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report);
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_user(&self, uid: &str) -> Result<Option<UserDocument>, SessionError> {
        Ok(self
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uid)
            .cloned())
    }

    async fn update_user_stats(
        &self,
        uid: &str,
        points: u64,
        report_count: u64,
    ) -> Result<(), SessionError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let user = users.entry(uid.to_string()).or_default();
        user.points = points;
        user.report_count = report_count;
        Ok(())
    }

    async fn update_user_type(&self, uid: &str, user_type: UserType) -> Result<(), SessionError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        users.entry(uid.to_string()).or_default().user_type = Some(user_type);
        Ok(())
    }

    async fn reports_for_user(&self, uid: &str) -> Result<Vec<ReportRecord>, SessionError> {
        Ok(self
            .reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.user_id == uid)
            .cloned()
            .collect())
    }

    async fn add_report(
        &self,
        user_id: &str,
        report: NewReportRecord,
        points: u64,
    ) -> Result<String, SessionError> {
        let id = uuid::Uuid::new_v4().to_string();
        let record = report.into_record(id.clone(), user_id.to_string(), points);
        self.put_report(record);
        Ok(id)
    }
}
