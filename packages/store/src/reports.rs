//! Citizen hazard report cache.
//!
//! Reports are kept in submission order and seeded with sample entries
//! the first time the cache is opened.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::storage::{KeyValueStorage, storage_get, storage_set};

/// Storage key of the report list document.
pub const STORAGE_KEY: &str = "climate-safety-hub-reports";

/// What a citizen reported.
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
pub enum ReportKind {
    /// Standing water or inundation.
    Flood,
    /// Blocked or broken drainage.
    Drainage,
    Other,
}

impl ReportKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flood => "Flooding",
            Self::Drainage => "Drainage problem",
            Self::Other => "Other",
        }
    }
}

/// Review state of a report.
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
pub enum ReportStatus {
    Pending,
    Confirmed,
    Resolved,
}

/// Where a report was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLocation {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// A stored citizen report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenReport {
    pub id: String,
    pub location: ReportLocation,
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub description: String,
    pub created_at: String,
    pub status: ReportStatus,
}

/// Fields supplied when filing a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCitizenReport {
    pub location: ReportLocation,
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub description: String,
}

/// The report list, mirrored to storage on every change.
pub struct ReportCache<S: KeyValueStorage> {
    storage: S,
    reports: Vec<CitizenReport>,
}

impl<S: KeyValueStorage> ReportCache<S> {
    /// Opens the cache, falling back to the sample reports when nothing is
    /// stored.
    pub fn open(storage: S) -> Self {
        let reports = storage_get(&storage, STORAGE_KEY).unwrap_or_else(sample_reports);
        Self { storage, reports }
    }

    /// All reports in submission order.
    #[must_use]
    pub fn all(&self) -> &[CitizenReport] {
        &self.reports
    }

    /// Files a new pending report and returns it.
    pub fn add(&mut self, report: NewCitizenReport) -> CitizenReport {
        let now = chrono::Utc::now();
        let report = CitizenReport {
            id: format!("report-{}", now.timestamp_millis()),
            location: report.location,
            kind: report.kind,
            description: report.description,
            created_at: now.to_rfc3339(),
            status: ReportStatus::Pending,
        };
        self.reports.push(report.clone());
        storage_set(&self.storage, STORAGE_KEY, &self.reports);
        report
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CitizenReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn by_kind(&self, kind: ReportKind) -> impl Iterator<Item = &CitizenReport> {
        self.reports.iter().filter(move |r| r.kind == kind)
    }

    pub fn by_status(&self, status: ReportStatus) -> impl Iterator<Item = &CitizenReport> {
        self.reports.iter().filter(move |r| r.status == status)
    }
}

fn sample(
    id: &str,
    (lat, lng, address): (f64, f64, &str),
    kind: ReportKind,
    description: &str,
    created_at: &str,
    status: ReportStatus,
) -> CitizenReport {
    CitizenReport {
        id: id.to_string(),
        location: ReportLocation {
            lat,
            lng,
            address: address.to_string(),
        },
        kind,
        description: description.to_string(),
        created_at: created_at.to_string(),
        status,
    }
}

/// Sample reports shown before anyone has filed one.
#[must_use]
pub fn sample_reports() -> Vec<CitizenReport> {
    vec![
        sample(
            "report-001",
            (37.2636, 127.0286, "수원시 팔달구 인계동"),
            ReportKind::Flood,
            "Water pools on the road whenever it rains.",
            "2024-07-15T14:30:00",
            ReportStatus::Confirmed,
        ),
        sample(
            "report-002",
            (37.4200, 127.1265, "성남시 수정구 신흥동"),
            ReportKind::Drainage,
            "The storm drain clogs often and smells.",
            "2024-07-20T09:15:00",
            ReportStatus::Pending,
        ),
        sample(
            "report-003",
            (37.6584, 126.8320, "고양시 일산서구 대화동"),
            ReportKind::Flood,
            "Underpass at risk of flooding.",
            "2024-08-01T16:45:00",
            ReportStatus::Confirmed,
        ),
        sample(
            "report-004",
            (37.5034, 126.7660, "부천시 원미구 중동"),
            ReportKind::Other,
            "Drainage channel cover is broken.",
            "2024-08-05T11:20:00",
            ReportStatus::Resolved,
        ),
        sample(
            "report-005",
            (37.7381, 127.0337, "의정부시 의정부동"),
            ReportKind::Flood,
            "Floods repeatedly during heavy rain.",
            "2024-08-10T08:00:00",
            ReportStatus::Confirmed,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    fn new_report(kind: ReportKind) -> NewCitizenReport {
        NewCitizenReport {
            location: ReportLocation {
                lat: 37.3,
                lng: 127.0,
                address: "somewhere".to_string(),
            },
            kind,
            description: "water".to_string(),
        }
    }

    #[test]
    fn seeded_with_samples() {
        let cache = ReportCache::open(MemoryStorage::new());
        assert_eq!(cache.all().len(), 5);
        assert_eq!(cache.by_kind(ReportKind::Flood).count(), 3);
        assert_eq!(cache.by_status(ReportStatus::Confirmed).count(), 3);
        assert_eq!(cache.get("report-004").unwrap().kind, ReportKind::Other);
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn add_appends_pending_and_persists() {
        let mut cache = ReportCache::open(MemoryStorage::new());
        let added = cache.add(new_report(ReportKind::Drainage));

        assert!(added.id.starts_with("report-"));
        assert_eq!(added.status, ReportStatus::Pending);
        assert_eq!(cache.all().last(), Some(&added));
        assert_eq!(cache.by_status(ReportStatus::Pending).count(), 2);

        let reopened = ReportCache::open(cache.storage);
        assert_eq!(reopened.all().len(), 6);
    }

    #[test]
    fn serializes_kind_as_type() {
        let json = serde_json::to_value(&sample_reports()[0]).unwrap();
        assert_eq!(json["type"], "flood");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["createdAt"], "2024-07-15T14:30:00");
    }
}
