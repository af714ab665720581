//! Report and partner inquiry forms.

use flood_map_recommend::SolutionCategory;
use flood_map_region_models::LatLng;
use flood_map_session::{DocumentStore, NewReportRecord, RecordKind, SessionManager, UserProfile};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{EmailRelay, RelayError, Template, TemplateParams};

const NOT_PROVIDED: &str = "Not provided";
const NONE: &str = "None";

/// A citizen hazard report as entered on the report form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Address typed by the user.
    pub address: Option<String>,
    /// Address resolved by the address search.
    pub found_address: Option<String>,
    /// Marker position picked on the map.
    pub position: Option<LatLng>,
    pub description: String,
    pub photo_name: Option<String>,
    pub contact: Option<String>,
}

fn kind_label(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Flood => "Flooding",
        RecordKind::Drain => "Drainage problem",
        RecordKind::Etc => "Other",
    }
}

fn or_default(value: Option<&String>, default: &str) -> String {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

impl ReportSubmission {
    /// Marker coordinates with six decimals, or `"unspecified"`.
    #[must_use]
    pub fn coordinates(&self) -> String {
        self.position.map_or_else(
            || "unspecified".to_string(),
            |p| format!("{:.6}, {:.6}", p.lat, p.lng),
        )
    }

    fn address_or_default(&self) -> String {
        or_default(self.address.as_ref(), NOT_PROVIDED)
    }

    fn found_address_or_default(&self) -> String {
        or_default(self.found_address.as_ref(), "Not found")
    }

    fn contact_or_default(&self) -> String {
        or_default(self.contact.as_ref(), NOT_PROVIDED)
    }

    /// Email template parameters.
    #[must_use]
    pub fn template_params(&self) -> TemplateParams {
        let kind = kind_label(self.kind);
        let location = or_default(self.address.as_ref(), "Unknown location");

        TemplateParams::from([
            ("subject", format!("[Hazard report] {kind} - {location}")),
            ("report_type", kind.to_string()),
            ("address", self.address_or_default()),
            ("address_detail", self.found_address_or_default()),
            ("coordinates", self.coordinates()),
            ("description", self.description.clone()),
            ("photo_name", or_default(self.photo_name.as_ref(), NONE)),
            ("contact", self.contact_or_default()),
        ])
    }

    /// The record stored against the user's account.
    #[must_use]
    pub fn to_record(&self) -> NewReportRecord {
        NewReportRecord {
            kind: self.kind,
            address: self.address_or_default(),
            address_detail: self.found_address_or_default(),
            coordinates: self.coordinates(),
            description: self.description.clone(),
            contact: self.contact_or_default(),
        }
    }
}

/// Result of a delivered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSubmitted {
    /// Updated profile when a signed-in user's report was recorded.
    pub profile: Option<UserProfile>,
}

/// Sends a report and, for a signed-in user, records it on their account.
///
/// Recording only happens after the relay accepted the report.
///
/// # Errors
///
/// Returns [`RelayError`] if delivery fails; nothing is recorded then.
pub async fn submit_report<R, D>(
    relay: &R,
    session: Option<&SessionManager<D>>,
    report: &ReportSubmission,
) -> Result<ReportSubmitted, RelayError>
where
    R: EmailRelay + ?Sized,
    D: DocumentStore + ?Sized,
{
    relay
        .send(Template::Report, &report.template_params())
        .await
        .inspect_err(|e| log::error!("Report submission failed: {e}"))?;

    let Some(session) = session else {
        return Ok(ReportSubmitted { profile: None });
    };

    let profile = match session.record_report(report.to_record()).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            log::debug!("Report not recorded on an account: {e}");
            None
        }
    };
    Ok(ReportSubmitted { profile })
}

/// Whether a partner can run a proof-of-concept.
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
pub enum PocAvailability {
    Available,
    Negotiable,
    Unavailable,
}

impl PocAvailability {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Negotiable => "Needs discussion",
            Self::Unavailable => "Not available",
        }
    }
}

/// A partner registration inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInquiry {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub service_region: String,
    #[serde(default)]
    pub categories: Vec<SolutionCategory>,
    pub certifications: Option<String>,
    pub case_link: Option<String>,
    pub poc_availability: PocAvailability,
    pub message: Option<String>,
}

impl PartnerInquiry {
    /// Email template parameters.
    #[must_use]
    pub fn template_params(&self) -> TemplateParams {
        let categories = if self.categories.is_empty() {
            "None selected".to_string()
        } else {
            self.categories
                .iter()
                .map(|c| c.card().title)
                .collect::<Vec<_>>()
                .join(", ")
        };

        TemplateParams::from([
            ("subject", format!("[Partner inquiry] {}", self.company_name)),
            ("company_name", self.company_name.clone()),
            ("contact_name", self.contact_name.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            ("service_region", self.service_region.clone()),
            ("categories", categories),
            ("certifications", or_default(self.certifications.as_ref(), NONE)),
            ("case_link", or_default(self.case_link.as_ref(), NONE)),
            ("poc_availability", self.poc_availability.label().to_string()),
            ("message", or_default(self.message.as_ref(), NONE)),
        ])
    }
}

/// Sends a partner inquiry.
///
/// # Errors
///
/// Returns [`RelayError`] if delivery fails.
pub async fn submit_partner_inquiry<R: EmailRelay + ?Sized>(
    relay: &R,
    inquiry: &PartnerInquiry,
) -> Result<(), RelayError> {
    relay
        .send(Template::Partner, &inquiry.template_params())
        .await
        .inspect_err(|e| log::error!("Partner inquiry failed: {e}"))
}
