#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Form submission through a third-party email relay.
//!
//! Citizen hazard reports and partner inquiries are sent as template
//! parameters to the `EmailJS` REST API. The relay only reports success or
//! failure; a failure is returned to the caller so the user can retry.

pub mod client;
pub mod forms;

use thiserror::Error;

pub use client::{EmailJsRelay, EmailRelay, RelayConfig, Template, TemplateParams};
pub use forms::{
    PartnerInquiry, PocAvailability, ReportSubmission, ReportSubmitted, submit_partner_inquiry,
    submit_report,
};

/// Errors that can occur while submitting to the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay rejected the submission.
    #[error("Email relay returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, usually a short reason.
        body: String,
    },

    /// A required relay setting is missing.
    #[error("Email relay is not configured: {variable} is unset")]
    NotConfigured {
        /// Environment variable that should hold the setting.
        variable: &'static str,
    },
}
