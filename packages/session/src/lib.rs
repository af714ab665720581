#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Signed-in user session.
//!
//! Authentication itself is handled by an external identity provider;
//! this crate only consumes its sign-in/sign-out events through an
//! [`AuthSubscription`], loads the user's profile and report history from
//! a [`DocumentStore`], and records new reports.
//!
//! Every document store call is time-boxed to [`STORE_TIMEOUT`]. A slow or
//! failing store never blocks the session: profile loads fall back to a
//! default profile, report loads to an empty list, and report recording
//! updates the local point balance regardless of the outcome.

pub mod auth;
pub mod documents;
pub mod session;

use std::time::Duration;

use thiserror::Error;

pub use auth::{AuthStateHub, AuthSubscription, AuthUser};
pub use documents::{
    DocumentStore, MemoryDocumentStore, NewReportRecord, RecordKind, RecordStatus, ReportRecord,
    UserDocument, UserType,
};
pub use session::{Level, SessionManager, SessionState, UserProfile};

/// Upper bound on each document store call.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(3);

/// Points awarded for each recorded report.
pub const REPORT_POINTS: u64 = 10;

/// Errors that can occur in the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The document store rejected or failed a request.
    #[error("Document store error: {message}")]
    Store {
        /// Description of what went wrong.
        message: String,
    },

    /// A document store call exceeded [`STORE_TIMEOUT`].
    #[error("Document store timed out after {0:?}")]
    Timeout(Duration),

    /// The operation needs a signed-in user.
    #[error("No user is signed in")]
    NotSignedIn,
}

impl From<tokio::time::error::Elapsed> for SessionError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout(STORE_TIMEOUT)
    }
}
