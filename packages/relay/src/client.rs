//! `EmailJS` REST client.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::RelayError;

/// `EmailJS` send endpoint.
pub const EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Template parameters, keyed by placeholder name.
pub type TemplateParams = BTreeMap<&'static str, String>;

/// Which email template a submission uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Citizen hazard report.
    Report,
    /// Partner registration inquiry.
    Partner,
}

/// Anything that can deliver template parameters.
#[async_trait::async_trait]
pub trait EmailRelay: Send + Sync {
    /// Sends one email.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError`] if the relay is unreachable, rejects the
    /// submission or is not configured for `template`.
    async fn send(&self, template: Template, params: &TemplateParams) -> Result<(), RelayError>;
}

/// Relay credentials and template ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayConfig {
    pub endpoint: String,
    pub service_id: Option<String>,
    pub public_key: Option<String>,
    pub report_template: Option<String>,
    pub partner_template: Option<String>,
}

impl RelayConfig {
    /// Reads `EMAILJS_SERVICE_ID`, `EMAILJS_PUBLIC_KEY`,
    /// `EMAILJS_REPORT_TEMPLATE` and `EMAILJS_PARTNER_TEMPLATE`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            endpoint: EMAILJS_ENDPOINT.to_string(),
            service_id: get("EMAILJS_SERVICE_ID"),
            public_key: get("EMAILJS_PUBLIC_KEY"),
            report_template: get("EMAILJS_REPORT_TEMPLATE"),
            partner_template: get("EMAILJS_PARTNER_TEMPLATE"),
        }
    }

    fn template_id(&self, template: Template) -> Result<&str, RelayError> {
        let (value, variable) = match template {
            Template::Report => (&self.report_template, "EMAILJS_REPORT_TEMPLATE"),
            Template::Partner => (&self.partner_template, "EMAILJS_PARTNER_TEMPLATE"),
        };
        required(value.as_deref(), variable)
    }
}

fn required<'a>(value: Option<&'a str>, variable: &'static str) -> Result<&'a str, RelayError> {
    value.ok_or(RelayError::NotConfigured { variable })
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a TemplateParams,
}

/// Sends through the `EmailJS` REST API.
pub struct EmailJsRelay {
    config: RelayConfig,
    client: reqwest::Client,
}

impl EmailJsRelay {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl EmailRelay for EmailJsRelay {
    async fn send(&self, template: Template, params: &TemplateParams) -> Result<(), RelayError> {
        let body = SendRequest {
            service_id: required(self.config.service_id.as_deref(), "EMAILJS_SERVICE_ID")?,
            template_id: self.config.template_id(template)?,
            user_id: required(self.config.public_key.as_deref(), "EMAILJS_PUBLIC_KEY")?,
            template_params: params,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Email relay accepted {template:?} submission");
        Ok(())
    }
}
