//! WFS `GetFeature` client.
//!
//! [`FeatureSource`] is the seam between the aggregation logic and the
//! network. [`WfsClient`] is the production implementation; tests
//! substitute canned responses.

use serde::{Deserialize, Deserializer};

use crate::{WfsConfig, WfsError};

/// Coordinate reference system requested for every query (WGS84).
pub const DEFAULT_SRS: &str = "EPSG:4326";

/// Parameters of a single `GetFeature` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureQuery {
    /// Feature type (layer) name, e.g. `spggcee:tm_fldn_trce`.
    pub type_name: String,
    /// Comma-separated attribute list to return.
    pub property_name: Option<String>,
    /// CQL filter expression.
    pub cql_filter: Option<String>,
    /// Upper bound on returned features.
    pub max_features: Option<u32>,
    /// Output coordinate reference system.
    pub srs_name: String,
}

impl FeatureQuery {
    /// Creates an unfiltered query for `type_name`.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            property_name: None,
            cql_filter: None,
            max_features: None,
            srs_name: DEFAULT_SRS.to_string(),
        }
    }

    /// Restricts the returned attributes.
    #[must_use]
    pub fn properties(mut self, property_name: impl Into<String>) -> Self {
        self.property_name = Some(property_name.into());
        self
    }

    /// Adds a CQL filter.
    #[must_use]
    pub fn filter(mut self, cql: impl Into<String>) -> Self {
        self.cql_filter = Some(cql.into());
        self
    }

    /// Caps the number of returned features.
    #[must_use]
    pub const fn max_features(mut self, max: u32) -> Self {
        self.max_features = Some(max);
        self
    }

    /// Builds the URL query parameters for this request.
    ///
    /// A zero `max_features` is omitted, as is any unset optional field.
    #[must_use]
    pub fn to_params(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apiKey", api_key.to_string()),
            ("service", "WFS".to_string()),
            ("request", "GetFeature".to_string()),
            ("typeName", self.type_name.clone()),
            ("outputFormat", "application/json".to_string()),
            ("srsName", self.srs_name.clone()),
        ];
        if let Some(property_name) = &self.property_name {
            params.push(("propertyName", property_name.clone()));
        }
        if let Some(cql) = &self.cql_filter {
            params.push(("CQL_FILTER", cql.clone()));
        }
        if let Some(max) = self.max_features.filter(|m| *m > 0) {
            params.push(("maxFeatures", max.to_string()));
        }
        params
    }
}

/// A `GeoJSON` `FeatureCollection` as returned by `GeoServer`.
///
/// Features are kept as raw JSON; each consumer reads the attributes it
/// needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCollection {
    /// Raw `GeoJSON` features.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<serde_json::Value>,
    /// Server-side match count. `GeoServer` may send a number or the
    /// string `"unknown"`.
    #[serde(default)]
    pub total_features: Option<serde_json::Value>,
}

impl FeatureCollection {
    /// Total number of matching features: `totalFeatures` when it is a
    /// number, otherwise the number of features returned.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total_features
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(self.features.len() as u64)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything that can answer a `GetFeature` query.
#[async_trait::async_trait]
pub trait FeatureSource: Send + Sync {
    /// Runs a `GetFeature` query.
    ///
    /// # Errors
    ///
    /// Returns [`WfsError`] if the request fails or the response cannot
    /// be parsed.
    async fn get_feature(&self, query: &FeatureQuery) -> Result<FeatureCollection, WfsError>;
}

/// HTTP client for the platform's WFS endpoint.
pub struct WfsClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl WfsClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WfsError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &WfsConfig) -> Result<Self, WfsError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: config.wfs_base_url.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// The endpoint this client queries.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl FeatureSource for WfsClient {
    async fn get_feature(&self, query: &FeatureQuery) -> Result<FeatureCollection, WfsError> {
        log::debug!(
            "WFS GetFeature {} filter={:?} max={:?}",
            query.type_name,
            query.cql_filter,
            query.max_features
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&query.to_params(&self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WfsError::Status {
                status: status.as_u16(),
                type_name: query.type_name.clone(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
