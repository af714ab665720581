//! Endpoint configuration read from the environment.

use std::time::Duration;

/// WMS endpoint used when `GG_WMS_BASE_URL` is not set.
pub const DEFAULT_WMS_BASE_URL: &str = "https://climate.gg.go.kr/ols/api/geoserver/wms";

/// Per-request timeout for WFS calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Climate platform endpoints and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WfsConfig {
    /// WFS endpoint (`GetFeature`).
    pub wfs_base_url: String,
    /// WMS endpoint (map overlay tiles).
    pub wms_base_url: String,
    /// Platform API key, sent as the `apiKey` parameter.
    pub api_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for WfsConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl WfsConfig {
    /// Reads `GG_WMS_BASE_URL`, `GG_WFS_BASE_URL` and `GG_API_KEY`.
    ///
    /// The WFS URL defaults to the WMS URL with `/wms` replaced by `/wfs`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let wms_base_url =
            non_empty("GG_WMS_BASE_URL").unwrap_or_else(|| DEFAULT_WMS_BASE_URL.to_string());
        let wfs_base_url =
            non_empty("GG_WFS_BASE_URL").unwrap_or_else(|| wfs_url_from_wms(&wms_base_url));
        let api_key = lookup("GG_API_KEY").unwrap_or_default();

        if api_key.is_empty() {
            log::warn!("GG_API_KEY is not set; platform requests will likely be rejected");
        }

        Self {
            wfs_base_url,
            wms_base_url,
            api_key,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Derives the WFS endpoint from a WMS endpoint on the same `GeoServer`.
#[must_use]
pub fn wfs_url_from_wms(wms_url: &str) -> String {
    wms_url.replacen("/wms", "/wfs", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_platform_geoserver() {
        let config = WfsConfig::default();
        assert_eq!(config.wms_base_url, DEFAULT_WMS_BASE_URL);
        assert_eq!(
            config.wfs_base_url,
            "https://climate.gg.go.kr/ols/api/geoserver/wfs"
        );
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn wfs_url_derives_from_custom_wms() {
        let config = WfsConfig::from_lookup(|key| match key {
            "GG_WMS_BASE_URL" => Some("http://localhost:8600/geoserver/wms".to_string()),
            "GG_API_KEY" => Some("k".to_string()),
            _ => None,
        });
        assert_eq!(config.wfs_base_url, "http://localhost:8600/geoserver/wfs");
        assert_eq!(config.api_key, "k");
    }

    #[test]
    fn explicit_wfs_url_wins() {
        let config = WfsConfig::from_lookup(|key| match key {
            "GG_WFS_BASE_URL" => Some("http://wfs.example/ows".to_string()),
            _ => None,
        });
        assert_eq!(config.wfs_base_url, "http://wfs.example/ows");
    }
}
