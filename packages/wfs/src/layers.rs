//! Feature types queried over WFS and the matching WMS overlay layers.

use serde::Serialize;

use crate::{WfsConfig, WfsError};

/// Per-region flood danger index and rank.
pub const DANGER_RANK_TYPE: &str = "spggcee:tm_sigun_flod_dngr_evl_rnk";

/// Recorded flood traces.
pub const FLOOD_TRACE_TYPE: &str = "spggcee:tm_fldn_trce";

/// Flood-vulnerable facilities.
pub const WEAK_FACILITY_TYPE: &str = "spggcee:flod_weak_fclt";

/// A WMS overlay layer shown on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WmsLayer {
    /// Stable identifier used by the view layer.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// `GeoServer` layer name.
    pub layer: &'static str,
}

/// Overlay layers in drawing order.
pub const WMS_LAYERS: &[WmsLayer] = &[
    WmsLayer {
        id: "flood-trace",
        name: "Flood traces",
        layer: FLOOD_TRACE_TYPE,
    },
    WmsLayer {
        id: "weak-facility",
        name: "Flood-vulnerable facilities",
        layer: WEAK_FACILITY_TYPE,
    },
    WmsLayer {
        id: "risk-rank",
        name: "Flood danger rank",
        layer: DANGER_RANK_TYPE,
    },
];

/// Looks up an overlay layer by id.
#[must_use]
pub fn wms_layer(id: &str) -> Option<&'static WmsLayer> {
    WMS_LAYERS.iter().find(|layer| layer.id == id)
}

/// Builds the WMS base URL for a layer, carrying the fixed parameters.
///
/// The map renderer appends the per-tile `GetMap` parameters.
///
/// # Errors
///
/// Returns [`WfsError::InvalidInput`] if the configured WMS base URL is
/// not a valid URL.
pub fn wms_url(config: &WfsConfig, layer: &WmsLayer) -> Result<reqwest::Url, WfsError> {
    reqwest::Url::parse_with_params(
        &config.wms_base_url,
        &[
            ("apiKey", config.api_key.as_str()),
            ("layers", layer.layer),
            ("format", "image/png"),
            ("transparent", "true"),
        ],
    )
    .map_err(|e| WfsError::InvalidInput {
        message: format!("invalid WMS base URL {:?}: {e}", config.wms_base_url),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_layers_with_unique_ids() {
        assert_eq!(WMS_LAYERS.len(), 3);
        assert!(wms_layer("flood-trace").is_some());
        assert!(wms_layer("weak-facility").is_some());
        assert_eq!(wms_layer("risk-rank").unwrap().layer, DANGER_RANK_TYPE);
        assert!(wms_layer("nope").is_none());
    }

    #[test]
    fn wms_url_carries_fixed_params() {
        let config = WfsConfig {
            api_key: "abc".to_string(),
            ..WfsConfig::default()
        };
        let url = wms_url(&config, &WMS_LAYERS[0]).unwrap();
        assert_eq!(url.host_str(), Some("climate.gg.go.kr"));
        assert_eq!(url.path(), "/ols/api/geoserver/wms");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("apiKey".into(), "abc".into())));
        assert!(pairs.contains(&("layers".into(), "spggcee:tm_fldn_trce".into())));
        assert!(pairs.contains(&("format".into(), "image/png".into())));
        assert!(pairs.contains(&("transparent".into(), "true".into())));
    }
}
