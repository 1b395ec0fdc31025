//! Layer configuration.
//!
//! The host writes layer options as JSON next to the tiles. Field names follow
//! Rust conventions, with aliases for the camel-case names hosts already use.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default tile URL template, relative to the page serving the map.
const DEFAULT_TILE_URL: &str = "{z}/{y}/{x}.pbf";

/// Default highest zoom level the tile server renders natively.
const DEFAULT_MAX_NATIVE_ZOOM: u8 = 8;

/// Options for one tiled marker layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// URL template with `{z}`, `{x}` and `{y}` placeholders.
    #[serde(alias = "tileURL")]
    pub tile_url: String,
    /// Highest zoom level with native tiles. Zooming past it clears the
    /// previous level in bulk.
    #[serde(alias = "maxNativeZoom")]
    pub max_native_zoom: u8,
    /// Count rows from the opposite edge when building tile URLs.
    #[serde(alias = "flipRows")]
    pub flip_rows: bool,
    /// Per-request timeout for the HTTP tile source.
    #[serde(alias = "requestTimeoutMs")]
    pub request_timeout_ms: Option<u64>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            tile_url: DEFAULT_TILE_URL.to_string(),
            max_native_zoom: DEFAULT_MAX_NATIVE_ZOOM,
            flip_rows: false,
            request_timeout_ms: None,
        }
    }
}

impl LayerConfig {
    /// Parse and validate a JSON layer configuration.
    ///
    /// Missing fields take their defaults; unknown fields are ignored.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the URL template can address a tile.
    pub fn validate(&self) -> Result<()> {
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.tile_url.contains(placeholder) {
                return Err(Error::Config {
                    detail: format!(
                        "tile_url {:?} is missing the {placeholder} placeholder",
                        self.tile_url
                    ),
                });
            }
        }
        Ok(())
    }

    /// Per-request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_native_zoom, 8);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_from_json_defaults_missing_fields() {
        let config = LayerConfig::from_json_str(r#"{"max_native_zoom": 5}"#).unwrap();
        assert_eq!(config.max_native_zoom, 5);
        assert_eq!(config.tile_url, DEFAULT_TILE_URL);
    }

    #[test]
    fn test_from_json_accepts_host_names() {
        let json = r#"{
            "tileURL": "catalog/{z}/{y}/{x}.pbf",
            "maxNativeZoom": 6,
            "requestTimeoutMs": 2500,
            "color": "red"
        }"#;
        let config = LayerConfig::from_json_str(json).unwrap();
        assert_eq!(config.tile_url, "catalog/{z}/{y}/{x}.pbf");
        assert_eq!(config.max_native_zoom, 6);
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_from_json_rejects_incomplete_template() {
        let err = LayerConfig::from_json_str(r#"{"tile_url": "tiles/{z}/{x}.pbf"}"#).unwrap_err();
        assert!(matches!(err, Error::Config { ref detail } if detail.contains("{y}")));
    }

    #[test]
    fn test_from_json_rejects_malformed_json() {
        assert!(matches!(
            LayerConfig::from_json_str("{"),
            Err(Error::Config { .. })
        ));
    }
}
