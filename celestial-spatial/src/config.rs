//! Strategy configuration.
//!
//! One key, `index_type`, read from a TOML file, the environment, or a plain
//! string:
//!
//! ```toml
//! index_type = "q3c"
//! ```
//!
//! | Value (case-insensitive) | Strategy |
//! |--------------------------|----------|
//! | `none`, `unindexed` | [`StrategyKind::Unindexed`] |
//! | `hierarchical-pixel-index`, `q3c`, `pixel` | [`StrategyKind::PixelIndex`] |
//! | `geodesic-index`, `postgis`, `geodesic` | [`StrategyKind::GeodesicIndex`] |
//!
//! A missing key selects the unindexed strategy. An unrecognized value does
//! too, with a warning.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SpatialError};
use crate::strategy::StrategyKind;

/// Environment variable consulted by [`SpatialConfig::from_env`].
pub const INDEX_TYPE_ENV: &str = "CELESTIAL_SPATIAL_INDEX";

impl StrategyKind {
    /// Parses a configured name or alias. `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "unindexed" => Some(Self::Unindexed),
            "hierarchical-pixel-index" | "q3c" | "pixel" => Some(Self::PixelIndex),
            "geodesic-index" | "postgis" | "geodesic" => Some(Self::GeodesicIndex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SpatialConfig {
    #[serde(default)]
    pub index_type: Option<String>,
}

impl SpatialConfig {
    pub fn new(index_type: impl Into<String>) -> Self {
        Self {
            index_type: Some(index_type.into()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SpatialError::Config(e.to_string()))
    }

    /// Reads a TOML file. I/O and parse failures carry the path.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read spatial config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse spatial config {}", path.display()))?;
        debug!(path = %path.display(), index_type = ?config.index_type, "loaded spatial config");
        Ok(config)
    }

    /// Reads [`INDEX_TYPE_ENV`]. Unset or empty yields the default.
    pub fn from_env() -> Self {
        let index_type = std::env::var(INDEX_TYPE_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self { index_type }
    }

    /// The strategy this configuration selects.
    pub fn strategy_kind(&self) -> StrategyKind {
        let Some(value) = self.index_type.as_deref() else {
            return StrategyKind::default();
        };
        StrategyKind::parse(value).unwrap_or_else(|| {
            warn!(
                index_type = value,
                fallback = %StrategyKind::default(),
                "unrecognized spatial index type"
            );
            StrategyKind::default()
        })
    }
}
