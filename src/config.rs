use crate::document::ZoneColor;
use crate::svg::RenderOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Grid step applied to committed points.
    pub snap_step: f64,
    /// Normalized radius around arrow endpoints that grabs a handle.
    pub endpoint_threshold: f64,
    /// Half-width of the arrow body hit area, in canvas units.
    pub arrow_hit_px: f64,
    /// Extra canvas units around an object's drawn extent that still hit it.
    pub object_hit_slop_px: f64,
    pub duplicate_offset: f64,
    pub min_zone_size: f64,
    pub max_circle_radius: f64,
    pub default_zone_color: ZoneColor,
    pub default_zone_opacity: f64,
    /// Snap dragged entities to the grid when the pointer is released.
    pub snap_on_release: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_step: 0.02,
            endpoint_threshold: 0.02,
            arrow_hit_px: 9.0,
            object_hit_slop_px: 14.0,
            duplicate_offset: 0.04,
            min_zone_size: 0.05,
            max_circle_radius: 0.5,
            default_zone_color: ZoneColor::Red,
            default_zone_opacity: 0.18,
            snap_on_release: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderOptions,
    pub editor: EditorConfig,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
