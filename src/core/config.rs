//! Viewer configuration
//!
//! Zoom policy, tile path convention and interaction tuning. Everything has a
//! default matching the shipped map pyramids, so a partial JSON document is
//! enough to override individual settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    DEFAULT_MAP, DEFAULT_START_ZOOM, DEFAULT_TILE_CACHE_SIZE, DEFAULT_TILE_EXTENSION,
    DEFAULT_TILE_ROOT, DEFAULT_ZOOM_DELTA, DEFAULT_ZOOM_LEVELS_ABOVE_NATIVE,
    DEFAULT_ZOOM_LEVELS_BELOW_NATIVE, MARKER_ICON_ANCHOR,
};
use crate::{MapError, Result};

/// Inclusive zoom range of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Map opened when the viewer mounts
    pub default_map: String,
    /// Zoom a freshly loaded map opens at
    pub start_zoom: f64,
    /// Step used by `zoom_in`/`zoom_out`
    pub zoom_delta: f64,
    /// Levels the view may zoom out past level 0
    pub zoom_levels_below_native: u32,
    /// Levels the view may zoom in past the native maximum
    pub zoom_levels_above_native: u32,
    /// Root directory of the tile pyramids
    pub tile_root: PathBuf,
    /// File extension of tile images, without the dot
    pub tile_extension: String,
    /// Loaded tile payloads kept in memory
    pub tile_cache_size: usize,
    /// Screen distance within which a click selects a marker
    pub hit_tolerance: f64,
    /// 1.0 keeps the view inside the canvas, 0.0 disables the limit
    pub max_bounds_viscosity: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_map: DEFAULT_MAP.to_string(),
            start_zoom: DEFAULT_START_ZOOM,
            zoom_delta: DEFAULT_ZOOM_DELTA,
            zoom_levels_below_native: DEFAULT_ZOOM_LEVELS_BELOW_NATIVE,
            zoom_levels_above_native: DEFAULT_ZOOM_LEVELS_ABOVE_NATIVE,
            tile_root: PathBuf::from(DEFAULT_TILE_ROOT),
            tile_extension: DEFAULT_TILE_EXTENSION.to_string(),
            tile_cache_size: DEFAULT_TILE_CACHE_SIZE,
            hit_tolerance: MARKER_ICON_ANCHOR.0 as f64,
            max_bounds_viscosity: 1.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start_zoom.is_finite() {
            return Err(MapError::InvalidConfig("start_zoom must be finite".into()));
        }
        if !(self.zoom_delta.is_finite() && self.zoom_delta > 0.0) {
            return Err(MapError::InvalidConfig("zoom_delta must be positive".into()));
        }
        if self.tile_cache_size == 0 {
            return Err(MapError::InvalidConfig("tile_cache_size must be at least 1".into()));
        }
        if self.tile_extension.is_empty() || self.tile_extension.starts_with('.') {
            return Err(MapError::InvalidConfig(
                "tile_extension must be a bare extension such as \"webp\"".into(),
            ));
        }
        if !(self.hit_tolerance.is_finite() && self.hit_tolerance >= 0.0) {
            return Err(MapError::InvalidConfig("hit_tolerance must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.max_bounds_viscosity) {
            return Err(MapError::InvalidConfig(
                "max_bounds_viscosity must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Zoom range for a pyramid whose finest real level is `native_max_zoom`
    pub fn zoom_range(&self, native_max_zoom: u32) -> ZoomRange {
        ZoomRange {
            min: -(self.zoom_levels_below_native as f64),
            max: (native_max_zoom + self.zoom_levels_above_native) as f64,
        }
    }
}
