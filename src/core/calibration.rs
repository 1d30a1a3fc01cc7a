//! Per-map calibration registry.
//!
//! Calibration records carry everything needed to place a map's world
//! coordinates on its tile pyramid, including the hand-tuned scale and offset
//! corrections some maps need. Those corrections are plain data keyed by map
//! name; adding a map never requires a code change.

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::core::constants::{DEFAULT_NATIVE_MAX_ZOOM, DEFAULT_TILE_SIZE};
use crate::core::geo::{Point, WorldExtent};
use crate::{MapError, Result};

fn default_native_max_zoom() -> u32 {
    DEFAULT_NATIVE_MAX_ZOOM
}

fn unit_scale() -> Point {
    Point::new(1.0, 1.0)
}

/// Static geometry parameters of one map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCalibration {
    pub world_extent: WorldExtent,
    /// Edge length of one square tile, in pixels
    pub tile_size: u32,
    pub tiles_wide: u32,
    pub tiles_high: u32,
    /// Highest pyramid level with real tiles
    #[serde(default = "default_native_max_zoom")]
    pub native_max_zoom: u32,
    /// Empirical per-axis scale correction
    #[serde(default = "unit_scale")]
    pub manual_scale_multiplier: Point,
    /// Empirical pixel offset applied after the vertical flip
    #[serde(default)]
    pub manual_offset: Point,
}

impl MapCalibration {
    pub fn new(world_extent: WorldExtent, tile_size: u32, tiles_wide: u32, tiles_high: u32) -> Self {
        Self {
            world_extent,
            tile_size,
            tiles_wide,
            tiles_high,
            native_max_zoom: DEFAULT_NATIVE_MAX_ZOOM,
            manual_scale_multiplier: unit_scale(),
            manual_offset: Point::default(),
        }
    }

    pub fn with_native_max_zoom(mut self, level: u32) -> Self {
        self.native_max_zoom = level;
        self
    }

    pub fn with_scale_multiplier(mut self, x: f64, y: f64) -> Self {
        self.manual_scale_multiplier = Point::new(x, y);
        self
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.manual_offset = Point::new(x, y);
        self
    }

    /// Checks the record against the calibration invariants
    pub fn validate(&self, map: &str) -> Result<()> {
        let invalid = |reason: &str| MapError::InvalidCalibration {
            map: map.to_string(),
            reason: reason.to_string(),
        };

        if !self.world_extent.is_valid() {
            return Err(invalid("world extent must be positive on both axes"));
        }
        if self.tile_size == 0 {
            return Err(invalid("tile size must be positive"));
        }
        if self.tiles_wide == 0 || self.tiles_high == 0 {
            return Err(invalid("tile grid must have at least one tile per axis"));
        }
        let multiplier = self.manual_scale_multiplier;
        if !multiplier.x.is_finite()
            || !multiplier.y.is_finite()
            || multiplier.x == 0.0
            || multiplier.y == 0.0
        {
            return Err(invalid("scale multipliers must be finite and nonzero"));
        }
        if !self.manual_offset.x.is_finite() || !self.manual_offset.y.is_finite() {
            return Err(invalid("manual offset must be finite"));
        }
        Ok(())
    }
}

/// Lookup table from map name to calibration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalibrationRegistry {
    maps: BTreeMap<String, MapCalibration>,
}

impl CalibrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shipped maps with their tuned corrections
    pub fn builtin() -> Self {
        let entries = [
            (
                "dam",
                MapCalibration::new(WorldExtent::new(0.0, 0.0, 8192.0, 8192.0), DEFAULT_TILE_SIZE, 16, 16),
            ),
            (
                "spaceport",
                MapCalibration::new(WorldExtent::new(0.0, 0.0, 9216.0, 6144.0), DEFAULT_TILE_SIZE, 9, 6)
                    .with_scale_multiplier(0.56, 0.56),
            ),
            (
                "buried-city",
                MapCalibration::new(WorldExtent::new(0.0, 0.0, 15360.0, 10240.0), DEFAULT_TILE_SIZE, 15, 10)
                    .with_scale_multiplier(0.93, 0.93)
                    .with_offset(2.0, -2.0),
            ),
            (
                "blue-gate",
                MapCalibration::new(WorldExtent::new(0.0, 0.0, 10240.0, 8192.0), DEFAULT_TILE_SIZE, 10, 8)
                    .with_scale_multiplier(0.53, 0.53)
                    .with_offset(-50.5, 11.0),
            ),
        ];

        Self {
            maps: entries
                .into_iter()
                .map(|(name, calibration)| (name.to_string(), calibration))
                .collect(),
        }
    }

    /// Parses a calibration document keyed by map name and validates every entry
    pub fn from_json(json: &str) -> Result<Self> {
        let registry: CalibrationRegistry = serde_json::from_str(json)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let registry: CalibrationRegistry = serde_json::from_reader(reader)?;
        registry.validate()?;
        Ok(registry)
    }

    fn validate(&self) -> Result<()> {
        for (name, calibration) in &self.maps {
            calibration.validate(name)?;
        }
        Ok(())
    }

    /// Adds or replaces a map's calibration after validating it
    pub fn insert(&mut self, name: impl Into<String>, calibration: MapCalibration) -> Result<()> {
        let name = name.into();
        calibration.validate(&name)?;
        self.maps.insert(name, calibration);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&MapCalibration> {
        self.maps
            .get(name)
            .ok_or_else(|| MapError::UnknownMap(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.maps.contains_key(name)
    }

    /// Map names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapCalibration)> {
        self.maps.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
