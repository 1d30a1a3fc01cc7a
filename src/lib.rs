//! # annomap
//!
//! An annotated tiled-map viewer core.
//!
//! A large raster world is shown as a pyramid of image tiles, with
//! categorized point annotations placed on top through a per-map calibrated
//! world → pixel transform. Annotations are grouped into layers per
//! `(category, subcategory)` and toggled by a user filter that survives map
//! switches. Rendering is headless: the viewer produces a draw list that a
//! host (such as the `annomap-app` egui binary) paints.

pub mod core;
pub mod data;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod spatial;
pub mod tiles;
pub mod traits;
pub mod ui;
pub mod viewer;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    bounds::Bounds,
    calibration::{CalibrationRegistry, MapCalibration},
    config::ViewerConfig,
    geo::{Point, TileCoord, WorldExtent, WorldPoint},
    map::MapSurface,
    projection::MapProjection,
    viewport::Viewport,
};

pub use data::{AnnotationCatalog, AnnotationRecord, CategoryTaxonomy};

pub use layers::{base::LayerTrait, manager::LayerManager, marker::Marker, tile::TileLayer};

pub use rendering::{context::DrawCommand, context::RenderContext, style::Color};

pub use tiles::{PyramidTileSource, TileAddress, TileLoader, TileSource};

pub use traits::CoordinateTransform;

pub use viewer::{MarkerClick, ViewController, ViewerState};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("unknown map: {0}")]
    UnknownMap(String),

    #[error("calibration data unavailable")]
    CalibrationUnavailable,

    #[error("invalid calibration for {map}: {reason}")]
    InvalidCalibration { map: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("layer error: {0}")]
    Layer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
