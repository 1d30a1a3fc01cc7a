//! Prelude module for common annomap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use annomap::prelude::*;`

pub use crate::core::{
    bounds::Bounds,
    builder::SurfaceBuilder,
    calibration::{CalibrationRegistry, MapCalibration},
    config::{ViewerConfig, ZoomRange},
    geo::{Point, TileCoord, WorldExtent, WorldPoint},
    map::MapSurface,
    projection::{MapProjection, SimpleCrs},
    viewport::Viewport,
};

pub use crate::data::{
    annotation::{AnnotationCatalog, AnnotationRecord},
    taxonomy::{layer_key, CategoryTaxonomy},
};

pub use crate::layers::{
    annotation::{AnnotationLayers, Reconciliation},
    base::LayerTrait,
    manager::LayerManager,
    marker::{Marker, MarkerGroup, MarkerIcon, MarkerPopup},
    tile::{TileLayer, TileState},
};

pub use crate::spatial::index::{SpatialIndex, SpatialItem};

pub use crate::tiles::{
    cache::TileCache,
    loader::{Generation, TileEvent, TileFetch, TileLoader, TileOutcome},
    source::{PyramidTileSource, TileAddress, TileSource},
};

pub use crate::rendering::{
    context::{DrawCommand, RenderContext},
    style::Color,
};

pub use crate::traits::CoordinateTransform;

pub use crate::ui::{FilterState, Overlay, OverlaySlot, Popup};

pub use crate::viewer::{MarkerClick, ViewController, ViewerState};

pub use crate::{MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
