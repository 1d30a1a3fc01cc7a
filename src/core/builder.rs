//! Surface builder
//!
//! Assembles a [`MapSurface`] from a map's calibration: the projection, the
//! viewport with its zoom limits and max bounds, the tile layer and the
//! marker groups. Bounds and marker positions come from one projection.

use crate::{
    core::{
        calibration::MapCalibration,
        config::ViewerConfig,
        geo::Point,
        map::MapSurface,
        projection::{MapProjection, SimpleCrs},
        viewport::Viewport,
    },
    data::{annotation::AnnotationRecord, taxonomy::CategoryTaxonomy},
    layers::{annotation::AnnotationLayers, manager::LayerManager, tile::TileLayer},
    tiles::{
        loader::Generation,
        source::{PyramidTileSource, TileSource},
    },
    Result,
};

/// Builder for the rendering surface of one map
pub struct SurfaceBuilder<'a> {
    map_name: String,
    calibration: &'a MapCalibration,
    config: ViewerConfig,
    size: Point,
    generation: Generation,
    tile_source: Option<Box<dyn TileSource>>,
    records: &'a [AnnotationRecord],
    taxonomy: Option<&'a CategoryTaxonomy>,
}

impl<'a> SurfaceBuilder<'a> {
    pub fn new(map_name: impl Into<String>, calibration: &'a MapCalibration) -> Self {
        Self {
            map_name: map_name.into(),
            calibration,
            config: ViewerConfig::default(),
            size: Point::new(800.0, 600.0),
            generation: Generation::default(),
            tile_source: None,
            records: &[],
            taxonomy: None,
        }
    }

    pub fn with_config(mut self, config: &ViewerConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Container size in screen pixels
    pub fn with_size(mut self, size: Point) -> Self {
        self.size = size;
        self
    }

    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    /// Overrides the tile source; defaults to the on-disk pyramid under the
    /// configured tile root
    pub fn with_tile_source(mut self, source: Box<dyn TileSource>) -> Self {
        self.tile_source = Some(source);
        self
    }

    pub fn with_annotations(mut self, records: &'a [AnnotationRecord], taxonomy: &'a CategoryTaxonomy) -> Self {
        self.records = records;
        self.taxonomy = Some(taxonomy);
        self
    }

    /// Builds the surface. Marker groups are built but not attached; the
    /// caller attaches them according to its filter.
    pub fn build(self) -> Result<MapSurface> {
        self.calibration.validate(&self.map_name)?;
        self.config.validate()?;

        let projection = MapProjection::new(self.calibration);
        let crs = SimpleCrs::new(projection.tile_size());

        let zoom_range = self.config.zoom_range(self.calibration.native_max_zoom);
        let mut viewport = Viewport::new(crs, projection.surface_center(), self.config.start_zoom, self.size);
        viewport.set_zoom_limits(zoom_range.min, zoom_range.max);
        viewport.set_max_bounds(
            Some(projection.surface_bounds()),
            Some(self.config.max_bounds_viscosity),
        );

        let source = match self.tile_source {
            Some(source) => source,
            None => Box::new(PyramidTileSource::new(
                self.map_name.clone(),
                self.config.tile_root.clone(),
                self.config.tile_extension.clone(),
            )),
        };
        let tile_layer_id = format!("{}-tiles", self.map_name);
        let tile_layer = TileLayer::new(
            tile_layer_id.clone(),
            source,
            self.calibration.tile_size,
            self.calibration.native_max_zoom,
        );

        let mut layers = LayerManager::new();
        layers.add_layer(Box::new(tile_layer))?;

        let annotations = match self.taxonomy {
            Some(taxonomy) => AnnotationLayers::build(self.records, &projection, taxonomy),
            None => AnnotationLayers::default(),
        };

        log::debug!(
            "surface for {}: scale ({:.6}, {:.6}), offset ({}, {}), zoom [{}, {}]",
            self.map_name,
            projection.scale().x,
            projection.scale().y,
            projection.offset().x,
            projection.offset().y,
            zoom_range.min,
            zoom_range.max
        );

        Ok(MapSurface::from_parts(
            self.map_name,
            self.generation,
            projection,
            viewport,
            layers,
            annotations,
            tile_layer_id,
        ))
    }
}
