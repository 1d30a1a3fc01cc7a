//! The rendering surface of one loaded map.
//!
//! A surface owns the viewport, the tile layer and the map's marker groups.
//! It is built by [`SurfaceBuilder`](crate::core::builder::SurfaceBuilder)
//! and owned exclusively by the view controller; a map switch destroys the
//! old surface before the next one is built.

use std::collections::BTreeSet;

use crate::{
    core::{geo::Point, projection::MapProjection, viewport::Viewport},
    layers::{
        annotation::{AnnotationLayers, Reconciliation},
        manager::LayerManager,
        marker::{Marker, MarkerGroup},
        tile::TileLayer,
    },
    rendering::context::RenderContext,
    tiles::loader::{Generation, TileEvent, TileLoader},
    Result,
};

pub struct MapSurface {
    map_name: String,
    generation: Generation,
    projection: MapProjection,
    viewport: Viewport,
    layers: LayerManager,
    annotations: AnnotationLayers,
    tile_layer_id: String,
    destroyed: bool,
}

impl MapSurface {
    pub(crate) fn from_parts(
        map_name: String,
        generation: Generation,
        projection: MapProjection,
        viewport: Viewport,
        layers: LayerManager,
        annotations: AnnotationLayers,
        tile_layer_id: String,
    ) -> Self {
        Self {
            map_name,
            generation,
            projection,
            viewport,
            layers,
            annotations,
            tile_layer_id,
            destroyed: false,
        }
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// Load generation this surface was built under
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn annotations(&self) -> &AnnotationLayers {
        &self.annotations
    }

    pub fn tile_layer(&self) -> Option<&TileLayer> {
        self.layers
            .get_layer(&self.tile_layer_id)
            .and_then(|layer| layer.as_any().downcast_ref::<TileLayer>())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Requests the tiles the current view needs
    pub fn update_tiles(&mut self, loader: &TileLoader) -> usize {
        let generation = self.generation;
        let viewport = &self.viewport;
        self.layers
            .with_layer_mut(&self.tile_layer_id, |layer| {
                layer
                    .as_any_mut()
                    .downcast_mut::<TileLayer>()
                    .map(|tiles| tiles.update(viewport, loader, generation))
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// Applies a finished tile load. Events from another generation are ignored.
    pub fn on_tile_event(&mut self, event: &TileEvent) -> bool {
        if event.generation != self.generation || self.destroyed {
            return false;
        }
        self.layers
            .with_layer_mut(&self.tile_layer_id, |layer| {
                layer
                    .as_any_mut()
                    .downcast_mut::<TileLayer>()
                    .map(|tiles| tiles.on_tile_event(event))
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// Attaches or detaches one marker group
    pub fn set_visible(&mut self, key: &str, visible: bool) -> Result<bool> {
        self.annotations.set_visible(&mut self.layers, key, visible)
    }

    /// Reconciles attached marker groups with `visible_keys`
    pub fn apply_filter(&mut self, visible_keys: &BTreeSet<String>) -> Result<Reconciliation> {
        self.annotations.apply_filter(&mut self.layers, visible_keys)
    }

    pub fn is_attached(&self, key: &str) -> bool {
        self.annotations.is_attached(&self.layers, key)
    }

    /// Markers currently attached to the surface
    pub fn marker_count(&self) -> usize {
        self.annotations.attached_marker_count(&self.layers)
    }

    /// Nearest visible marker within `tolerance` screen pixels of `screen`
    pub fn hit_test(&self, screen: Point, tolerance: f64) -> Option<(&MarkerGroup, &Marker)> {
        let surface = self.viewport.screen_to_surface(screen);
        let radius = tolerance / self.viewport.scale();
        self.annotations.hit_test(&self.layers, &surface, radius)
    }

    /// Draws every visible layer, tiles first
    pub fn render(&self, context: &mut RenderContext) -> Result<()> {
        self.layers.render(context, &self.viewport)
    }

    /// Detaches every layer. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.annotations.detach_all(&mut self.layers);
        self.layers.clear();
        self.destroyed = true;
        log::debug!("surface for {} ({:?}) destroyed", self.map_name, self.generation);
    }
}

impl Drop for MapSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}
