use std::sync::Arc;

use crate::{
    core::{
        bounds::Bounds,
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    prelude::HashMap,
    rendering::context::RenderContext,
    tiles::{
        loader::{Generation, TileEvent, TileLoader, TileOutcome},
        source::{TileAddress, TileSource},
    },
    Result,
};

/// Load state of one tile
#[derive(Debug, Clone)]
pub enum TileState {
    Loading,
    Loaded(Arc<Vec<u8>>),
    /// Rendered as an empty gap; never retried for the surface's lifetime
    Failed(String),
}

/// The map imagery: a pyramid of tiles drawn beneath the markers
pub struct TileLayer {
    properties: LayerProperties,
    source: Box<dyn TileSource>,
    tile_size: f64,
    native_max_zoom: u32,
    tiles: HashMap<TileAddress, TileState>,
    /// Tiles covering the view as of the last `update`
    visible: Vec<(TileCoord, TileAddress)>,
}

impl TileLayer {
    pub fn new(id: String, source: Box<dyn TileSource>, tile_size: u32, native_max_zoom: u32) -> Self {
        let properties = LayerProperties::new(id, "Map imagery".to_string(), LayerType::Tile);
        Self {
            properties,
            source,
            tile_size: tile_size as f64,
            native_max_zoom,
            tiles: HashMap::default(),
            visible: Vec::new(),
        }
    }

    /// Pyramid level drawn at `zoom`. Zooms below 0 reuse level 0 and zooms
    /// past the native maximum upsample the deepest real level.
    pub fn native_level(&self, zoom: f64) -> i32 {
        let max = i32::try_from(self.native_max_zoom).unwrap_or(i32::MAX);
        (zoom.round() as i32).clamp(0, max)
    }

    /// Recomputes the tiles covering `viewport` and requests the ones never
    /// seen before. Returns how many requests were issued.
    pub fn update(&mut self, viewport: &Viewport, loader: &TileLoader, generation: Generation) -> usize {
        let level = self.native_level(viewport.zoom);
        let range = viewport.visible_tiles(level, self.tile_size);
        let mut requested = 0;

        self.visible.clear();
        for coord in range.coords() {
            let Some(address) = self.source.resolve(coord) else {
                continue;
            };
            if !self.tiles.contains_key(&address) {
                self.tiles.insert(address.clone(), TileState::Loading);
                loader.request(generation, address.clone(), self.source.location(&address));
                requested += 1;
            }
            self.visible.push((coord, address));
        }

        if requested > 0 {
            log::debug!(
                "requested {} tiles at level {} for {}",
                requested,
                level,
                self.properties.id
            );
        }
        requested
    }

    /// Records a finished load. Returns false for tiles this layer never asked for.
    pub fn on_tile_event(&mut self, event: &TileEvent) -> bool {
        match self.tiles.get_mut(&event.address) {
            Some(state @ TileState::Loading) => {
                *state = match &event.outcome {
                    TileOutcome::Loaded(data) => TileState::Loaded(Arc::clone(data)),
                    TileOutcome::Failed(reason) => TileState::Failed(reason.clone()),
                };
                true
            }
            _ => false,
        }
    }

    pub fn tile_state(&self, address: &TileAddress) -> Option<&TileState> {
        self.tiles.get(address)
    }

    pub fn visible_tiles(&self) -> impl Iterator<Item = &TileAddress> {
        self.visible.iter().map(|(_, address)| address)
    }

    pub fn pending_count(&self) -> usize {
        self.count(|s| matches!(s, TileState::Loading))
    }

    pub fn loaded_count(&self) -> usize {
        self.count(|s| matches!(s, TileState::Loaded(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, TileState::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&TileState) -> bool) -> usize {
        self.tiles.values().filter(|s| predicate(s)).count()
    }

    fn canvas_rect(&self, coord: &TileCoord) -> (Point, Point) {
        let span = self.tile_size / 2_f64.powi(coord.level);
        let min = Point::new(coord.col as f64 * span, coord.row as f64 * span);
        (min, Point::new(min.x + span, min.y + span))
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        for (coord, address) in &self.visible {
            let data = match self.tiles.get(address) {
                Some(TileState::Loaded(data)) => Some(Arc::clone(data)),
                Some(TileState::Loading) => None,
                Some(TileState::Failed(_)) | None => continue,
            };
            let (min, max) = self.canvas_rect(coord);
            let bounds = (viewport.canvas_to_screen(min), viewport.canvas_to_screen(max));
            context.render_tile(address.clone(), bounds, data, self.properties.opacity)?;
        }
        Ok(())
    }

    fn bounds(&self) -> Option<Bounds> {
        Some(Bounds::from_coords(0.0, 0.0, self.tile_size, self.tile_size))
    }
}
