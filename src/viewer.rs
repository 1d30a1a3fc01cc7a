//! The view controller: owns the active rendering surface and drives map
//! switches, filter changes, tile completion and marker clicks.
//!
//! Everything here runs on the caller's (UI) thread. Tile images load in the
//! background and are applied on the next [`ViewController::poll_tiles`];
//! results tagged with an older generation belong to a surface that has been
//! torn down and are dropped.

use std::collections::BTreeSet;

use crate::{
    core::{
        builder::SurfaceBuilder,
        calibration::CalibrationRegistry,
        config::ViewerConfig,
        geo::{Point, WorldPoint},
        map::MapSurface,
    },
    data::{annotation::AnnotationCatalog, taxonomy::CategoryTaxonomy},
    layers::annotation::Reconciliation,
    rendering::context::RenderContext,
    tiles::{
        cache::TileCache,
        loader::{Generation, TileLoader},
    },
    ui::{filter::FilterState, overlay::Overlay, overlay::OverlaySlot, popup::Popup},
    MapError, Result,
};

/// Lifecycle state of the viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    /// Calibration data never loaded; no map can be placed
    Disabled,
    /// No surface
    Empty,
    /// Tearing down the previous surface and building the next one
    Loading { map: String },
    /// A surface for `map` is live
    Ready { map: String },
}

/// Payload handed to the marker-click callback
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerClick {
    pub record_id: String,
    pub key: String,
    /// Display label of the marker's subcategory
    pub label: String,
    /// The record's own label, if it has one
    pub instance_label: Option<String>,
    pub world_position: WorldPoint,
}

type MarkerClickCallback = Box<dyn FnMut(&MarkerClick)>;

pub struct ViewController {
    config: ViewerConfig,
    calibrations: Option<CalibrationRegistry>,
    catalog: AnnotationCatalog,
    taxonomy: CategoryTaxonomy,
    filter: FilterState,
    loader: TileLoader,
    surface: Option<MapSurface>,
    generation: Generation,
    state: ViewerState,
    size: Point,
    popup: OverlaySlot<Popup>,
    on_marker_click: Option<MarkerClickCallback>,
}

impl ViewController {
    /// Creates a viewer bound to a container of `size` screen pixels.
    ///
    /// A failed calibration load leaves the viewer `Disabled` instead of
    /// failing construction.
    pub fn new(
        size: Point,
        calibrations: Result<CalibrationRegistry>,
        catalog: AnnotationCatalog,
        taxonomy: CategoryTaxonomy,
        config: ViewerConfig,
    ) -> Self {
        let (calibrations, state) = match calibrations {
            Ok(registry) => (Some(registry), ViewerState::Empty),
            Err(e) => {
                log::error!("calibration data unavailable, viewer disabled: {}", e);
                (None, ViewerState::Disabled)
            }
        };
        let filter = FilterState::all(&taxonomy);
        let loader = TileLoader::filesystem(TileCache::new(config.tile_cache_size));

        Self {
            config,
            calibrations,
            catalog,
            taxonomy,
            filter,
            loader,
            surface: None,
            generation: Generation::default(),
            state,
            size,
            popup: OverlaySlot::new(),
            on_marker_click: None,
        }
    }

    /// Replaces the tile loader, e.g. to read tiles from somewhere other than disk
    pub fn with_tile_loader(mut self, loader: TileLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Loads the configured default map
    pub fn mount(&mut self) -> Result<()> {
        let map = self.config.default_map.clone();
        self.load_map(&map)
    }

    /// Switches to `name`. An unknown name leaves the current view untouched;
    /// otherwise the old surface is destroyed before the new one is built.
    pub fn load_map(&mut self, name: &str) -> Result<()> {
        let Some(registry) = &self.calibrations else {
            log::error!("cannot load {}: calibration data unavailable", name);
            return Err(MapError::CalibrationUnavailable);
        };
        let calibration = match registry.get(name) {
            Ok(calibration) => calibration.clone(),
            Err(e) => {
                log::error!("cannot load map: {}", e);
                return Err(e);
            }
        };

        self.state = ViewerState::Loading {
            map: name.to_string(),
        };
        self.teardown_surface();
        self.generation = self.generation.next();

        let built = SurfaceBuilder::new(name, &calibration)
            .with_config(&self.config)
            .with_size(self.size)
            .with_generation(self.generation)
            .with_annotations(self.catalog.records_for(name), &self.taxonomy)
            .build();
        let mut surface = match built {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("failed to build surface for {}: {}", name, e);
                self.state = ViewerState::Empty;
                return Err(e);
            }
        };

        if let Err(e) = surface.apply_filter(self.filter.visible_keys()) {
            log::error!("failed to attach marker groups for {}: {}", name, e);
            surface.destroy();
            self.state = ViewerState::Empty;
            return Err(e);
        }
        surface.update_tiles(&self.loader);

        log::info!(
            "loaded map {} ({:?}): {} marker groups, {} markers shown",
            name,
            self.generation,
            surface.annotations().len(),
            surface.marker_count()
        );
        self.surface = Some(surface);
        self.state = ViewerState::Ready {
            map: name.to_string(),
        };
        Ok(())
    }

    /// Releases the surface and every layer
    pub fn destroy(&mut self) {
        self.teardown_surface();
        if self.state != ViewerState::Disabled {
            self.state = ViewerState::Empty;
        }
    }

    fn teardown_surface(&mut self) {
        self.popup.close();
        if let Some(mut surface) = self.surface.take() {
            surface.destroy();
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn active_map(&self) -> Option<&str> {
        self.surface.as_ref().map(|s| s.map_name())
    }

    pub fn surface(&self) -> Option<&MapSurface> {
        self.surface.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Map names that can be loaded, sorted
    pub fn available_maps(&self) -> Vec<&str> {
        self.calibrations
            .as_ref()
            .map(|registry| registry.names().collect())
            .unwrap_or_default()
    }

    /// Markers attached to the active surface
    pub fn marker_count(&self) -> usize {
        self.surface.as_ref().map(|s| s.marker_count()).unwrap_or(0)
    }

    // --- filter -----------------------------------------------------------------------------

    /// Replaces the filter with `visible_keys` and reconciles the surface
    pub fn apply_filter<I, S>(&mut self, visible_keys: I) -> Result<Reconciliation>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.replace(visible_keys);
        self.sync_filter()
    }

    /// Checks or unchecks one subcategory
    pub fn set_visible(&mut self, key: &str, visible: bool) -> Result<bool> {
        self.filter.set_subcategory(key, visible);
        let changed = match self.surface.as_mut() {
            Some(surface) => surface.set_visible(key, visible)?,
            None => false,
        };
        self.close_hidden_popup();
        Ok(changed)
    }

    /// Checks or unchecks every subcategory under `category`
    pub fn set_category(&mut self, category: &str, visible: bool) -> Result<Reconciliation> {
        self.filter.set_category(&self.taxonomy, category, visible);
        self.sync_filter()
    }

    pub fn is_category_checked(&self, category: &str) -> bool {
        self.filter.is_category_checked(&self.taxonomy, category)
    }

    pub fn show_all(&mut self) -> Result<Reconciliation> {
        self.filter.show_all(&self.taxonomy);
        self.sync_filter()
    }

    pub fn hide_all(&mut self) -> Result<Reconciliation> {
        self.filter.hide_all();
        self.sync_filter()
    }

    fn sync_filter(&mut self) -> Result<Reconciliation> {
        let outcome = match self.surface.as_mut() {
            Some(surface) => surface.apply_filter(self.filter.visible_keys())?,
            None => Reconciliation::default(),
        };
        self.close_hidden_popup();
        Ok(outcome)
    }

    /// Closes the popup if its marker's group was just detached
    fn close_hidden_popup(&mut self) {
        let popup_hidden = match (self.popup.current(), self.surface.as_ref()) {
            (Some(popup), Some(surface)) => !surface.is_attached(&popup.key),
            _ => false,
        };
        if popup_hidden {
            self.popup.close();
        }
    }

    // --- tiles ------------------------------------------------------------------------------

    /// Applies every finished tile load. Returns how many were applied to
    /// the live surface; stale results are dropped.
    pub fn poll_tiles(&mut self) -> usize {
        let mut applied = 0;
        for event in self.loader.drain() {
            match self.surface.as_mut() {
                Some(surface) if surface.generation() == event.generation => {
                    if surface.on_tile_event(&event) {
                        applied += 1;
                    }
                }
                _ => log::debug!(
                    "dropping stale tile {} from {:?} (current {:?})",
                    event.address,
                    event.generation,
                    self.generation
                ),
            }
        }
        applied
    }

    pub fn tile_loader(&self) -> &TileLoader {
        &self.loader
    }

    // --- view -------------------------------------------------------------------------------

    /// Resizes the container
    pub fn resize(&mut self, size: Point) {
        self.size = size;
        self.update_view(|viewport| viewport.set_size(size));
    }

    pub fn zoom_in(&mut self) {
        let delta = self.config.zoom_delta;
        self.update_view(|viewport| viewport.zoom_in(delta));
    }

    pub fn zoom_out(&mut self) {
        let delta = self.config.zoom_delta;
        self.update_view(|viewport| viewport.zoom_out(delta));
    }

    /// Zooms keeping the point under `focus` (screen pixels) fixed
    pub fn zoom_to(&mut self, zoom: f64, focus: Option<Point>) {
        self.update_view(|viewport| viewport.zoom_to(zoom, focus));
    }

    /// Pans by a screen pixel offset
    pub fn pan(&mut self, delta: Point) {
        self.update_view(|viewport| {
            viewport.pan(delta);
        });
    }

    fn update_view(&mut self, change: impl FnOnce(&mut crate::core::viewport::Viewport)) {
        if let Some(surface) = self.surface.as_mut() {
            change(surface.viewport_mut());
            surface.update_tiles(&self.loader);
        }
    }

    /// Draw list for the current frame; empty without a surface
    pub fn render(&self) -> Result<RenderContext> {
        let mut context = RenderContext::new(self.size.x.max(0.0) as u32, self.size.y.max(0.0) as u32);
        if let Some(surface) = &self.surface {
            surface.render(&mut context)?;
        }
        Ok(context)
    }

    // --- markers ----------------------------------------------------------------------------

    /// Registers the callback invoked when a marker is clicked
    pub fn on_marker_click(&mut self, callback: impl FnMut(&MarkerClick) + 'static) {
        self.on_marker_click = Some(Box::new(callback));
    }

    /// Handles a click at `screen`. A hit opens the marker's popup and fires
    /// the callback; a miss closes any open popup.
    pub fn click(&mut self, screen: Point) -> Option<MarkerClick> {
        let tolerance = self.config.hit_tolerance;
        let hit = self.surface.as_ref().and_then(|surface| {
            surface.hit_test(screen, tolerance).map(|(group, marker)| {
                let click = MarkerClick {
                    record_id: marker.record_id.clone(),
                    key: group.key().to_string(),
                    label: marker.popup.title.clone(),
                    instance_label: marker.popup.body.clone(),
                    world_position: marker.world_position,
                };
                (click, Popup::for_marker(group.key(), marker))
            })
        });

        match hit {
            Some((click, popup)) => {
                self.popup.open(popup);
                if let Some(callback) = self.on_marker_click.as_mut() {
                    callback(&click);
                }
                Some(click)
            }
            None => {
                self.popup.close();
                None
            }
        }
    }

    pub fn open_popup(&self) -> Option<&Popup> {
        self.popup.current()
    }

    pub fn close_popup(&mut self) -> bool {
        self.popup.close()
    }

    /// Keys of the active map's marker groups
    pub fn group_keys(&self) -> BTreeSet<String> {
        self.surface
            .as_ref()
            .map(|s| s.annotations().keys().map(String::from).collect())
            .unwrap_or_default()
    }
}

impl Overlay for ViewController {
    fn id(&self) -> &str {
        "map-viewer"
    }

    fn teardown(&mut self) {
        self.destroy();
    }
}
