use crate::{
    core::viewport::Viewport,
    layers::{
        base::{LayerTrait, LayerType},
        marker::icon_padding,
    },
    rendering::context::RenderContext,
    MapError, Result,
};

use crate::prelude::HashMap;

/// The layers attached to one rendering surface, kept in z-order.
///
/// Layer ids are unique per surface; marker groups use their
/// `category_subcategory` key as id, so attaching a group twice is refused.
#[derive(Default)]
pub struct LayerManager {
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ids sorted by z-index, ties in attach order
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let id = layer.id().to_string();
        if self.layers.contains_key(&id) {
            return Err(MapError::Layer(format!("layer {} is already attached", id)));
        }

        let z_index = layer.z_index();
        let layers = &self.layers;
        let slot = self
            .render_order
            .iter()
            .position(|other| layers.get(other).map_or(false, |l| l.z_index() > z_index))
            .unwrap_or(self.render_order.len());

        log::debug!("attach layer {} ({}, z {})", id, layer.name(), z_index);
        self.render_order.insert(slot, id.clone());
        self.layers.insert(id, layer);
        Ok(())
    }

    pub fn remove_layer(&mut self, id: &str) -> Option<Box<dyn LayerTrait>> {
        let removed = self.layers.remove(id)?;
        self.render_order.retain(|other| other != id);
        Some(removed)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    pub fn get_layer(&self, id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(id).map(|l| l.as_ref())
    }

    /// Runs `f` on one layer, `None` if it is not attached
    pub fn with_layer_mut<F, R>(&mut self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(id).map(|layer| f(layer.as_mut()))
    }

    /// Layer ids, bottom first
    pub fn list_layers(&self) -> Vec<String> {
        self.render_order.clone()
    }

    /// Ids of every attached layer of one type, bottom first
    pub fn ids_of_type(&self, layer_type: LayerType) -> Vec<String> {
        self.render_order
            .iter()
            .filter(|id| self.layers.get(*id).map_or(false, |l| l.layer_type() == layer_type))
            .cloned()
            .collect()
    }

    /// Draws visible layers that overlap the view, bottom first. Marker
    /// layers are tested against a view grown by one icon.
    pub fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let view = viewport.bounds();
        let marker_view = view.expanded(icon_padding(viewport));
        let drawable = self
            .render_order
            .iter()
            .filter_map(|id| self.layers.get(id))
            .filter(|layer| {
                let area = match layer.layer_type() {
                    LayerType::Marker => &marker_view,
                    _ => &view,
                };
                layer.is_visible() && layer.intersects_bounds(area)
            });

        for layer in drawable {
            layer.render(context, viewport)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.render_order.clear();
        self.layers.clear();
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
