use std::sync::Arc;

use crate::{
    core::geo::Point,
    layers::marker::MarkerIcon,
    tiles::source::TileAddress,
    MapError, Result,
};

/// Headless render target for one frame: layers push draw commands and the
/// host paints them in order. Anything wholly outside the screen is culled.
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    drawing_queue: Vec<DrawCommand>,
}

/// One primitive for the host to paint. Coordinates are screen pixels
/// relative to the viewer's container.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// One pyramid tile; `data` is `None` while the image is still loading
    Tile {
        address: TileAddress,
        bounds: (Point, Point), // min, max
        data: Option<Arc<Vec<u8>>>,
        opacity: f32,
    },
    /// One annotation marker; `position` is where the icon anchor sits
    Marker {
        record_id: String,
        key: String,
        position: Point,
        icon: MarkerIcon,
        opacity: f32,
    },
}

impl RenderContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
        }
    }

    /// Queue a tile covering the screen rectangle `bounds`
    pub fn render_tile(
        &mut self,
        address: TileAddress,
        bounds: (Point, Point),
        data: Option<Arc<Vec<u8>>>,
        opacity: f32,
    ) -> Result<()> {
        let (min, max) = bounds;
        if !(min.x < max.x && min.y < max.y) {
            return Err(MapError::Layer(format!("invalid bounds for tile {}", address)));
        }
        if self.offscreen(min, max) {
            return Ok(());
        }

        self.drawing_queue.push(DrawCommand::Tile {
            address,
            bounds,
            data,
            opacity: opacity.clamp(0.0, 1.0),
        });
        Ok(())
    }

    /// Queue a marker icon anchored at `position`
    pub fn render_marker(
        &mut self,
        record_id: &str,
        key: &str,
        position: Point,
        icon: &MarkerIcon,
        opacity: f32,
    ) {
        let min = position.subtract(&Point::new(icon.anchor.0, icon.anchor.1));
        let max = min.add(&Point::new(icon.size.0, icon.size.1));
        if self.offscreen(min, max) {
            return;
        }

        self.drawing_queue.push(DrawCommand::Marker {
            record_id: record_id.to_string(),
            key: key.to_string(),
            position,
            icon: icon.clone(),
            opacity: opacity.clamp(0.0, 1.0),
        });
    }

    /// Commands in paint order
    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    pub fn tile_count(&self) -> usize {
        self.count(|cmd| matches!(cmd, DrawCommand::Tile { .. }))
    }

    pub fn marker_count(&self) -> usize {
        self.count(|cmd| matches!(cmd, DrawCommand::Marker { .. }))
    }

    fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.drawing_queue.iter().filter(|cmd| pred(*cmd)).count()
    }

    fn offscreen(&self, min: Point, max: Point) -> bool {
        max.x < 0.0 || max.y < 0.0 || min.x > self.width as f64 || min.y > self.height as f64
    }
}
