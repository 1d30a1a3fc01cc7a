//! Shared trait abstractions
//!
//! The seams between calibration, layers and the rendering surface.

use crate::{
    core::{
        bounds::Bounds,
        geo::{Point, WorldPoint},
        viewport::Viewport,
    },
    layers::base::LayerType,
    rendering::context::RenderContext,
    Result,
};

/// Maps between world space and surface pixels for one map
pub trait CoordinateTransform {
    /// World position to surface coordinates
    fn project(&self, world: WorldPoint) -> Point;

    /// Surface coordinates back to world space
    fn unproject(&self, point: Point) -> WorldPoint;

    fn project_all(&self, points: &[WorldPoint]) -> Vec<Point> {
        points.iter().map(|p| self.project(*p)).collect()
    }
}

/// Something drawn on a rendering surface: the tile pyramid or one marker group
pub trait LayerOperations: Send + Sync {
    /// Unique id on its surface
    fn id(&self) -> &str;

    /// Human readable name
    fn name(&self) -> &str;

    fn layer_type(&self) -> LayerType;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// 0.0 (transparent) to 1.0
    fn opacity(&self) -> f32;

    /// Draw order, lower first
    fn z_index(&self) -> i32;

    /// Emit draw commands for the current view
    fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()>;

    /// Extent in surface coordinates; `None` means unbounded
    fn bounds(&self) -> Option<Bounds> {
        None
    }

    fn intersects_bounds(&self, bounds: &Bounds) -> bool {
        self.bounds().map_or(true, |own| own.intersects(bounds))
    }

    /// Downcasting to the concrete layer
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
