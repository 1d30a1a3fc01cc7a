//! World-space → surface-space transform.
//!
//! One [`MapProjection`] is derived per map load and is the only place the
//! scale and offset values live: the surface's logical bounds and every marker
//! position are computed through the same instance, so tiles and markers
//! cannot drift apart as the zoom changes.

use crate::core::bounds::Bounds;
use crate::core::calibration::MapCalibration;
use crate::core::geo::{Point, WorldPoint};
use crate::traits::CoordinateTransform;

/// Calibrated transform from a map's world space into surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    tile_size: f64,
    scale: Point,
    offset: Point,
}

impl MapProjection {
    pub fn new(calibration: &MapCalibration) -> Self {
        let tile_size = calibration.tile_size as f64;
        let base = tile_size / calibration.world_extent.reference_dimension();
        let multiplier = calibration.manual_scale_multiplier;

        Self {
            tile_size,
            scale: Point::new(base * multiplier.x, base * multiplier.y),
            offset: calibration.manual_offset,
        }
    }

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Effective per-axis scale, manual multiplier included
    pub fn scale(&self) -> Point {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Logical bounds of the surface: one tile at level 0
    pub fn surface_bounds(&self) -> Bounds {
        Bounds::from_coords(0.0, 0.0, self.tile_size, self.tile_size)
    }

    /// Surface-space point at the middle of the canvas
    pub fn surface_center(&self) -> Point {
        self.surface_bounds().center()
    }

    /// Projected position without the manual offset
    pub fn project_unadjusted(&self, world: WorldPoint) -> Point {
        let pixel_x = world.x * self.scale.x;
        let pixel_y = world.y * self.scale.y;
        Point::new(pixel_x, self.tile_size - pixel_y)
    }
}

impl CoordinateTransform for MapProjection {
    fn project(&self, world: WorldPoint) -> Point {
        self.project_unadjusted(world).add(&self.offset)
    }

    fn unproject(&self, point: Point) -> WorldPoint {
        let unshifted = point.subtract(&self.offset);
        WorldPoint::new(
            unshifted.x / self.scale.x,
            (self.tile_size - unshifted.y) / self.scale.y,
        )
    }
}

/// Simple CRS of the rendering surface.
///
/// Surface coordinates grow upward while the canvas grows downward, so the
/// vertical axis is mirrored around the canvas height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleCrs {
    height: f64,
}

impl SimpleCrs {
    pub fn new(height: f64) -> Self {
        Self { height }
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn to_canvas(&self, point: Point) -> Point {
        Point::new(point.x, self.height - point.y)
    }

    pub fn from_canvas(&self, point: Point) -> Point {
        Point::new(point.x, self.height - point.y)
    }

    pub fn bounds_to_canvas(&self, bounds: &Bounds) -> Bounds {
        let a = self.to_canvas(bounds.min);
        let b = self.to_canvas(bounds.max);
        Bounds::from_coords(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }
}
