use crate::core::{
    bounds::Bounds,
    geo::{Point, TileCoord},
    projection::SimpleCrs,
};

/// Inclusive range of tile columns/rows at one pyramid level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub level: i32,
    pub col_min: i64,
    pub col_max: i64,
    pub row_min: i64,
    pub row_max: i64,
}

impl TileRange {
    pub fn is_empty(&self) -> bool {
        self.col_min > self.col_max || self.row_min > self.row_max
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.col_max - self.col_min + 1) * (self.row_max - self.row_min + 1)) as usize
        }
    }

    /// Row-major iteration over every coordinate in the range
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.row_min..=self.row_max).flat_map(move |row| {
            (self.col_min..=self.col_max).map(move |col| TileCoord::new(self.level, col, row))
        })
    }
}

/// Manages the current view of the surface: center, zoom, and screen dimensions.
///
/// `center` is in surface coordinates; canvas coordinates are derived through
/// the surface CRS and grow downward like screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// The center of the view in surface coordinates
    pub center: Point,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in screen pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
    /// Maximum bounds for the view in surface coordinates
    max_bounds: Option<Bounds>,
    /// Viscosity for bounds enforcement (0.0 = loose, 1.0 = solid)
    max_bounds_viscosity: f64,
    crs: SimpleCrs,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(crs: SimpleCrs, center: Point, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom,
            size,
            min_zoom: f64::NEG_INFINITY,
            max_zoom: f64::INFINITY,
            max_bounds: None,
            max_bounds_viscosity: 0.0,
            crs,
        }
    }

    pub fn crs(&self) -> SimpleCrs {
        self.crs
    }

    pub fn max_bounds(&self) -> Option<&Bounds> {
        self.max_bounds.as_ref()
    }

    /// Sets the maximum bounds for the view and re-clamps the center
    pub fn set_max_bounds(&mut self, bounds: Option<Bounds>, viscosity: Option<f64>) {
        self.max_bounds = bounds;
        self.max_bounds_viscosity = viscosity.unwrap_or(0.0).clamp(0.0, 1.0);
        self.center = self.clamp_center(self.center);
    }

    /// Sets the zoom limits, clamping the current zoom into them
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
        self.center = self.clamp_center(self.center);
    }

    /// Sets the center of the viewport with bounds checking
    pub fn set_center(&mut self, center: Point) {
        self.center = self.clamp_center(center);
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.center = self.clamp_center(self.center);
    }

    pub fn zoom_in(&mut self, delta: f64) {
        self.set_zoom(self.zoom + delta);
    }

    pub fn zoom_out(&mut self, delta: f64) {
        self.set_zoom(self.zoom - delta);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
        self.center = self.clamp_center(self.center);
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    fn half_size_canvas(&self) -> Point {
        self.size.divide(2.0 * self.scale())
    }

    /// Converts canvas coordinates to screen pixels (container relative)
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        let center = self.crs.to_canvas(self.center);
        canvas
            .subtract(&center)
            .multiply(self.scale())
            .add(&self.size.divide(2.0))
    }

    /// Converts screen pixels back to canvas coordinates
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        let center = self.crs.to_canvas(self.center);
        screen
            .subtract(&self.size.divide(2.0))
            .divide(self.scale())
            .add(&center)
    }

    pub fn surface_to_screen(&self, point: Point) -> Point {
        self.canvas_to_screen(self.crs.to_canvas(point))
    }

    pub fn screen_to_surface(&self, screen: Point) -> Point {
        self.crs.from_canvas(self.screen_to_canvas(screen))
    }

    /// Visible area in canvas coordinates
    pub fn canvas_bounds(&self) -> Bounds {
        Bounds::from_center_and_size(
            self.crs.to_canvas(self.center),
            self.size.x / self.scale(),
            self.size.y / self.scale(),
        )
    }

    /// Visible area in surface coordinates
    pub fn bounds(&self) -> Bounds {
        self.crs.bounds_to_canvas(&self.canvas_bounds())
    }

    /// Pans the viewport by a screen pixel offset and returns the applied offset
    pub fn pan(&mut self, delta: Point) -> Point {
        let before = self.crs.to_canvas(self.center);
        let target = before.subtract(&delta.divide(self.scale()));
        self.set_center(self.crs.from_canvas(target));
        let after = self.crs.to_canvas(self.center);
        before.subtract(&after).multiply(self.scale())
    }

    /// Zooms to `zoom`, keeping the content under `focus` (screen pixels) fixed
    pub fn zoom_to(&mut self, zoom: f64, focus: Option<Point>) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < 0.001 {
            return;
        }

        match focus {
            Some(focus_screen) => {
                let focus_canvas = self.screen_to_canvas(focus_screen);
                self.zoom = new_zoom;
                let offset = focus_screen
                    .subtract(&self.size.divide(2.0))
                    .divide(self.scale());
                let center = focus_canvas.subtract(&offset);
                self.set_center(self.crs.from_canvas(center));
            }
            None => self.set_zoom(new_zoom),
        }
    }

    /// Tiles of `tile_size` canvas pixels at `level` that intersect the view
    pub fn visible_tiles(&self, level: i32, tile_size: f64) -> TileRange {
        let span = tile_size / 2_f64.powi(level);
        let view = self.canvas_bounds();
        TileRange {
            level,
            col_min: (view.min.x / span).floor() as i64,
            col_max: (view.max.x / span).ceil() as i64 - 1,
            row_min: (view.min.y / span).floor() as i64,
            row_max: (view.max.y / span).ceil() as i64 - 1,
        }
    }

    fn clamp_center(&self, center: Point) -> Point {
        let Some(bounds) = &self.max_bounds else {
            return center;
        };
        if self.max_bounds_viscosity <= 0.0 {
            return center;
        }

        let limits = self.crs.bounds_to_canvas(bounds);
        let half = self.half_size_canvas();
        let canvas = self.crs.to_canvas(center);
        let clamped = Point::new(
            clamp_axis(canvas.x, limits.min.x, limits.max.x, half.x),
            clamp_axis(canvas.y, limits.min.y, limits.max.y, half.y),
        );
        let limited = if self.max_bounds_viscosity >= 1.0 {
            clamped
        } else {
            canvas.subtract(&canvas.subtract(&clamped).multiply(self.max_bounds_viscosity))
        };
        self.crs.from_canvas(limited)
    }
}

/// Keeps a view of half-width `half` inside `[min, max]`, centering when it does not fit
fn clamp_axis(value: f64, min: f64, max: f64, half: f64) -> f64 {
    if max - min <= half * 2.0 {
        (min + max) / 2.0
    } else {
        value.clamp(min + half, max - half)
    }
}
