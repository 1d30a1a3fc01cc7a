use serde::{Deserialize, Serialize};

/// A position in the game's native coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for WorldPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in surface, canvas or screen pixel coordinates.
/// Serialized as an `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn divide(&self, scalar: f64) -> Point {
        Point::new(self.x / scalar, self.y / scalar)
    }

    pub fn floor(&self) -> Point {
        Point::new(self.x.floor(), self.y.floor())
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<[f64; 2]> for Point {
    fn from(value: [f64; 2]) -> Self {
        Point::new(value[0], value[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(value: Point) -> Self {
        [value.x, value.y]
    }
}

/// Axis-aligned rectangle in world space, authored as `[minX, minY, maxX, maxY]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct WorldExtent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl WorldExtent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Largest axis of the extent; every map normalizes this axis to one tile
    pub fn reference_dimension(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, point: &WorldPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    pub fn corners(&self) -> [WorldPoint; 4] {
        [
            WorldPoint::new(self.min_x, self.min_y),
            WorldPoint::new(self.max_x, self.min_y),
            WorldPoint::new(self.max_x, self.max_y),
            WorldPoint::new(self.min_x, self.max_y),
        ]
    }

    /// Strictly positive size on both axes with finite coordinates
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }
}

impl From<[f64; 4]> for WorldExtent {
    fn from(value: [f64; 4]) -> Self {
        WorldExtent::new(value[0], value[1], value[2], value[3])
    }
}

impl From<WorldExtent> for [f64; 4] {
    fn from(value: WorldExtent) -> Self {
        [value.min_x, value.min_y, value.max_x, value.max_y]
    }
}

/// A tile request in pyramid space.
///
/// Signed on purpose: the surface may ask for negative levels (zoomed out past
/// level 0) and for columns/rows outside the pyramid at its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub level: i32,
    pub col: i64,
    pub row: i64,
}

impl TileCoord {
    pub fn new(level: i32, col: i64, row: i64) -> Self {
        Self { level, col, row }
    }

    /// Number of tiles along each axis at `level`; levels below zero share level 0
    pub fn tiles_at_level(level: i32) -> i64 {
        1_i64 << level.clamp(0, 62)
    }

    /// Gets the parent tile at the next coarser level
    pub fn parent(&self) -> Option<TileCoord> {
        if self.level <= 0 {
            None
        } else {
            Some(TileCoord::new(
                self.level - 1,
                self.col.div_euclid(2),
                self.row.div_euclid(2),
            ))
        }
    }

    /// Checks if the tile lies inside the pyramid at its (clamped) level
    pub fn is_valid(&self) -> bool {
        let max_coord = Self::tiles_at_level(self.level);
        (0..max_coord).contains(&self.col) && (0..max_coord).contains(&self.row)
    }
}
