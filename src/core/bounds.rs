use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in surface, canvas or screen pixels.
///
/// Edges are inclusive; a marker sitting exactly on the edge of the view is
/// considered inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Rectangle of `width` x `height` centered on `center`
    pub fn from_center_and_size(center: Point, width: f64, height: f64) -> Self {
        let half = Point::new(width / 2.0, height / 2.0);
        Self::new(center.subtract(&half), center.add(&half))
    }

    /// Smallest rectangle holding every point; `None` for no points
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds::new(*first, *first);
        rest.iter().for_each(|p| bounds.extend(p));
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        self.min.add(&self.max).divide(2.0)
    }

    pub fn contains(&self, point: &Point) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    /// True when the rectangles overlap or touch
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Grows the rectangle to cover `point`
    pub fn extend(&mut self, point: &Point) {
        self.min = Point::new(self.min.x.min(point.x), self.min.y.min(point.y));
        self.max = Point::new(self.max.x.max(point.x), self.max.y.max(point.y));
    }

    /// Copy grown by `amount` on every side
    pub fn expanded(&self, amount: f64) -> Bounds {
        let pad = Point::new(amount, amount);
        Bounds::new(self.min.subtract(&pad), self.max.add(&pad))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_sized_bounds() {
        let bounds = Bounds::from_center_and_size(Point::new(256.0, 256.0), 512.0, 512.0);
        assert_eq!(bounds, Bounds::from_coords(0.0, 0.0, 512.0, 512.0));
        assert_eq!((bounds.width(), bounds.height()), (512.0, 512.0));
        assert_eq!(bounds.center(), Point::new(256.0, 256.0));
    }

    #[test]
    fn test_edges_are_inside() {
        let bounds = Bounds::from_coords(0.0, 0.0, 512.0, 512.0);
        assert!(bounds.contains(&Point::new(512.0, 0.0)));
        assert!(!bounds.contains(&Point::new(512.5, 10.0)));
        assert!(bounds.intersects(&Bounds::from_coords(512.0, 512.0, 600.0, 600.0)));
        assert!(!bounds.intersects(&Bounds::from_coords(-20.0, 0.0, -1.0, 10.0)));
    }

    #[test]
    fn test_from_points_and_padding() {
        let points = [Point::new(10.0, 300.0), Point::new(450.0, 20.0), Point::new(100.0, 100.0)];
        let bounds = Bounds::from_points(&points).unwrap();
        assert_eq!(bounds, Bounds::from_coords(10.0, 20.0, 450.0, 300.0));
        assert_eq!(bounds.expanded(15.0), Bounds::from_coords(-5.0, 5.0, 465.0, 315.0));
        assert!(Bounds::from_points(&[]).is_none());
    }
}
