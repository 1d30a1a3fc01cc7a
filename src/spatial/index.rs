use crate::core::{bounds::Bounds, geo::Point};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A point entry in a [`SpatialIndex`], carrying a payload such as the
/// marker's position in its group
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub id: String,
    pub position: Point,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(id: String, position: Point, data: T) -> Self {
        Self { id, position, data }
    }
}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x, self.position.y])
    }
}

impl<T> PointDistance for SpatialItem<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position.x - point[0];
        let dy = self.position.y - point[1];
        dx * dx + dy * dy
    }
}

fn envelope(bounds: &Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners([bounds.min.x, bounds.min.y], [bounds.max.x, bounds.max.y])
}

/// R-tree over surface coordinates, built once per marker group
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
    bounds: Option<Bounds>,
}

impl<T> SpatialIndex<T> {
    /// Build the tree in one pass
    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        let positions: Vec<Point> = items.iter().map(|item| item.position).collect();
        Self {
            bounds: Bounds::from_points(&positions),
            rtree: RTree::bulk_load(items),
        }
    }

    /// Items inside `bounds`, edges inclusive, in no particular order
    pub fn query(&self, bounds: &Bounds) -> Vec<&SpatialItem<T>> {
        self.rtree.locate_in_envelope(&envelope(bounds)).collect()
    }

    /// Closest item within `radius` of `center`, with its distance
    pub fn nearest_within(&self, center: &Point, radius: f64) -> Option<(&SpatialItem<T>, f64)> {
        let query = [center.x, center.y];
        self.rtree
            .nearest_neighbor(&query)
            .map(|item| (item, item.distance_2(&query).sqrt()))
            .filter(|(_, distance)| *distance <= radius)
    }

    /// Extent of every indexed point; `None` when empty
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds.clone()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }
}
