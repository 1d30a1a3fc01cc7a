use std::sync::Arc;

use crate::{
    core::{
        bounds::Bounds,
        constants::{MARKER_ICON_ANCHOR, MARKER_ICON_SIZE},
        geo::{Point, WorldPoint},
        projection::MapProjection,
        viewport::Viewport,
    },
    data::{annotation::AnnotationRecord, taxonomy::CategoryTaxonomy},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    rendering::{context::RenderContext, style::Color},
    spatial::index::{SpatialIndex, SpatialItem},
    traits::CoordinateTransform,
    Result,
};

/// Marker layers sit above the tile layer
pub const MARKER_Z_INDEX: i32 = 100;

/// One icon's extent in surface units at the current zoom
pub fn icon_padding(viewport: &Viewport) -> f64 {
    MARKER_ICON_SIZE.0.max(MARKER_ICON_SIZE.1) as f64 / viewport.scale()
}

/// Glyph badge drawn for one marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerIcon {
    pub glyph: String,
    pub color: Color,
    /// Width and height in screen pixels
    pub size: (f64, f64),
    /// Hot-spot inside the icon, in screen pixels from its top-left corner
    pub anchor: (f64, f64),
}

impl MarkerIcon {
    pub fn new(glyph: impl Into<String>, color: Color) -> Self {
        Self {
            glyph: glyph.into(),
            color,
            size: (MARKER_ICON_SIZE.0 as f64, MARKER_ICON_SIZE.1 as f64),
            anchor: (MARKER_ICON_ANCHOR.0 as f64, MARKER_ICON_ANCHOR.1 as f64),
        }
    }
}

/// Popup content shown when a marker is opened
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub title: String,
    pub body: Option<String>,
}

/// One annotation placed on the surface
#[derive(Debug, Clone)]
pub struct Marker {
    pub record_id: String,
    /// Surface position, already projected and offset
    pub position: Point,
    pub world_position: WorldPoint,
    pub icon: MarkerIcon,
    pub popup: MarkerPopup,
}

impl Marker {
    /// Places `record` through `projection` and styles it from `taxonomy`
    pub fn from_record(
        record: &AnnotationRecord,
        projection: &MapProjection,
        taxonomy: &CategoryTaxonomy,
    ) -> Self {
        let icon = MarkerIcon::new(
            taxonomy.glyph(&record.category, &record.subcategory),
            taxonomy.color(&record.category),
        );
        let popup = MarkerPopup {
            title: taxonomy
                .display_label(&record.category, &record.subcategory)
                .to_string(),
            body: record.label.clone(),
        };

        Self {
            record_id: record.id.clone(),
            position: projection.project(record.world_position),
            world_position: record.world_position,
            icon,
            popup,
        }
    }
}

/// Every placed marker sharing one `(category, subcategory)` key on the
/// active map, with an R-tree over their surface positions
pub struct MarkerGroup {
    key: String,
    category: String,
    subcategory: String,
    label: String,
    markers: Vec<Marker>,
    index: SpatialIndex<usize>,
}

impl MarkerGroup {
    pub fn new(
        key: String,
        category: String,
        subcategory: String,
        label: String,
        markers: Vec<Marker>,
    ) -> Self {
        let items = markers
            .iter()
            .enumerate()
            .map(|(i, m)| SpatialItem::new(m.record_id.clone(), m.position, i))
            .collect();

        Self {
            key,
            category,
            subcategory,
            label,
            markers,
            index: SpatialIndex::bulk_load(items),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Surface bounds of every marker position
    pub fn bounds(&self) -> Option<Bounds> {
        self.index.bounds()
    }

    /// Nearest marker within `radius` surface units of `point`
    pub fn nearest(&self, point: &Point, radius: f64) -> Option<(&Marker, f64)> {
        self.index
            .nearest_within(point, radius)
            .and_then(|(item, distance)| self.markers.get(item.data).map(|m| (m, distance)))
    }

    /// Markers inside `bounds`, in placement order
    pub fn markers_in(&self, bounds: &Bounds) -> Vec<&Marker> {
        let mut hits: Vec<usize> = self.index.query(bounds).into_iter().map(|item| item.data).collect();
        hits.sort_unstable();
        hits.into_iter().filter_map(|i| self.markers.get(i)).collect()
    }
}

/// Surface layer showing one marker group. Cheap to create: the group is
/// shared, so attaching and detaching never re-derives positions.
pub struct MarkerLayer {
    properties: LayerProperties,
    group: Arc<MarkerGroup>,
}

impl MarkerLayer {
    pub fn new(group: Arc<MarkerGroup>) -> Self {
        let properties = LayerProperties::new(
            group.key().to_string(),
            group.label().to_string(),
            LayerType::Marker,
        )
        .with_z_index(MARKER_Z_INDEX);
        Self { properties, group }
    }

    pub fn group(&self) -> &Arc<MarkerGroup> {
        &self.group
    }
}

impl LayerTrait for MarkerLayer {
    crate::impl_layer_trait!(MarkerLayer, properties);

    fn render(&self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        // pad by one icon so markers straddling the edge are still drawn
        let view = viewport.bounds().expanded(icon_padding(viewport));

        for marker in self.group.markers_in(&view) {
            let screen = viewport.surface_to_screen(marker.position);
            context.render_marker(
                &marker.record_id,
                self.group.key(),
                screen,
                &marker.icon,
                self.properties.opacity,
            );
        }
        Ok(())
    }

    fn bounds(&self) -> Option<Bounds> {
        self.group.bounds()
    }
}
