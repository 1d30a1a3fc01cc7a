//! Grouping of a map's annotations into toggleable marker layers.
//!
//! Groups are built once per map load. Visibility changes only attach or
//! detach the prebuilt layers on the surface, so marker positions are never
//! recomputed by a filter change.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{
    core::{geo::Point, projection::MapProjection},
    data::{annotation::AnnotationRecord, taxonomy::CategoryTaxonomy},
    layers::{
        base::LayerType,
        manager::LayerManager,
        marker::{Marker, MarkerGroup, MarkerLayer},
    },
    Result,
};

/// Whether `key` names an attached marker layer. Marker groups share the
/// layer id namespace with the tile layer.
fn attached(layers: &LayerManager, key: &str) -> bool {
    layers
        .get_layer(key)
        .map_or(false, |layer| layer.layer_type() == LayerType::Marker)
}

/// Changes made by one filter reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub added: usize,
    pub removed: usize,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// The marker groups of the active map, keyed by `category_subcategory`
#[derive(Default)]
pub struct AnnotationLayers {
    groups: BTreeMap<String, Arc<MarkerGroup>>,
}

impl AnnotationLayers {
    /// Partitions `records` by key and places every record through `projection`
    pub fn build(
        records: &[AnnotationRecord],
        projection: &MapProjection,
        taxonomy: &CategoryTaxonomy,
    ) -> Self {
        let mut buckets: BTreeMap<String, Vec<&AnnotationRecord>> = BTreeMap::new();
        for record in records {
            buckets.entry(record.key()).or_default().push(record);
        }

        let groups = buckets
            .into_iter()
            .filter_map(|(key, records)| {
                let first = records.first()?;
                let (category, subcategory) = (first.category.clone(), first.subcategory.clone());
                let label = taxonomy.display_label(&category, &subcategory).to_string();
                let markers = records
                    .iter()
                    .map(|record| Marker::from_record(record, projection, taxonomy))
                    .collect();
                let group = MarkerGroup::new(key.clone(), category, subcategory, label, markers);
                Some((key, Arc::new(group)))
            })
            .collect::<BTreeMap<_, _>>();

        log::debug!("built {} marker groups from {} records", groups.len(), records.len());
        Self { groups }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn group(&self, key: &str) -> Option<&Arc<MarkerGroup>> {
        self.groups.get(key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Markers across every group, attached or not
    pub fn marker_count(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    /// Markers in the groups currently attached to `layers`
    pub fn attached_marker_count(&self, layers: &LayerManager) -> usize {
        self.groups
            .iter()
            .filter(|(key, _)| attached(layers, key))
            .map(|(_, group)| group.len())
            .sum()
    }

    pub fn is_attached(&self, layers: &LayerManager, key: &str) -> bool {
        self.groups.contains_key(key) && attached(layers, key)
    }

    /// Attaches or detaches one group. Returns whether anything changed;
    /// repeating a call, or naming a key with no group, is a no-op.
    pub fn set_visible(&self, layers: &mut LayerManager, key: &str, visible: bool) -> Result<bool> {
        let Some(group) = self.groups.get(key) else {
            return Ok(false);
        };

        match (visible, attached(layers, key)) {
            (true, false) if layers.contains(key) => {
                log::warn!("cannot show group {}: id is taken by another layer", key);
                Ok(false)
            }
            (true, false) => {
                layers.add_layer(Box::new(MarkerLayer::new(Arc::clone(group))))?;
                Ok(true)
            }
            (false, true) => Ok(layers.remove_layer(key).is_some()),
            _ => Ok(false),
        }
    }

    /// Makes a group attached iff its key is in `visible_keys`. Groups whose
    /// state already matches are left untouched.
    pub fn apply_filter(
        &self,
        layers: &mut LayerManager,
        visible_keys: &BTreeSet<String>,
    ) -> Result<Reconciliation> {
        let mut outcome = Reconciliation::default();
        for key in self.groups.keys() {
            let visible = visible_keys.contains(key);
            if self.set_visible(layers, key, visible)? {
                if visible {
                    outcome.added += 1;
                } else {
                    outcome.removed += 1;
                }
            }
        }

        if !outcome.is_noop() {
            log::debug!(
                "filter reconciled: {} layers added, {} removed",
                outcome.added,
                outcome.removed
            );
        }
        Ok(outcome)
    }

    /// Detaches every group from `layers`
    pub fn detach_all(&self, layers: &mut LayerManager) {
        for key in self.groups.keys() {
            if attached(layers, key) {
                layers.remove_layer(key);
            }
        }
    }

    /// Nearest marker of an attached, visible group within `radius` surface
    /// units of `point`
    pub fn hit_test(
        &self,
        layers: &LayerManager,
        point: &Point,
        radius: f64,
    ) -> Option<(&MarkerGroup, &Marker)> {
        self.groups
            .iter()
            .filter(|(key, _)| {
                layers.get_layer(key).map_or(false, |layer| {
                    layer.layer_type() == LayerType::Marker && layer.is_visible()
                })
            })
            .filter_map(|(_, group)| {
                group
                    .nearest(point, radius)
                    .map(|(marker, distance)| (group.as_ref(), marker, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(group, marker, _)| (group, marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calibration::CalibrationRegistry;
    use crate::core::geo::WorldPoint;

    fn records() -> Vec<AnnotationRecord> {
        vec![
            AnnotationRecord::new("1", "containers", "raider_cache", WorldPoint::new(4096.0, 4096.0), "dam"),
            AnnotationRecord::new("2", "containers", "raider_cache", WorldPoint::new(100.0, 100.0), "dam"),
            AnnotationRecord::new("3", "arc", "wasp", WorldPoint::new(8000.0, 200.0), "dam"),
            AnnotationRecord::new("4", "mystery", "thing", WorldPoint::new(10.0, 8000.0), "dam"),
        ]
    }

    fn build() -> AnnotationLayers {
        let registry = CalibrationRegistry::builtin();
        let projection = MapProjection::new(registry.get("dam").unwrap());
        AnnotationLayers::build(&records(), &projection, CategoryTaxonomy::builtin())
    }

    fn all_keys(layers: &AnnotationLayers) -> BTreeSet<String> {
        layers.keys().map(String::from).collect()
    }

    #[test]
    fn test_groups_by_full_key() {
        let groups = build();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.marker_count(), 4);
        let cache = groups.group("containers_raider_cache").unwrap();
        assert_eq!(cache.category(), "containers");
        assert_eq!(cache.subcategory(), "raider_cache");
        assert_eq!(cache.label(), "Raider Cache");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_set_visible_is_idempotent() {
        let groups = build();
        let mut layers = LayerManager::new();

        assert!(groups.set_visible(&mut layers, "arc_wasp", true).unwrap());
        assert!(!groups.set_visible(&mut layers, "arc_wasp", true).unwrap());
        assert_eq!(layers.len(), 1);

        assert!(groups.set_visible(&mut layers, "arc_wasp", false).unwrap());
        assert!(!groups.set_visible(&mut layers, "arc_wasp", false).unwrap());
        assert!(layers.is_empty());

        assert!(!groups.set_visible(&mut layers, "no_such_key", true).unwrap());
    }

    #[test]
    fn test_apply_filter_reconciles() {
        let groups = build();
        let mut layers = LayerManager::new();

        let first = groups.apply_filter(&mut layers, &all_keys(&groups)).unwrap();
        assert_eq!(first, Reconciliation { added: 3, removed: 0 });
        assert_eq!(groups.attached_marker_count(&layers), 4);

        let again = groups.apply_filter(&mut layers, &all_keys(&groups)).unwrap();
        assert!(again.is_noop());

        let cleared = groups.apply_filter(&mut layers, &BTreeSet::new()).unwrap();
        assert_eq!(cleared, Reconciliation { added: 0, removed: 3 });
        assert!(layers.is_empty());
    }

    #[test]
    fn test_apply_filter_ignores_foreign_layers() {
        let groups = build();
        let mut layers = LayerManager::new();
        let keys: BTreeSet<String> = ["arc_wasp".to_string(), "events_harvester".to_string()].into();

        let outcome = groups.apply_filter(&mut layers, &keys).unwrap();
        assert_eq!(outcome.added, 1);
        assert!(groups.is_attached(&layers, "arc_wasp"));
        assert!(!groups.is_attached(&layers, "events_harvester"));
    }

    #[test]
    fn test_hit_test_only_sees_attached_groups() {
        let groups = build();
        let mut layers = LayerManager::new();
        let center = Point::new(256.0, 256.0);

        assert!(groups.hit_test(&layers, &center, 2.0).is_none());

        groups.set_visible(&mut layers, "containers_raider_cache", true).unwrap();
        let (group, marker) = groups.hit_test(&layers, &center, 2.0).unwrap();
        assert_eq!(group.key(), "containers_raider_cache");
        assert_eq!(marker.record_id, "1");
    }

    #[test]
    fn test_group_never_displaces_tile_layer() {
        let registry = CalibrationRegistry::builtin();
        let projection = MapProjection::new(registry.get("dam").unwrap());
        let clash = vec![AnnotationRecord::new("t", "old", "town-tiles", WorldPoint::new(10.0, 10.0), "dam")];
        let groups = AnnotationLayers::build(&clash, &projection, CategoryTaxonomy::builtin());
        assert!(groups.group("old_town-tiles").is_some());

        let mut layers = LayerManager::new();
        layers
            .add_layer(Box::new(crate::layers::tile::TileLayer::new(
                "old_town-tiles".to_string(),
                Box::new(crate::tiles::source::PyramidTileSource::new(
                    "old_town".to_string(),
                    std::path::PathBuf::from("tiles"),
                    "webp".to_string(),
                )),
                256,
                2,
            )))
            .unwrap();

        let shown = groups.apply_filter(&mut layers, &all_keys(&groups)).unwrap();
        assert!(shown.is_noop());
        assert!(!groups.is_attached(&layers, "old_town-tiles"));
        assert_eq!(groups.attached_marker_count(&layers), 0);

        let hidden = groups.apply_filter(&mut layers, &BTreeSet::new()).unwrap();
        assert!(hidden.is_noop());
        groups.detach_all(&mut layers);
        assert_eq!(layers.ids_of_type(LayerType::Tile), vec!["old_town-tiles"]);
    }
}
