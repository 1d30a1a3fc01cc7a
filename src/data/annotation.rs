//! Annotation records and the per-map catalog that holds them.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::core::geo::WorldPoint;
use crate::data::taxonomy::layer_key;
use crate::prelude::HashMap;
use crate::Result;

/// One categorized point on one map. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: String,
    pub category: String,
    pub subcategory: String,
    pub world_position: WorldPoint,
    pub map_name: String,
    pub label: Option<String>,
}

impl AnnotationRecord {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        world_position: WorldPoint,
        map_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            subcategory: subcategory.into(),
            world_position,
            map_name: map_name.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Layer group key of this record
    pub fn key(&self) -> String {
        layer_key(&self.category, &self.subcategory)
    }
}

/// Marker as it appears in the annotation file; `lng` is world X and `lat`
/// is world Y.
#[derive(Debug, Clone, Deserialize)]
struct RawMarker {
    id: String,
    category: String,
    subcategory: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    map: Option<String>,
    #[serde(default)]
    instance_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMapData {
    map: String,
    #[serde(default)]
    markers: Vec<RawMarker>,
}

impl RawMarker {
    fn into_record(self, default_map: &str) -> AnnotationRecord {
        AnnotationRecord {
            id: self.id,
            category: self.category,
            subcategory: self.subcategory,
            world_position: WorldPoint::new(self.lng, self.lat),
            map_name: self.map.unwrap_or_else(|| default_map.to_string()),
            label: self.instance_name.filter(|name| !name.trim().is_empty()),
        }
    }
}

/// Every annotation of the session, partitioned by map
#[derive(Debug, Clone, Default)]
pub struct AnnotationCatalog {
    by_map: HashMap<String, Vec<AnnotationRecord>>,
}

impl AnnotationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from loose records. Records with a non-finite
    /// position cannot be placed and are skipped.
    pub fn from_records(records: impl IntoIterator<Item = AnnotationRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    /// Parses an annotation document: an array of `{map, markers}` objects
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: Vec<RawMapData> = serde_json::from_str(text)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: Vec<RawMapData> = serde_json::from_reader(reader)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: Vec<RawMapData>) -> Self {
        let records = raw.into_iter().flat_map(|data| {
            let map = data.map;
            data.markers
                .into_iter()
                .map(move |marker| marker.into_record(&map))
        });
        let catalog = Self::from_records(records);
        log::debug!(
            "loaded {} annotations across {} maps",
            catalog.len(),
            catalog.by_map.len()
        );
        catalog
    }

    /// Adds one record. Category and subcategory are trimmed, so `"hornet "`
    /// and `"hornet"` land in the same group.
    pub fn insert(&mut self, mut record: AnnotationRecord) {
        record.category = record.category.trim().to_string();
        record.subcategory = record.subcategory.trim().to_string();
        if !record.world_position.is_finite() {
            log::warn!(
                "skipping annotation {} on {}: position is not finite",
                record.id,
                record.map_name
            );
            return;
        }
        self.by_map
            .entry(record.map_name.clone())
            .or_default()
            .push(record);
    }

    /// Records of one map, empty when the map has none
    pub fn records_for(&self, map_name: &str) -> &[AnnotationRecord] {
        self.by_map
            .get(map_name)
            .map(|records| records.as_slice())
            .unwrap_or(&[])
    }

    /// Names of maps with at least one record, sorted
    pub fn maps(&self) -> Vec<&str> {
        let mut maps: Vec<&str> = self.by_map.keys().map(|name| name.as_str()).collect();
        maps.sort_unstable();
        maps
    }

    pub fn len(&self) -> usize {
        self.by_map.values().map(|records| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"map": "dam", "markers": [
            {"id": "a1", "category": "containers", "subcategory": "raider_cache",
             "lat": 4096.0, "lng": 1024.0, "map": "dam", "instance_name": "North Cache"},
            {"id": "a2", "category": "arc", "subcategory": "wasp",
             "lat": 10.0, "lng": 20.0, "instance_name": null}
        ]},
        {"map": "spaceport", "markers": [
            {"id": "b1", "category": "nature", "subcategory": "olive",
             "lat": 1.0, "lng": 2.0, "map": "spaceport", "instance_name": "  "}
        ]}
    ]"#;

    #[test]
    fn test_parse_partitions_by_map() {
        let catalog = AnnotationCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.maps(), vec!["dam", "spaceport"]);
        assert_eq!(catalog.records_for("dam").len(), 2);
        assert!(catalog.records_for("blue-gate").is_empty());
    }

    #[test]
    fn test_lng_is_x_and_lat_is_y() {
        let catalog = AnnotationCatalog::from_json(SAMPLE).unwrap();
        let record = &catalog.records_for("dam")[0];
        assert_eq!(record.world_position, WorldPoint::new(1024.0, 4096.0));
        assert_eq!(record.label.as_deref(), Some("North Cache"));
        assert_eq!(record.key(), "containers_raider_cache");
    }

    #[test]
    fn test_missing_map_and_blank_label() {
        let catalog = AnnotationCatalog::from_json(SAMPLE).unwrap();
        let wasp = &catalog.records_for("dam")[1];
        assert_eq!(wasp.map_name, "dam");
        assert_eq!(wasp.label, None);
        assert_eq!(catalog.records_for("spaceport")[0].label, None);
    }

    #[test]
    fn test_non_finite_positions_skipped() {
        let catalog = AnnotationCatalog::from_records(vec![
            AnnotationRecord::new("x", "arc", "wasp", WorldPoint::new(f64::NAN, 0.0), "dam"),
            AnnotationRecord::new("y", "arc", "wasp", WorldPoint::new(1.0, 2.0), "dam"),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records_for("dam")[0].id, "y");
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(AnnotationCatalog::from_json("{\"map\": 1}").is_err());
    }

    #[test]
    fn test_padded_subcategory_joins_its_group() {
        let text = r#"[{"map": "dam", "markers": [
            {"id": "h1", "category": "arc", "subcategory": "hornet ", "lat": 1.0, "lng": 2.0},
            {"id": "h2", "category": " arc", "subcategory": "hornet", "lat": 3.0, "lng": 4.0}
        ]}]"#;
        let catalog = AnnotationCatalog::from_json(text).unwrap();
        let records = catalog.records_for("dam");

        assert!(records.iter().all(|record| record.key() == "arc_hornet"));
        let taxonomy = crate::data::taxonomy::CategoryTaxonomy::builtin();
        assert_eq!(taxonomy.glyph(&records[0].category, &records[0].subcategory), "🐝");
    }
}
