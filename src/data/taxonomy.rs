//! Category → subcategory taxonomy of map annotations.
//!
//! Static configuration: the display label, glyph and color used for every
//! known `(category, subcategory)` pair. Pairs that are not listed degrade to
//! a fallback glyph and color instead of failing.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::constants::FALLBACK_MARKER_GLYPH;
use crate::rendering::style::Color;

/// Key of the layer group holding one `(category, subcategory)` pair
pub fn layer_key(category: &str, subcategory: &str) -> String {
    format!("{}_{}", category, subcategory)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcategoryInfo {
    pub name: String,
    pub display_label: String,
    pub glyph: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub display_label: String,
    pub color: Color,
    pub subcategories: Vec<SubcategoryInfo>,
}

impl CategoryInfo {
    /// Builds a category from `(name, label, glyph)` rows
    pub fn from_table(name: &str, display_label: &str, color: Color, rows: &[(&str, &str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            display_label: display_label.to_string(),
            color,
            subcategories: rows
                .iter()
                .map(|(sub, label, glyph)| SubcategoryInfo {
                    name: sub.to_string(),
                    display_label: label.to_string(),
                    glyph: glyph.to_string(),
                })
                .collect(),
        }
    }

    pub fn subcategory(&self, name: &str) -> Option<&SubcategoryInfo> {
        self.subcategories.iter().find(|s| s.name == name)
    }

    /// Layer keys of every subcategory, in display order
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.subcategories
            .iter()
            .map(move |s| layer_key(&self.name, &s.name))
    }
}

/// Ordered set of categories; order is the display order of the filter panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTaxonomy {
    categories: Vec<CategoryInfo>,
}

impl CategoryTaxonomy {
    pub fn new(categories: Vec<CategoryInfo>) -> Self {
        Self { categories }
    }

    /// The game's shipped taxonomy
    pub fn builtin() -> &'static CategoryTaxonomy {
        &BUILTIN
    }

    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategoryInfo> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn subcategory(&self, category: &str, subcategory: &str) -> Option<&SubcategoryInfo> {
        self.category(category)?.subcategory(subcategory)
    }

    pub fn glyph(&self, category: &str, subcategory: &str) -> &str {
        self.subcategory(category, subcategory)
            .map(|s| s.glyph.as_str())
            .unwrap_or(FALLBACK_MARKER_GLYPH)
    }

    pub fn color(&self, category: &str) -> Color {
        self.category(category)
            .map(|c| c.color)
            .unwrap_or(Color::FALLBACK)
    }

    /// Display label of a subcategory, or its raw name when unknown
    pub fn display_label<'a>(&'a self, category: &str, subcategory: &'a str) -> &'a str {
        self.subcategory(category, subcategory)
            .map(|s| s.display_label.as_str())
            .unwrap_or(subcategory)
    }

    /// Every known layer key
    pub fn keys(&self) -> Vec<String> {
        self.categories.iter().flat_map(|c| c.keys()).collect()
    }

    /// Layer keys under one category; empty for an unknown category
    pub fn keys_for(&self, category: &str) -> Vec<String> {
        self.category(category)
            .map(|c| c.keys().collect())
            .unwrap_or_default()
    }
}

const CONTAINERS: &[(&str, &str, &str)] = &[
    ("raider_cache", "Raider Cache", "💰"),
    ("base_container", "Base Container", "📦"),
    ("basket", "Basket", "🧺"),
    ("weapon_case", "Weapon Case", "🔫"),
    ("breachable_container", "Breachable", "🔨"),
    ("security_breach", "Security Breach", "🚨"),
    ("ammo_crate", "Ammo Crate", "🎯"),
    ("med_crate", "Med Crate", "💊"),
    ("locker", "Locker", "🚪"),
    ("arc_husk", "ARC Husk", "🤖"),
    ("bag", "Bag", "🎒"),
    ("car", "Car", "🚗"),
    ("arc_courier", "ARC Courier", "📮"),
    ("arc_probe", "ARC Probe", "🛸"),
    ("box", "Box", "📦"),
    ("baron_husk", "Baron Husk", "💀"),
    ("utility_crate", "Utility Crate", "🧰"),
];

const LOCATIONS: &[(&str, &str, &str)] = &[
    ("player_spawn", "Player Spawn", "🏁"),
    ("button", "Button", "🔘"),
    ("fuel-cell", "Fuel Cell", "⚡"),
    ("supply_station", "Supply Station", "🏪"),
    ("locked_room", "Locked Room", "🔐"),
    ("extraction", "Extraction", "🚁"),
    ("hatch", "Hatch", "🚪"),
    ("field_depot", "Field Depot", "🏭"),
    ("antenna", "Antenna", "📡"),
];

const ARCS: &[(&str, &str, &str)] = &[
    ("hornet", "Hornet", "🐝"),
    ("wasp", "Wasp", "🐝"),
    ("bombardier", "Bombardier", "💣"),
    ("snitch", "Snitch", "👁️"),
    ("bastion", "Bastion", "🛡️"),
    ("rocketeer", "Rocketeer", "🚀"),
    ("sentinel", "Sentinel", "🗼"),
    ("rollbot", "Rollbot", "⚙️"),
    ("bison", "Bison", "🦬"),
    ("turret", "Turret", "🔫"),
    ("fireball", "Fireball", "🔥"),
    ("queen", "Queen", "👑"),
];

const NATURE: &[(&str, &str, &str)] = &[
    ("lemons", "Lemons", "🍋"),
    ("olive", "Olive", "🫒"),
    ("apricot", "Apricot", "🍑"),
    ("great-mullein", "Great Mullein", "🌿"),
    ("mushroom", "Mushroom", "🍄"),
];

const EVENTS: &[(&str, &str, &str)] = &[("harvester", "Harvester", "🌾")];

const QUESTS: &[(&str, &str, &str)] = &[
    ("reduced-to-rubble", "Reduced to Rubble", "📜"),
    ("a-first-foothold", "A First Foothold", "📜"),
    ("armored-transports", "Armored Transports", "📜"),
    ("with-a-trace", "With a Trace", "📜"),
    ("bees", "Bees", "📜"),
    ("back-on-top", "Back on Top", "📜"),
];

static BUILTIN: Lazy<CategoryTaxonomy> = Lazy::new(|| {
    CategoryTaxonomy::new(vec![
        CategoryInfo::from_table("containers", "Containers", Color::rgb(0xff, 0xc1, 0x07), CONTAINERS),
        CategoryInfo::from_table("locations", "Locations", Color::rgb(0x21, 0x96, 0xf3), LOCATIONS),
        CategoryInfo::from_table("arc", "ARCs", Color::rgb(0xf4, 0x43, 0x36), ARCS),
        CategoryInfo::from_table("nature", "Nature", Color::rgb(0x4c, 0xaf, 0x50), NATURE),
        CategoryInfo::from_table("events", "Events", Color::rgb(0x9c, 0x27, 0xb0), EVENTS),
        CategoryInfo::from_table("quests", "Quests", Color::rgb(0xff, 0x98, 0x00), QUESTS),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let taxonomy = CategoryTaxonomy::builtin();
        assert_eq!(taxonomy.glyph("containers", "raider_cache"), "💰");
        assert_eq!(taxonomy.color("arc"), Color::rgb(0xf4, 0x43, 0x36));
        assert_eq!(taxonomy.display_label("locations", "fuel-cell"), "Fuel Cell");
    }

    #[test]
    fn test_fallbacks() {
        let taxonomy = CategoryTaxonomy::builtin();
        assert_eq!(taxonomy.glyph("containers", "mystery_box"), FALLBACK_MARKER_GLYPH);
        assert_eq!(taxonomy.glyph("unknown", "thing"), FALLBACK_MARKER_GLYPH);
        assert_eq!(taxonomy.color("unknown"), Color::FALLBACK);
        assert_eq!(taxonomy.display_label("unknown", "thing"), "thing");
    }

    #[test]
    fn test_keys_keep_underscored_subcategories_whole() {
        let taxonomy = CategoryTaxonomy::builtin();
        let keys = taxonomy.keys_for("containers");
        assert_eq!(keys.len(), CONTAINERS.len());
        assert!(keys.contains(&"containers_raider_cache".to_string()));
        assert!(taxonomy.keys_for("nope").is_empty());
    }

    #[test]
    fn test_all_keys_unique() {
        let keys = CategoryTaxonomy::builtin().keys();
        let unique: std::collections::BTreeSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_taxonomy_serializes_colors_as_hex() {
        let taxonomy = CategoryTaxonomy::new(vec![CategoryInfo::from_table(
            "events",
            "Events",
            Color::rgb(0x9c, 0x27, 0xb0),
            EVENTS,
        )]);
        let json = serde_json::to_string(&taxonomy).unwrap();
        assert!(json.contains("\"#9c27b0\""));
        let back: CategoryTaxonomy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, taxonomy);
    }
}
