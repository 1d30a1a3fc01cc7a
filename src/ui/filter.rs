//! User filter state: which layer keys should be visible.
//!
//! Filter selections are user intent, not per-map state, so the same
//! `FilterState` is kept across map switches.

use std::collections::BTreeSet;

use crate::data::taxonomy::CategoryTaxonomy;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    visible: BTreeSet<String>,
}

impl FilterState {
    /// Nothing checked
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every key of the taxonomy checked
    pub fn all(taxonomy: &CategoryTaxonomy) -> Self {
        Self::from_keys(taxonomy.keys())
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            visible: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn visible_keys(&self) -> &BTreeSet<String> {
        &self.visible
    }

    pub fn contains(&self, key: &str) -> bool {
        self.visible.contains(key)
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Checks or unchecks one subcategory; returns whether it changed
    pub fn set_subcategory(&mut self, key: &str, checked: bool) -> bool {
        if checked {
            self.visible.insert(key.to_string())
        } else {
            self.visible.remove(key)
        }
    }

    /// Sets every subcategory under `category` to `checked`; returns how many changed
    pub fn set_category(&mut self, taxonomy: &CategoryTaxonomy, category: &str, checked: bool) -> usize {
        taxonomy
            .keys_for(category)
            .iter()
            .filter(|key| self.set_subcategory(key, checked))
            .count()
    }

    /// A category reads as checked iff it has subcategories and all are checked
    pub fn is_category_checked(&self, taxonomy: &CategoryTaxonomy, category: &str) -> bool {
        let keys = taxonomy.keys_for(category);
        !keys.is_empty() && keys.iter().all(|key| self.visible.contains(key))
    }

    pub fn show_all(&mut self, taxonomy: &CategoryTaxonomy) {
        self.visible.extend(taxonomy.keys());
    }

    pub fn hide_all(&mut self) {
        self.visible.clear();
    }

    pub fn replace<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self = Self::from_keys(keys);
    }
}
