//! Target-class resolution against a catalog.
//!
//! Matching is by category *name* against the configured target list.
//! Merging into a single class changes only the output index, never which
//! annotations match. Without a target list, output indices come from a
//! class list shared by every split, so one `data.yaml` fits all of them.

use tracing::{debug, warn};

use super::Catalog;
use crate::config::ExtractConfig;
use crate::ir::{Category, CategoryId};

/// Decides which annotations are kept and which class index they get.
#[derive(Clone, Debug, Default)]
pub struct ClassResolver {
    target_classes: Vec<String>,
    merged_class: Option<String>,
    /// Category names registered from loaded catalogs, used when there is
    /// no target list and no merge.
    seen_classes: Vec<String>,
}

impl ClassResolver {
    pub fn new(target_classes: Vec<String>, merged_class: Option<String>) -> Self {
        Self {
            target_classes,
            merged_class,
            seen_classes: Vec::new(),
        }
    }

    pub fn from_config(config: &ExtractConfig) -> Self {
        Self::new(
            config.target_classes.clone(),
            config.single_class_name.clone(),
        )
    }

    /// True when a non-empty target list restricts the output.
    pub fn is_filtering(&self) -> bool {
        !self.target_classes.is_empty()
    }

    pub fn is_merging(&self) -> bool {
        self.merged_class.is_some()
    }

    pub fn target_classes(&self) -> &[String] {
        &self.target_classes
    }

    /// Makes sure the merged category exists in `catalog` and returns its id.
    ///
    /// Reuses a category that already carries the merged name; otherwise
    /// appends one under [`Catalog::unused_category_id`].
    /// Returns `None` when merging is off or the category could not be added.
    pub fn ensure_merged_category(&self, catalog: &mut Catalog) -> Option<CategoryId> {
        let name = self.merged_class.as_deref()?;

        if let Some(existing) = catalog.category_by_name(name) {
            debug!(category = %existing.id, name, "reusing merged category");
            return Some(existing.id);
        }

        let id = catalog.unused_category_id();
        if !catalog.inject_category(Category::with_supercategory(id, name, name)) {
            warn!(category = %id, name, "could not add merged category");
            return None;
        }
        debug!(category = %id, name, "created merged category");
        Some(id)
    }

    /// Adds the category names of `catalog` that are not known yet, in
    /// category id order. Earlier names keep their index.
    ///
    /// Only the unfiltered, unmerged mode needs this; otherwise a no-op.
    pub fn register_categories(&mut self, catalog: &Catalog) {
        if self.is_filtering() || self.is_merging() {
            return;
        }
        for category in catalog.categories_by_id() {
            if !self.seen_classes.contains(&category.name) {
                debug!(name = %category.name, index = self.seen_classes.len(), "registered class");
                self.seen_classes.push(category.name.clone());
            }
        }
    }

    /// Whether a category name is a target. `None` (unknown id) never matches.
    ///
    /// With an empty target list every known category matches.
    pub fn matches(&self, name: Option<&str>) -> bool {
        match name {
            Some(name) => !self.is_filtering() || self.target_classes.iter().any(|t| t == name),
            None => false,
        }
    }

    /// Output class index for an annotation's category, or `None` if the
    /// annotation must be dropped.
    ///
    /// - merging: always 0
    /// - filtering: position of the name in the target list
    /// - otherwise: position of the name among registered classes
    pub fn output_index(&self, catalog: &Catalog, category_id: CategoryId) -> Option<usize> {
        let name = catalog.category_name(category_id)?;
        if !self.matches(Some(name)) {
            return None;
        }

        if self.is_merging() {
            return Some(0);
        }

        let classes = if self.is_filtering() {
            &self.target_classes
        } else {
            &self.seen_classes
        };
        classes.iter().position(|c| c == name)
    }

    /// Class names in output-index order, as listed in `data.yaml`.
    pub fn class_names(&self) -> Vec<String> {
        if let Some(name) = &self.merged_class {
            return vec![name.clone()];
        }
        if self.is_filtering() {
            return self.target_classes.clone();
        }
        self.seen_classes.clone()
    }
}
