//! In-memory view of one split's COCO annotation file.
//!
//! The catalog owns the raw image, category and annotation lists and keeps
//! hash indices over them so every lookup the selector and transcoder make
//! is O(1) rather than a scan of the source arrays.

mod resolve;

pub use resolve::ClassResolver;

use std::collections::HashMap;
use std::path::Path;

use crate::error::ExtractError;
use crate::ir::io_coco_json::{from_coco_str, read_coco_json};
use crate::ir::{Annotation, Category, CategoryId, CocoFile, Image, ImageId};

/// One split's images, categories and annotations plus lookup indices.
///
/// The only mutation allowed after loading is [`Catalog::inject_category`].
#[derive(Clone, Debug)]
pub struct Catalog {
    images: Vec<Image>,
    categories: Vec<Category>,
    annotations: Vec<Annotation>,
    image_index: HashMap<ImageId, usize>,
    category_index: HashMap<CategoryId, usize>,
    annotations_by_image: HashMap<ImageId, Vec<usize>>,
}

impl Catalog {
    /// Loads a COCO annotation file.
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        Ok(Self::from_coco(read_coco_json(path)?))
    }

    /// Parses COCO JSON held in memory.
    pub fn from_coco_str(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_coco(from_coco_str(json)?))
    }

    pub fn from_coco(coco: CocoFile) -> Self {
        let mut catalog = Self {
            images: coco.images,
            categories: coco.categories,
            annotations: coco.annotations,
            image_index: HashMap::new(),
            category_index: HashMap::new(),
            annotations_by_image: HashMap::new(),
        };
        catalog.reindex();
        catalog
    }

    /// Rebuilds every derived index from the owned lists.
    ///
    /// When an id appears more than once the first occurrence wins.
    fn reindex(&mut self) {
        self.image_index.clear();
        for (idx, image) in self.images.iter().enumerate() {
            self.image_index.entry(image.id).or_insert(idx);
        }

        self.reindex_categories();

        self.annotations_by_image.clear();
        for (idx, ann) in self.annotations.iter().enumerate() {
            self.annotations_by_image
                .entry(ann.image_id)
                .or_default()
                .push(idx);
        }
    }

    fn reindex_categories(&mut self) {
        self.category_index.clear();
        for (idx, category) in self.categories.iter().enumerate() {
            self.category_index.entry(category.id).or_insert(idx);
        }
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn image(&self, id: ImageId) -> Option<&Image> {
        self.image_index.get(&id).map(|&idx| &self.images[idx])
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.category_index.get(&id).map(|&idx| &self.categories[idx])
    }

    /// Name of a category, or `None` if no category has this id.
    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.category(id).map(|cat| cat.name.as_str())
    }

    /// First category with the given name.
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|cat| cat.name == name)
    }

    /// Categories ordered by id, one per distinct id.
    pub fn categories_by_id(&self) -> Vec<&Category> {
        let mut cats: Vec<&Category> = self
            .category_index
            .values()
            .map(|&idx| &self.categories[idx])
            .collect();
        cats.sort_by_key(|cat| cat.id);
        cats
    }

    /// Annotations of an image in file order. Unknown images yield an empty list.
    pub fn annotations_for(&self, image_id: ImageId) -> Vec<&Annotation> {
        self.annotations_by_image
            .get(&image_id)
            .map(|indices| indices.iter().map(|&idx| &self.annotations[idx]).collect())
            .unwrap_or_default()
    }

    /// Largest category id, if any categories exist.
    pub fn max_category_id(&self) -> Option<CategoryId> {
        self.categories.iter().map(|cat| cat.id).max()
    }

    /// A category id no category uses yet: `max + 1`, or 1 when there are no
    /// categories. If `max` is `u64::MAX`, the smallest free id from 1 up.
    pub fn unused_category_id(&self) -> CategoryId {
        match self.max_category_id() {
            None => CategoryId::new(1),
            Some(max) => max.checked_next().unwrap_or_else(|| {
                (1..=u64::MAX)
                    .map(CategoryId::new)
                    .find(|id| !self.category_index.contains_key(id))
                    .unwrap_or(CategoryId::new(0))
            }),
        }
    }

    /// Appends a category.
    ///
    /// Returns `false` and leaves the catalog untouched if the id is taken.
    pub fn inject_category(&mut self, category: Category) -> bool {
        if self.category_index.contains_key(&category.id) {
            return false;
        }
        self.categories.push(category);
        self.reindex_categories();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        Catalog::from_coco(CocoFile {
            images: vec![
                Image::new(1u64, "a.jpg", 100, 100),
                Image::new(2u64, "b.jpg", 200, 100),
            ],
            categories: vec![Category::new(17u64, "cat"), Category::new(1u64, "person")],
            annotations: vec![
                Annotation::new(1u64, 17u64, [0.0, 0.0, 10.0, 10.0]),
                Annotation::new(2u64, 1u64, [5.0, 5.0, 10.0, 10.0]),
                Annotation::new(1u64, 1u64, [1.0, 1.0, 2.0, 2.0]),
            ],
        })
    }

    #[test]
    fn lookups_by_id() {
        let catalog = sample_catalog();
        assert_eq!(catalog.category_name(17u64.into()), Some("cat"));
        assert_eq!(catalog.category_name(99u64.into()), None);
        assert_eq!(catalog.image(2u64.into()).unwrap().file_name, "b.jpg");
        assert!(catalog.image(3u64.into()).is_none());
    }

    #[test]
    fn annotations_for_keeps_file_order() {
        let catalog = sample_catalog();
        let anns = catalog.annotations_for(1u64.into());
        assert_eq!(anns.len(), 2);
        assert_eq!(anns[0].category_id, CategoryId(17));
        assert_eq!(anns[1].category_id, CategoryId(1));
        assert!(catalog.annotations_for(42u64.into()).is_empty());
    }

    #[test]
    fn categories_by_id_follows_id_order() {
        let catalog = sample_catalog();
        let names: Vec<&str> = catalog
            .categories_by_id()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["person", "cat"]);
    }

    #[test]
    fn inject_category_rejects_duplicate_ids() {
        let mut catalog = sample_catalog();
        assert!(!catalog.inject_category(Category::new(17u64, "other")));
        assert_eq!(catalog.categories().len(), 2);

        assert!(catalog.inject_category(Category::new(18u64, "merged")));
        assert_eq!(catalog.category_name(18u64.into()), Some("merged"));
        assert_eq!(catalog.categories_by_id()[2].name, "merged");
    }

    #[test]
    fn unused_category_id_follows_max() {
        let mut catalog = sample_catalog();
        assert_eq!(catalog.unused_category_id(), CategoryId(18));
        assert!(catalog.inject_category(Category::new(u64::MAX, "last")));
        assert_eq!(catalog.unused_category_id(), CategoryId(2));
        assert_eq!(
            Catalog::from_coco(CocoFile::default()).unused_category_id(),
            CategoryId(1)
        );
    }

    #[test]
    fn first_duplicate_image_wins() {
        let catalog = Catalog::from_coco(CocoFile {
            images: vec![
                Image::new(1u64, "first.jpg", 10, 10),
                Image::new(1u64, "second.jpg", 10, 10),
            ],
            ..Default::default()
        });
        assert_eq!(catalog.image(1u64.into()).unwrap().file_name, "first.jpg");
    }
}
