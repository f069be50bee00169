//! Image selection: target vs background partitioning and test-split pools.

use std::collections::HashSet;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;
use walkdir::WalkDir;

use crate::catalog::{Catalog, ClassResolver};
use crate::error::ExtractError;
use crate::ir::ImageId;

/// Images chosen for one labelled split.
///
/// Both sequences are duplicate-free, ordered by first appearance in the
/// annotation list, and disjoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub target: Vec<ImageId>,
    pub background: Vec<ImageId>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.target.len() + self.background.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Target images first, then background, each paired with
    /// `true` when it is a background image.
    pub fn iter(&self) -> impl Iterator<Item = (ImageId, bool)> + '_ {
        self.target
            .iter()
            .map(|&id| (id, false))
            .chain(self.background.iter().map(|&id| (id, true)))
    }
}

/// Insertion-ordered set of image ids.
#[derive(Default)]
struct OrderedIds {
    order: Vec<ImageId>,
    seen: HashSet<ImageId>,
}

impl OrderedIds {
    fn insert(&mut self, id: ImageId) -> bool {
        if self.seen.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    fn contains(&self, id: &ImageId) -> bool {
        self.seen.contains(id)
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Partitions a catalog's images into target and background sets.
///
/// Without target classes every image in the catalog is a target and no
/// background is drawn. Otherwise images with at least one matching
/// annotation are targets, and when `background_percentage > 0` images
/// annotated only with other classes are added as background until there
/// are more than `background_percentage * target` of them.
pub fn select_images(
    catalog: &Catalog,
    resolver: &ClassResolver,
    background_percentage: f64,
) -> Selection {
    if !resolver.is_filtering() {
        let mut all = OrderedIds::default();
        for image in catalog.images() {
            all.insert(image.id);
        }
        return Selection {
            target: all.order,
            background: Vec::new(),
        };
    }

    let mut target = OrderedIds::default();
    for ann in catalog.annotations() {
        if resolver.matches(catalog.category_name(ann.category_id)) {
            target.insert(ann.image_id);
        }
    }

    let mut background = OrderedIds::default();
    if background_percentage > 0.0 {
        let limit = background_percentage * target.len() as f64;
        for ann in catalog.annotations() {
            if resolver.matches(catalog.category_name(ann.category_id))
                || target.contains(&ann.image_id)
            {
                continue;
            }
            if background.insert(ann.image_id) && background.len() as f64 > limit {
                break;
            }
        }
    }

    debug!(
        target_images = target.len(),
        background_images = background.len(),
        "selected images"
    );

    Selection {
        target: target.order,
        background: background.order,
    }
}

/// File names of the images a test split should copy, taken from annotations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestPool {
    pub file_names: Vec<String>,
    /// Matching annotations that point at an image id the catalog lacks.
    pub unknown_images: Vec<ImageId>,
}

/// Builds the test pool from the annotation catalog.
///
/// With target classes, each image holding a matching annotation
/// contributes its file name once. Without them every catalog image does.
pub fn select_target_filenames(catalog: &Catalog, resolver: &ClassResolver) -> TestPool {
    let mut pool = TestPool::default();
    let mut seen_names = HashSet::new();

    if !resolver.is_filtering() {
        for image in catalog.images() {
            if seen_names.insert(image.file_name.as_str()) {
                pool.file_names.push(image.file_name.clone());
            }
        }
        return pool;
    }

    let mut visited = OrderedIds::default();
    for ann in catalog.annotations() {
        if !resolver.matches(catalog.category_name(ann.category_id))
            || !visited.insert(ann.image_id)
        {
            continue;
        }
        match catalog.image(ann.image_id) {
            Some(image) => {
                if seen_names.insert(image.file_name.as_str()) {
                    pool.file_names.push(image.file_name.clone());
                }
            }
            None => pool.unknown_images.push(ann.image_id),
        }
    }
    pool
}

/// Lists the regular files directly inside `dir`, sorted by name.
///
/// Entries whose names are not valid UTF-8 are skipped.
pub fn list_image_dir(dir: &Path) -> Result<Vec<String>, ExtractError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|err| ExtractError::ImageDirList {
            path: dir.to_path_buf(),
            message: err.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => debug!(path = %entry.path().display(), "skipping non-UTF-8 file name"),
        }
    }
    names.sort();
    Ok(names)
}

/// Number of items a cap keeps from a pool of `total`.
pub fn capped_count(total: usize, cap: Option<usize>) -> usize {
    match cap {
        Some(cap) => cap.min(total),
        None => total,
    }
}

/// Keeps `k` items chosen uniformly at random without replacement.
///
/// The survivors stay in their original relative order. When `k` is at
/// least the pool size the pool is returned unchanged.
pub fn sample_without_replacement<T>(items: Vec<T>, k: usize, seed: Option<u64>) -> Vec<T> {
    if k >= items.len() {
        return items;
    }

    let mut picks: Vec<usize> = (0..items.len()).collect();
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        picks.shuffle(&mut rng);
    } else {
        let mut rng = rand::rng();
        picks.shuffle(&mut rng);
    }
    picks.truncate(k);

    let keep: HashSet<usize> = picks.into_iter().collect();
    items
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep.contains(idx))
        .map(|(_, item)| item)
        .collect()
}
