#![allow(dead_code)]

use cocoslice::catalog::Catalog;
use cocoslice::ir::{Annotation, Category, CocoFile, Image};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Pool of class names generated catalogs draw from.
pub const CLASS_NAMES: [&str; 6] = ["person", "car", "cat", "dog", "bear", "bed"];

/// Tolerance for pixel boxes restored from YOLO text: a few ulps of the
/// normalized values, scaled back up by the image size.
pub fn eps_yolo(image_w: u32, image_h: u32) -> f64 {
    image_w.max(image_h) as f64 * 1e-12
}

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// `(image_width, image_height, [x, y, w, h])` with the box inside the image.
pub fn arb_image_and_box() -> BoxedStrategy<(u32, u32, [f64; 4])> {
    (1u32..=4096, 1u32..=4096)
        .prop_flat_map(|(w, h)| {
            (
                Just(w),
                Just(h),
                0.0..f64::from(w),
                0.0..f64::from(h),
                0.0f64..=1.0,
                0.0f64..=1.0,
            )
        })
        .prop_map(|(w, h, x, y, fw, fh)| {
            let bw = (f64::from(w) - x) * fw;
            let bh = (f64::from(h) - y) * fh;
            (w, h, [x, y, bw, bh])
        })
        .boxed()
}

/// A catalog with up to `max_images` images and `max_anns` annotations.
///
/// Category ids are spread out and shuffled so that id order and list
/// order differ. Some annotations point at image ids with no record.
pub fn arb_catalog(max_images: usize, max_anns: usize) -> BoxedStrategy<Catalog> {
    (1usize..=max_images, 0usize..=max_anns)
        .prop_flat_map(|(image_count, ann_count)| {
            (
                Just(image_count),
                proptest::collection::vec(
                    (0..image_count + 2, 0..CLASS_NAMES.len() + 1),
                    ann_count..=ann_count,
                ),
                Just((0..CLASS_NAMES.len()).collect::<Vec<usize>>()).prop_shuffle(),
            )
        })
        .prop_map(|(image_count, ann_seeds, category_order)| {
            build_catalog(image_count, ann_seeds, category_order)
        })
        .boxed()
}

/// Non-empty subset of `CLASS_NAMES`, in random order.
pub fn arb_targets() -> BoxedStrategy<Vec<String>> {
    proptest::sample::subsequence(CLASS_NAMES.to_vec(), 1..=CLASS_NAMES.len())
        .prop_shuffle()
        .prop_map(|names| names.into_iter().map(str::to_string).collect())
        .boxed()
}

fn category_id(name_idx: usize) -> u64 {
    (name_idx as u64 + 1) * 7
}

fn build_catalog(
    image_count: usize,
    ann_seeds: Vec<(usize, usize)>,
    category_order: Vec<usize>,
) -> Catalog {
    let images = (0..image_count)
        .map(|idx| {
            Image::new(
                (idx + 1) as u64,
                format!("{:012}.jpg", idx + 1),
                320 + idx as u32,
                240,
            )
        })
        .collect();

    let categories = category_order
        .into_iter()
        .map(|idx| Category::new(category_id(idx), CLASS_NAMES[idx]))
        .collect();

    // Seeds past the last image or class produce dangling references.
    let annotations = ann_seeds
        .into_iter()
        .map(|(image_idx, class_idx)| {
            Annotation::new(
                (image_idx + 1) as u64,
                category_id(class_idx),
                [1.0, 2.0, 30.0, 40.0],
            )
        })
        .collect();

    Catalog::from_coco(CocoFile {
        images,
        categories,
        annotations,
    })
}
