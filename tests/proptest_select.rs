use std::collections::HashSet;
use std::path::Path;

use cocoslice::catalog::ClassResolver;
use cocoslice::config::LabelFormat;
use cocoslice::ir::io_yolo::{parse_label_lines, render_label_lines, YoloLine};
use cocoslice::ir::{Annotation, BBoxXYWH, ImageId, Pixel};
use cocoslice::select::select_images;
use cocoslice::transcode::{transcode, LabelPayload};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn yolo_text_restores_pixel_boxes((w, h, bbox) in proptest_helpers::arb_image_and_box()) {
        let ann = Annotation::new(1u64, 1u64, bbox);
        let normalized = ann.pixel_bbox().to_normalized(f64::from(w), f64::from(h));
        let text = render_label_lines(&[YoloLine::new(0, normalized)]);

        let parsed = parse_label_lines(&text, Path::new("prop.txt")).expect("parse own output");
        prop_assert_eq!(parsed.len(), 1);
        let restored = parsed[0].bbox.to_pixel(f64::from(w), f64::from(h));

        let eps = proptest_helpers::eps_yolo(w, h);
        let original = BBoxXYWH::<Pixel>::from_coco(bbox);
        for (a, b) in original.to_array().iter().zip(restored.to_array()) {
            prop_assert!((a - b).abs() <= eps, "{} vs {} (eps {})", a, b, eps);
        }
    }

    #[test]
    fn selection_is_disjoint_and_duplicate_free(
        catalog in proptest_helpers::arb_catalog(12, 40),
        targets in proptest_helpers::arb_targets(),
        ratio in 0.0f64..3.0,
    ) {
        let resolver = ClassResolver::new(targets, None);
        let selection = select_images(&catalog, &resolver, ratio);

        let target: HashSet<ImageId> = selection.target.iter().copied().collect();
        let background: HashSet<ImageId> = selection.background.iter().copied().collect();
        prop_assert_eq!(target.len(), selection.target.len());
        prop_assert_eq!(background.len(), selection.background.len());
        prop_assert!(target.is_disjoint(&background));

        // Targets are exactly the images with a matching annotation.
        let expected: HashSet<ImageId> = catalog
            .annotations()
            .iter()
            .filter(|ann| resolver.matches(catalog.category_name(ann.category_id)))
            .map(|ann| ann.image_id)
            .collect();
        prop_assert_eq!(&target, &expected);

        let bound = (ratio * selection.target.len() as f64).floor() as usize + 1;
        prop_assert!(selection.background.len() <= bound);
        if ratio == 0.0 {
            prop_assert!(selection.background.is_empty());
        }
    }

    #[test]
    fn class_index_is_target_position(
        catalog in proptest_helpers::arb_catalog(8, 30),
        targets in proptest_helpers::arb_targets(),
    ) {
        let resolver = ClassResolver::new(targets.clone(), None);
        for image in catalog.images() {
            let LabelPayload::Yolo(lines) = transcode(&catalog, &resolver, image, LabelFormat::Yolo, false) else {
                continue;
            };
            let matching: Vec<&Annotation> = catalog
                .annotations_for(image.id)
                .into_iter()
                .filter(|ann| resolver.matches(catalog.category_name(ann.category_id)))
                .collect();
            prop_assert_eq!(lines.len(), matching.len());
            for (line, ann) in lines.iter().zip(matching) {
                let name = catalog.category_name(ann.category_id).unwrap();
                let expected = targets.iter().position(|t| t == name).unwrap();
                prop_assert_eq!(line.class_index, expected);
            }
        }
    }

    #[test]
    fn merged_labels_only_use_class_zero(
        catalog in proptest_helpers::arb_catalog(8, 30),
        targets in proptest_helpers::arb_targets(),
    ) {
        let mut catalog = catalog;
        let resolver = ClassResolver::new(targets, Some("merged".to_string()));
        let first = resolver.ensure_merged_category(&mut catalog);
        let second = resolver.ensure_merged_category(&mut catalog);
        prop_assert_eq!(first, second);

        for image in catalog.images() {
            let payload = transcode(&catalog, &resolver, image, LabelFormat::Yolo, false);
            let text = payload.render().expect("render yolo");
            prop_assert!(text.lines().all(|line| line.starts_with("0 ")));
        }
    }
}
