//! Fuzz target for catalog indexing, selection and YOLO transcoding.
//!
//! The first input byte picks the background ratio; the rest is COCO JSON.
//! Every category name in the file is used as a target class.

#![no_main]

use libfuzzer_sys::fuzz_target;
use cocoslice::catalog::{Catalog, ClassResolver};
use cocoslice::config::LabelFormat;
use cocoslice::ir::io_coco_json::from_coco_slice;
use cocoslice::select::select_images;
use cocoslice::transcode::transcode;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 10 * 1024 * 1024 {
        return;
    }

    let ratio = f64::from(data[0]) / 64.0;
    let Ok(coco) = from_coco_slice(&data[1..]) else {
        return;
    };

    let targets: Vec<String> = coco.categories.iter().map(|c| c.name.clone()).collect();
    let mut catalog = Catalog::from_coco(coco);
    let resolver = ClassResolver::new(targets, Some("merged".to_string()));
    resolver.ensure_merged_category(&mut catalog);

    let selection = select_images(&catalog, &resolver, ratio);
    for (image_id, is_background) in selection.iter() {
        if let Some(image) = catalog.image(image_id) {
            let payload = transcode(&catalog, &resolver, image, LabelFormat::Yolo, is_background);
            let _ = payload.render();
        }
    }
});
