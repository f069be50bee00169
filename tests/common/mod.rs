#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Writes `annotations/instances_<stem>.json`.
pub fn write_annotations(root: &Path, stem: &str, coco: &Value) {
    let path = root
        .join("annotations")
        .join(format!("instances_{stem}.json"));
    fs::create_dir_all(path.parent().unwrap()).expect("create annotations dir");
    fs::write(path, serde_json::to_string_pretty(coco).unwrap()).expect("write annotations");
}

/// Writes a small bitmap for every image record into `images/<stem>/`.
pub fn write_images_for(root: &Path, stem: &str, coco: &Value) {
    for image in coco["images"].as_array().expect("images array") {
        let name = image["file_name"].as_str().expect("file_name");
        write_bmp(&root.join("images").join(stem).join(name), 4, 4);
    }
}

/// A pets split: `cats` cat images then `dogs` dog images, 640x480 each.
///
/// Image ids start at 1. Cats are `cat_NNN.bmp`, dogs `dog_NNN.bmp`.
/// The first cat image also holds a person. Every annotation carries
/// `id`, `area`, `iscrowd` and a `segmentation` polygon.
pub fn pets_coco(cats: u64, dogs: u64) -> Value {
    let mut images = Vec::new();
    let mut annotations = Vec::new();
    let mut ann_id = 1000u64;

    for id in 1..=cats + dogs {
        let is_cat = id <= cats;
        let file_name = if is_cat {
            format!("cat_{id:03}.bmp")
        } else {
            format!("dog_{id:03}.bmp")
        };
        images.push(json!({"id": id, "file_name": file_name, "width": 640, "height": 480}));

        let (category_id, bbox) = if is_cat {
            (17, json!([64.0, 48.0, 320.0, 240.0]))
        } else {
            (18, json!([0.0, 0.0, 64.0, 48.0]))
        };
        ann_id += 1;
        annotations.push(json!({
            "id": ann_id,
            "image_id": id,
            "category_id": category_id,
            "bbox": bbox,
            "area": 1234.5,
            "iscrowd": 0,
            "segmentation": [[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]]
        }));

        if id == 1 && is_cat {
            ann_id += 1;
            annotations.push(json!({
                "id": ann_id,
                "image_id": id,
                "category_id": 1,
                "bbox": [320.0, 240.0, 64.0, 48.0],
                "area": 3072.0,
                "iscrowd": 0,
                "segmentation": []
            }));
        }
    }

    json!({
        "info": {"description": "pets"},
        "images": images,
        "categories": [
            {"id": 1, "name": "person", "supercategory": "person"},
            {"id": 17, "name": "cat", "supercategory": "animal"},
            {"id": 18, "name": "dog", "supercategory": "animal"}
        ],
        "annotations": annotations
    })
}

/// Builds a full COCO 2017 tree under `root`:
/// train (10 cats, 10 dogs), val (3 cats, 2 dogs) and five unlabelled
/// test images `test_0.bmp`..`test_4.bmp`.
pub fn build_pets_dataset(root: &Path) {
    let train = pets_coco(10, 10);
    write_annotations(root, "train2017", &train);
    write_images_for(root, "train2017", &train);

    let val = pets_coco(3, 2);
    write_annotations(root, "val2017", &val);
    write_images_for(root, "val2017", &val);

    for idx in 0..5 {
        write_bmp(
            &root.join("images/test2017").join(format!("test_{idx}.bmp")),
            4,
            4,
        );
    }
}

/// Reads a manifest into its entries.
pub fn read_manifest(path: &Path) -> Vec<String> {
    let text = fs::read_to_string(path).expect("read manifest");
    assert!(!text.ends_with('\n'), "manifest must not end with a newline");
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').map(str::to_string).collect()
    }
}
