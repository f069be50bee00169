//! Per-image label conversion.
//!
//! YOLO output keeps only annotations whose category the resolver accepts
//! and normalizes their boxes by the image size. Reduced-COCO output
//! reproduces every source record of the image untouched.

use crate::catalog::{Catalog, ClassResolver};
use crate::config::LabelFormat;
use crate::ir::io_coco_json::ReducedCoco;
use crate::ir::io_yolo::{render_label_lines, YoloLine};
use crate::ir::Image;

/// The body of one label file.
#[derive(Debug)]
pub enum LabelPayload<'a> {
    /// An empty file (background images, images without matches).
    Empty,
    Yolo(Vec<YoloLine>),
    Coco(ReducedCoco<'a>),
}

impl LabelPayload<'_> {
    /// Renders the file contents.
    pub fn render(&self) -> Result<String, serde_json::Error> {
        match self {
            LabelPayload::Empty => Ok(String::new()),
            LabelPayload::Yolo(lines) => Ok(render_label_lines(lines)),
            LabelPayload::Coco(doc) => doc.to_json_string(),
        }
    }

    /// Number of label rows or records carried.
    pub fn len(&self) -> usize {
        match self {
            LabelPayload::Empty => 0,
            LabelPayload::Yolo(lines) => lines.len(),
            LabelPayload::Coco(doc) => doc.annotations.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Converts the annotations of `image` into a label payload.
///
/// Background images always get [`LabelPayload::Empty`], as do YOLO labels
/// for an image with zero width or height (no finite normalized box exists).
pub fn transcode<'a>(
    catalog: &'a Catalog,
    resolver: &ClassResolver,
    image: &Image,
    format: LabelFormat,
    is_background: bool,
) -> LabelPayload<'a> {
    if is_background {
        return LabelPayload::Empty;
    }

    match format {
        LabelFormat::Yolo => yolo_payload(catalog, resolver, image),
        LabelFormat::ReducedCoco => {
            LabelPayload::Coco(ReducedCoco::new(catalog.annotations_for(image.id)))
        }
    }
}

fn yolo_payload<'a>(catalog: &Catalog, resolver: &ClassResolver, image: &Image) -> LabelPayload<'a> {
    if !image.has_area() {
        return LabelPayload::Empty;
    }

    let width = f64::from(image.width);
    let height = f64::from(image.height);

    let lines: Vec<YoloLine> = catalog
        .annotations_for(image.id)
        .into_iter()
        .filter_map(|ann| {
            let class_index = resolver.output_index(catalog, ann.category_id)?;
            let bbox = ann.pixel_bbox().to_normalized(width, height);
            Some(YoloLine::new(class_index, bbox))
        })
        .collect();

    if lines.is_empty() {
        LabelPayload::Empty
    } else {
        LabelPayload::Yolo(lines)
    }
}
