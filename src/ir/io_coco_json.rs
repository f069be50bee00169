//! COCO JSON reading and reduced-COCO label writing.
//!
//! # COCO Format Reference
//!
//! COCO bounding boxes use `[x, y, width, height]` where `(x, y)` is the
//! top-left corner in absolute pixel coordinates. Boxes are kept in that
//! layout; normalization happens only when YOLO labels are produced.
//!
//! The reduced-COCO label written per image is `{"annotations": [...]}`
//! holding the source annotation records for that image, unmodified.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Serialize;

use super::model::{Annotation, CocoFile};
use crate::error::ExtractError;

/// Reads a COCO `instances_*.json` file.
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid COCO JSON.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use cocoslice::ir::io_coco_json::read_coco_json;
///
/// let coco = read_coco_json(Path::new("annotations/instances_val2017.json"))?;
/// println!("{} images", coco.images.len());
/// # Ok::<(), cocoslice::ExtractError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<CocoFile, ExtractError> {
    let file = File::open(path).map_err(ExtractError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| ExtractError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads COCO JSON from a string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<CocoFile, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads COCO JSON from raw bytes.
pub fn from_coco_slice(bytes: &[u8]) -> Result<CocoFile, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// The per-image reduced-COCO label document.
#[derive(Debug, Serialize)]
pub struct ReducedCoco<'a> {
    pub annotations: Vec<&'a Annotation>,
}

impl<'a> ReducedCoco<'a> {
    pub fn new(annotations: Vec<&'a Annotation>) -> Self {
        Self { annotations }
    }

    /// Renders compact JSON, one document per label file.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
