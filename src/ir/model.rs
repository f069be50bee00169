//! COCO records as held by a split catalog.
//!
//! Images and categories are modelled field by field. Annotations keep their
//! complete raw JSON object next to the typed keys the engine needs, because
//! reduced-COCO output must reproduce the source records untouched
//! (`segmentation`, `area`, `iscrowd` and any vendor extensions included).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::bbox::BBoxXYWH;
use super::ids::{CategoryId, ImageId};
use super::space::Pixel;

/// The three arrays of a COCO `instances_*.json` file.
///
/// `images` is required; `categories` and `annotations` default to empty
/// so that unlabelled test splits still load. `info`/`licenses` are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CocoFile {
    pub images: Vec<Image>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// An image entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,

    /// File name relative to the split's image directory.
    pub file_name: String,

    pub width: u32,

    pub height: u32,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }

    /// Returns false when either dimension is zero, in which case boxes
    /// cannot be normalized.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A category (class label).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
        }
    }

    pub fn with_supercategory(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        supercategory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: Some(supercategory.into()),
        }
    }
}

/// An annotation record.
///
/// `image_id`, `category_id` and `bbox` are parsed eagerly and must be
/// present; the full object is retained in `raw` and is what gets
/// serialized back out.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub image_id: ImageId,
    pub category_id: CategoryId,
    /// COCO layout: `[x, y, width, height]`, absolute pixels.
    pub bbox: [f64; 4],
    raw: Map<String, Value>,
}

impl Annotation {
    /// Creates an annotation whose raw record holds only the three typed keys.
    pub fn new(
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: [f64; 4],
    ) -> Self {
        let image_id = image_id.into();
        let category_id = category_id.into();

        let mut raw = Map::new();
        raw.insert("image_id".to_string(), Value::from(image_id.as_u64()));
        raw.insert("category_id".to_string(), Value::from(category_id.as_u64()));
        raw.insert("bbox".to_string(), Value::from(bbox.to_vec()));

        Self {
            image_id,
            category_id,
            bbox,
            raw,
        }
    }

    /// Adds an extra key to the raw record (e.g. `id`, `iscrowd`).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !matches!(key.as_str(), "image_id" | "category_id" | "bbox") {
            self.raw.insert(key, value.into());
        }
        self
    }

    /// The source record exactly as loaded.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn pixel_bbox(&self) -> BBoxXYWH<Pixel> {
        BBoxXYWH::from_coco(self.bbox)
    }
}

impl<'de> Deserialize<'de> for Annotation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RequiredKeys {
            image_id: ImageId,
            category_id: CategoryId,
            bbox: [f64; 4],
        }

        let value = Value::deserialize(deserializer)?;
        let keys = RequiredKeys::deserialize(&value).map_err(D::Error::custom)?;
        let Value::Object(raw) = value else {
            return Err(D::Error::custom("annotation must be a JSON object"));
        };

        Ok(Self {
            image_id: keys.image_id,
            category_id: keys.category_id,
            bbox: keys.bbox,
            raw,
        })
    }
}

impl Serialize for Annotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}
