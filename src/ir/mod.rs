//! COCO records and the label formats cocoslice reads and writes.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: image and category ids are newtypes, and boxes carry a
//!    marker for pixel vs normalized space so the two cannot be mixed.
//!
//! 2. **Source Fidelity**: annotation records keep their raw JSON so the
//!    reduced-COCO output is exactly what the source file contained.
//!
//! 3. **Permissive Construction**: malformed boxes load without complaint;
//!    the engine passes them through instead of rejecting the dataset.
//!
//! # Example
//!
//! ```
//! use cocoslice::ir::{Annotation, Category, CocoFile, Image};
//!
//! let coco = CocoFile {
//!     images: vec![Image::new(1u64, "000000000001.jpg", 640, 480)],
//!     categories: vec![Category::new(17u64, "cat")],
//!     annotations: vec![Annotation::new(1u64, 17u64, [10.0, 20.0, 90.0, 60.0])],
//! };
//! assert_eq!(coco.annotations[0].pixel_bbox().to_cxcywh().0, 55.0);
//! ```

mod bbox;
mod ids;
pub mod io_coco_json;
pub mod io_yolo;
mod model;
mod space;

pub use bbox::BBoxXYWH;
pub use ids::{CategoryId, ImageId};
pub use model::{Annotation, Category, CocoFile, Image};
pub use space::{Normalized, Pixel};
