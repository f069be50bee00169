//! Coordinate space marker types.
//!
//! Zero-sized types used as type parameters so absolute COCO boxes and
//! normalized YOLO boxes cannot be mixed up at compile time.

use std::fmt;

/// Absolute pixel coordinates, origin at the top-left corner of the image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Coordinates expressed as fractions of the image width/height.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
