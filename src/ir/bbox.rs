//! Bounding boxes in COCO's top-left + size layout.

use std::marker::PhantomData;

use super::{Normalized, Pixel};

/// An axis-aligned box stored as top-left corner plus width and height.
///
/// COCO annotations arrive in this layout (`[x, y, w, h]`), so keeping it
/// avoids a lossy XYXY detour. The `TSpace` parameter is either [`Pixel`]
/// or [`Normalized`].
///
/// Nothing here enforces positive sizes; malformed boxes pass through so
/// the output mirrors the source annotations.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYWH<TSpace> {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYWH<TSpace> {
    #[inline]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            _space: PhantomData,
        }
    }

    /// Builds a box from its center point and size (the YOLO layout).
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    /// Returns `(center_x, center_y, width, height)`.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0, self.w, self.h)
    }

    /// Returns the raw `[x, y, w, h]` array.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.w, self.h]
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYWH<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYWH")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}

impl BBoxXYWH<Pixel> {
    /// Builds a pixel box from a COCO `bbox` array.
    #[inline]
    pub fn from_coco(bbox: [f64; 4]) -> Self {
        let [x, y, w, h] = bbox;
        Self::new(x, y, w, h)
    }

    /// Divides horizontal values by `image_width` and vertical values by
    /// `image_height`.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBoxXYWH<Normalized> {
        BBoxXYWH::new(
            self.x / image_width,
            self.y / image_height,
            self.w / image_width,
            self.h / image_height,
        )
    }
}

impl BBoxXYWH<Normalized> {
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBoxXYWH<Pixel> {
        BBoxXYWH::new(
            self.x * image_width,
            self.y * image_height,
            self.w * image_width,
            self.h * image_height,
        )
    }
}
