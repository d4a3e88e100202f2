//! Mapping between display space (what is on screen) and original space
//! (pixels of the full-resolution file).

use crate::scale::Scale;
use crate::selection::Selection;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel rectangle, half-open on the right and bottom edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn from_corners(min: Point, max: Point) -> Self {
        Self {
            x: min.x,
            y: min.y,
            width: max.x.saturating_sub(min.x),
            height: max.y.saturating_sub(min.y),
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// Display-to-original transform. A display point `p` lies at
/// `p / scale + offset` in the original image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transform {
    pub scale: Scale,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Transform {
    pub fn new(scale: Scale) -> Self {
        Self {
            scale,
            offset_x: 0,
            offset_y: 0,
        }
    }

    pub fn to_original(&self, point: Point) -> Point {
        Point {
            x: self.scale.invert(point.x) + self.offset_x,
            y: self.scale.invert(point.y) + self.offset_y,
        }
    }

    /// Inverse of [`Transform::to_original`]. `None` for points left of or
    /// above the current offset, which are not visible.
    #[allow(dead_code)]
    pub fn to_display(&self, point: Point) -> Option<Point> {
        let x = point.x.checked_sub(self.offset_x)?;
        let y = point.y.checked_sub(self.offset_y)?;
        Some(Point {
            x: self.scale.apply(x),
            y: self.scale.apply(y),
        })
    }

    /// Projects a selection into original space. Corners are normalized first
    /// since a drag can end up-left of where it started. No clamping.
    pub fn to_original_rect(&self, selection: &Selection) -> PixelRect {
        let (min, max) = selection.normalized();
        PixelRect::from_corners(self.to_original(min), self.to_original(max))
    }
}
