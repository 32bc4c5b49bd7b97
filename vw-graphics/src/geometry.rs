//! Integer coordinate primitives shared by the drawing engine and the view layer.
//!
//! Layout boxes work in "source" units and devices in "destination" units. The
//! only translation between the two is the affine map held by [`CoordRects`].

use serde::{Deserialize, Serialize};

/// A point in device or layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// A rectangle large enough to stand for "no clipping".
    pub const UNBOUNDED: Rect = Rect {
        left: i32::MIN / 2,
        top: i32::MIN / 2,
        right: i32::MAX / 2,
        bottom: i32::MAX / 2,
    };

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and a size.
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Reorder the edges so that `left <= right` and `top <= bottom`.
    pub fn normalized(self) -> Self {
        Self::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Intersection of two rectangles; an empty rectangle when they are disjoint.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() {
            Rect::default()
        } else {
            r
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Smallest rectangle containing both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    pub fn inflate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.left - dx,
            self.top - dy,
            self.right + dx,
            self.bottom + dy,
        )
    }
}

/// Multiply then divide with 64-bit intermediates, rounding to nearest.
pub fn mul_div(value: i32, numerator: i32, denominator: i32) -> i32 {
    if denominator == 0 {
        return value;
    }
    let product = value as i64 * numerator as i64;
    let half = (denominator as i64).abs() / 2;
    let rounded = (product + half * product.signum()) / denominator as i64;
    rounded.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// The source/destination rectangle pair defining the layout-to-device mapping.
///
/// A source coordinate `s` maps to `dst.left + (s - src.left) * dst.width / src.width`
/// (and likewise vertically). Each axis scales independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordRects {
    pub src: Rect,
    pub dst: Rect,
}

impl CoordRects {
    pub const fn new(src: Rect, dst: Rect) -> Self {
        Self { src, dst }
    }

    /// The 1:1 screen mapping: source is one inch at `dpi`, destination is the
    /// same inch shifted by the margin minus the scroll offset.
    pub fn for_scroll(dpi_x: i32, dpi_y: i32, margin: Point, scroll: Point) -> Self {
        Self::for_zoom(dpi_x, dpi_y, margin, scroll, 1.0)
    }

    /// Like [`CoordRects::for_scroll`] but with the destination inch scaled by `zoom`.
    pub fn for_zoom(dpi_x: i32, dpi_y: i32, margin: Point, scroll: Point, zoom: f32) -> Self {
        let src = Rect::new(0, 0, dpi_x, dpi_y);
        let dst_w = ((dpi_x as f32) * zoom).round() as i32;
        let dst_h = ((dpi_y as f32) * zoom).round() as i32;
        let dst = Rect::from_xywh(margin.x - scroll.x, margin.y - scroll.y, dst_w, dst_h);
        Self { src, dst }
    }

    pub fn to_dst_x(&self, x: i32) -> i32 {
        self.dst.left + mul_div(x - self.src.left, self.dst.width(), self.src.width())
    }

    pub fn to_dst_y(&self, y: i32) -> i32 {
        self.dst.top + mul_div(y - self.src.top, self.dst.height(), self.src.height())
    }

    pub fn to_src_x(&self, x: i32) -> i32 {
        self.src.left + mul_div(x - self.dst.left, self.src.width(), self.dst.width())
    }

    pub fn to_src_y(&self, y: i32) -> i32 {
        self.src.top + mul_div(y - self.dst.top, self.src.height(), self.dst.height())
    }

    /// Scale a vertical length (no translation) from source to destination units.
    pub fn scale_to_dst_y(&self, dy: i32) -> i32 {
        mul_div(dy, self.dst.height(), self.src.height())
    }

    /// Scale a horizontal length (no translation) from source to destination units.
    pub fn scale_to_dst_x(&self, dx: i32) -> i32 {
        mul_div(dx, self.dst.width(), self.src.width())
    }

    pub fn to_dst_point(&self, p: Point) -> Point {
        Point::new(self.to_dst_x(p.x), self.to_dst_y(p.y))
    }

    pub fn to_src_point(&self, p: Point) -> Point {
        Point::new(self.to_src_x(p.x), self.to_src_y(p.y))
    }

    pub fn to_dst_rect(&self, r: &Rect) -> Rect {
        Rect::new(
            self.to_dst_x(r.left),
            self.to_dst_y(r.top),
            self.to_dst_x(r.right),
            self.to_dst_y(r.bottom),
        )
    }

    pub fn to_src_rect(&self, r: &Rect) -> Rect {
        Rect::new(
            self.to_src_x(r.left),
            self.to_src_y(r.top),
            self.to_src_x(r.right),
            self.to_src_y(r.bottom),
        )
    }

    /// The same mapping with the destination shifted by `(dx, dy)`.
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.src, self.dst.offset(dx, dy))
    }
}
