//! View kinds and the mapping between the layout frame and paint coordinates.
//!
//! A root site works in the *layout frame*: the device-unit frame in which
//! content flows downward and lines run left to right. For horizontal text
//! this is the paint frame itself. For vertical text the frame is turned a
//! quarter clockwise on screen, so lines become columns that advance leftward.

use crate::scroll::Axis;
use vw_graphics::{Point, Rect, Size};

/// Direction of text lines on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// The closed set of root-site variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Laid out to the client width, never scrolled.
    Plain,
    /// Scrolls along the flow of content, and across it when `horizontal_scroll` is set.
    Scrolling {
        horizontal_scroll: bool,
        orientation: Orientation,
    },
}

impl Default for ViewKind {
    fn default() -> Self {
        ViewKind::Scrolling {
            horizontal_scroll: false,
            orientation: Orientation::Horizontal,
        }
    }
}

impl ViewKind {
    pub fn orientation(&self) -> Orientation {
        match self {
            ViewKind::Plain => Orientation::Horizontal,
            ViewKind::Scrolling { orientation, .. } => *orientation,
        }
    }

    /// Whether the layout frame scrolls along `axis`.
    pub fn scrolls(&self, axis: Axis) -> bool {
        match (self, axis) {
            (ViewKind::Plain, _) => false,
            (ViewKind::Scrolling { .. }, Axis::Vertical) => true,
            (ViewKind::Scrolling { horizontal_scroll, .. }, Axis::Horizontal) => *horizontal_scroll,
        }
    }

    /// The host scroll bar that shows the frame's `axis`.
    pub fn host_axis(&self, axis: Axis) -> Axis {
        match (self.orientation(), axis) {
            (Orientation::Horizontal, axis) => axis,
            (Orientation::Vertical, Axis::Vertical) => Axis::Horizontal,
            (Orientation::Vertical, Axis::Horizontal) => Axis::Vertical,
        }
    }

    /// Size of the layout frame seen through a client area of `client`.
    pub fn frame_size(&self, client: &Rect) -> Size {
        match self.orientation() {
            Orientation::Horizontal => client.size(),
            Orientation::Vertical => Size::new(client.height(), client.width()),
        }
    }

    /// Map a rectangle in the layout frame to paint coordinates of `client`.
    pub fn rotate_dst_to_paint(&self, rect: Rect, client: &Rect) -> Rect {
        match self.orientation() {
            Orientation::Horizontal => rect,
            Orientation::Vertical => {
                let w = client.width();
                Rect::new(w - rect.bottom, rect.left, w - rect.top, rect.right).offset(client.left, client.top)
            }
        }
    }

    /// Inverse of [`ViewKind::rotate_dst_to_paint`].
    pub fn rotate_paint_to_dst(&self, rect: Rect, client: &Rect) -> Rect {
        match self.orientation() {
            Orientation::Horizontal => rect,
            Orientation::Vertical => {
                let r = rect.offset(-client.left, -client.top);
                let w = client.width();
                Rect::new(r.top, w - r.right, r.bottom, w - r.left)
            }
        }
    }

    pub fn paint_point_to_dst(&self, p: Point, client: &Rect) -> Point {
        match self.orientation() {
            Orientation::Horizontal => p,
            Orientation::Vertical => Point::new(p.y - client.top, client.width() - (p.x - client.left)),
        }
    }

    pub fn dst_point_to_paint(&self, p: Point, client: &Rect) -> Point {
        match self.orientation() {
            Orientation::Horizontal => p,
            Orientation::Vertical => Point::new(client.left + client.width() - p.y, client.top + p.x),
        }
    }

    /// Paint-space displacement of content when the frame scrolls by (`dx`, `dy`).
    pub fn scroll_displacement(&self, dx: i32, dy: i32) -> (i32, i32) {
        match self.orientation() {
            Orientation::Horizontal => (-dx, -dy),
            Orientation::Vertical => (dy, -dx),
        }
    }
}
