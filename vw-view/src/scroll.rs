//! Scroll-bar bookkeeping.

/// A scrolling axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Range, page and position of one scroll bar, in device units.
///
/// The range is `0..=max`; the largest reachable position is
/// `max(0, max - page + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollInfo {
    pub max: i32,
    pub page: i32,
    pub pos: i32,
}

impl ScrollInfo {
    /// Scroll info for content `extent` units long seen through a `page`-unit window.
    pub fn for_extent(extent: i32, page: i32) -> Self {
        Self {
            max: (extent - 1).max(0),
            page: page.max(0),
            pos: 0,
        }
    }

    /// Total content length.
    pub fn extent(&self) -> i32 {
        self.max + 1
    }

    pub fn max_pos(&self) -> i32 {
        (self.max - self.page + 1).max(0)
    }

    pub fn clamp_pos(&self, pos: i32) -> i32 {
        pos.clamp(0, self.max_pos())
    }

    /// Clamp the position in place; returns true when it moved.
    pub fn clamp(&mut self) -> bool {
        let clamped = self.clamp_pos(self.pos);
        let moved = clamped != self.pos;
        self.pos = clamped;
        moved
    }
}
