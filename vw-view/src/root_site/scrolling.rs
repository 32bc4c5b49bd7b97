//! Scroll ranges, scrolling, lazy-content bookkeeping and keeping the
//! selection in view.

use super::{RootSite, SiblingUpdate};
use crate::error::{ViewError, ViewResult};
use crate::scroll::Axis;
use crate::selection::{Selection, SelectionLocation};
use vw_graphics::{Point, Rect, Size};

/// How [`RootSite::scroll_selection_into_view`] positions the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollMode {
    /// Scroll as little as possible.
    #[default]
    Default,
    /// Bring the selection about a quarter of the way down the view when it is
    /// off-screen or deep in the lower part of the view.
    NearTop,
}

/// Scroll needed to bring `low..high` into a `page`-long window at 0.
///
/// A span longer than the window shows its leading edge when `leading_first`
/// is set and its trailing edge otherwise.
fn reveal_delta(low: i32, high: i32, page: i32, leading_first: bool) -> i32 {
    if high - low > page {
        if leading_first {
            low
        } else {
            high - page
        }
    } else if low < 0 {
        low
    } else if high > page {
        high - page
    } else {
        0
    }
}

impl RootSite {
    /// Descender allowance below the content: an eighth of an inch plus padding.
    fn bottom_padding(&self) -> i32 {
        let dpi_y = self.graphics.y_units_per_inch().unwrap_or(96) as i32;
        dpi_y / 8 + self.config.scroll_padding
    }

    /// Recompute both scroll ranges from the layout box's size and post them
    /// to the host.
    ///
    /// Returns true when the position had to be clamped, in which case the
    /// whole view was invalidated.
    pub fn update_scroll_range(&mut self) -> bool {
        let forced = self.refresh_scroll_range();
        if let Some(outbox) = self.sibling_outbox.as_mut() {
            if outbox.last() != Some(&SiblingUpdate::Recompute) {
                outbox.push(SiblingUpdate::Recompute);
            }
        }
        forced
    }

    /// [`update_scroll_range`](Self::update_scroll_range) without telling a
    /// sibling pane.
    pub(crate) fn refresh_scroll_range(&mut self) -> bool {
        match self.try_update_scroll_range() {
            Ok(forced) => forced,
            Err(err) => {
                log::warn!(target: "rootsite", "{} could not update scroll range: {}", self.id, err);
                false
            }
        }
    }

    fn try_update_scroll_range(&mut self) -> ViewResult<bool> {
        let (height, width) = {
            let root = self.borrow_root()?;
            (root.height(), root.width())
        };
        let coords = self.coord_rects_at(Point::new(0, 0))?;
        let frame = self.frame_size();
        let vertical_extent = self.config.top_margin + coords.scale_to_dst_y(height) + self.bottom_padding();
        let horizontal_extent = 2 * self.config.horizontal_margin + coords.scale_to_dst_x(width);

        let forced_v = self.set_range(Axis::Vertical, vertical_extent, frame.height);
        let forced_h = self.set_range(Axis::Horizontal, horizontal_extent, frame.width);
        let forced = forced_v || forced_h;
        if forced {
            self.invalidate_all();
        }
        Ok(forced)
    }

    fn set_range(&mut self, axis: Axis, extent: i32, page: i32) -> bool {
        let scrolls = self.kind.scrolls(axis);
        let info = self.scroll_info_mut(axis);
        info.max = (extent - 1).max(0);
        info.page = if scrolls { page.max(0) } else { page.max(extent) };
        let moved = info.clamp();
        self.post_scroll_info(axis);
        moved
    }

    fn post_scroll_info(&self, axis: Axis) {
        if self.kind.scrolls(axis) {
            let info = self.scroll_info(axis);
            self.host.borrow_mut().set_scroll_info(self.kind.host_axis(axis), info);
        }
    }

    /// Grow or shrink the scroll range by `size_delta` device units for a
    /// change at scroll-space `position`.
    ///
    /// Changes above the current position shift it so the visible content
    /// stays put. Returns true when the position was forced by clamping, in
    /// which case the whole view was invalidated. In a split view the change
    /// is mirrored onto the other pane.
    pub fn adjust_scroll_range(&mut self, size_delta: i32, position: i32, axis: Axis) -> bool {
        let forced = self.apply_range_adjustment(size_delta, position, axis);
        if let Some(outbox) = self.sibling_outbox.as_mut() {
            outbox.push(SiblingUpdate::Adjust {
                size_delta,
                position,
                axis,
            });
        }
        forced
    }

    pub(crate) fn apply_range_adjustment(&mut self, size_delta: i32, position: i32, axis: Axis) -> bool {
        let scrolls = self.kind.scrolls(axis);
        let info = self.scroll_info_mut(axis);
        let mut wanted = info.pos;
        if position < wanted {
            wanted += size_delta;
        }
        info.max = (info.max + size_delta).max(0);
        if !scrolls {
            info.page = info.page.max(info.max + 1);
        }
        info.pos = info.clamp_pos(wanted);
        let forced = info.pos != wanted;
        self.post_scroll_info(axis);
        if forced {
            log::debug!(target: "rootsite", "{} scroll position forced to {}", self.id, self.scroll_info(axis).pos);
            self.invalidate_all();
        }
        forced
    }

    /// Scroll by (`dx`, `dy`) in the layout frame, clamped to the range.
    /// Returns the distance actually scrolled.
    pub fn scroll_by(&mut self, dx: i32, dy: i32) -> Point {
        let old = self.scroll_position();
        let new_x = self.horizontal.clamp_pos(old.x + dx);
        let new_y = self.vertical.clamp_pos(old.y + dy);
        let moved = Point::new(new_x - old.x, new_y - old.y);
        if moved == Point::new(0, 0) {
            return moved;
        }
        self.horizontal.pos = new_x;
        self.vertical.pos = new_y;
        self.post_scroll_info(Axis::Horizontal);
        self.post_scroll_info(Axis::Vertical);
        let (px, py) = self.kind.scroll_displacement(moved.x, moved.y);
        self.host.borrow_mut().scroll_window(px, py);
        moved
    }

    /// Scroll to an absolute layout-frame position, clamped to the range.
    pub fn scroll_to(&mut self, position: Point) -> Point {
        let old = self.scroll_position();
        self.scroll_by(position.x - old.x, position.y - old.y)
    }

    /// Whether the region `top..bottom` (layout units) lies at least a full
    /// view height outside the visible area.
    pub fn ok_to_convert_to_lazy(&self, top: i32, bottom: i32) -> bool {
        let Ok(coords) = self.coord_rects() else {
            return false;
        };
        let page = self.frame_size().height;
        coords.to_dst_y(bottom) < -page || coords.to_dst_y(top) > 2 * page
    }

    /// Collapse far off-screen content back to lazy placeholders, shrinking
    /// the scroll range to match. Returns how many regions collapsed.
    pub fn release_offscreen_content(&mut self) -> ViewResult<usize> {
        let collapsed = {
            let mut root = self.borrow_root_mut()?;
            root.convert_offscreen_to_lazy(&mut |top, bottom| self.ok_to_convert_to_lazy(top, bottom))
        };
        self.apply_expansions(&collapsed, true)?;
        Ok(collapsed.len())
    }

    /// Grow the vertical range so the bottom of the selection plus the
    /// bottom padding is reachable.
    fn grow_to_include(&mut self, location: &SelectionLocation) {
        if !self.kind.scrolls(Axis::Vertical) {
            return;
        }
        let bottom = match location.secondary {
            Some(secondary) => location.primary.bottom.max(secondary.bottom),
            None => location.primary.bottom,
        };
        let needed = self.vertical.pos + bottom + 1 + self.bottom_padding();
        if needed > self.vertical.extent() {
            log::debug!(target: "rootsite", "{} growing scroll range to {}", self.id, needed);
            self.vertical.max = needed - 1;
            self.post_scroll_info(Axis::Vertical);
        }
    }

    /// The scroll position that shows `location`, or `None` when it is
    /// already visible.
    fn reveal_position(&self, location: &SelectionLocation, mode: ScrollMode, frame: Size) -> Option<Point> {
        let mut rect = location.primary.inflate(0, 1);
        if let Some(secondary) = location.secondary {
            let both = rect.union(&secondary.inflate(0, 1));
            if both.height() <= frame.height {
                rect = both;
            }
        }

        let page = frame.height;
        let off_screen = rect.bottom <= 0 || rect.top >= page;
        let dy = match mode {
            ScrollMode::NearTop if off_screen || rect.top > page * 3 / 4 => rect.top - page / 4,
            _ => reveal_delta(rect.top, rect.bottom, page, location.end_before_anchor),
        };
        let dx = if self.kind.scrolls(Axis::Horizontal) {
            reveal_delta(rect.left, rect.right, frame.width, location.end_before_anchor)
        } else {
            0
        };

        let current = self.scroll_position();
        let target = Point::new(
            self.horizontal.clamp_pos(current.x + dx),
            self.vertical.clamp_pos(current.y + dy),
        );
        (target != current).then_some(target)
    }

    /// Scroll so `selection` (the layout box's own selection when `None`) is
    /// visible.
    ///
    /// Each candidate position is tried by preparing the content there; if
    /// that expands lazy content and moves the range, the selection is located
    /// again and a new candidate computed. After the configured number of
    /// passes the last candidate is used and a warning reported. Returns
    /// whether the view scrolled.
    pub fn scroll_selection_into_view(&mut self, selection: Option<&Selection>, mode: ScrollMode) -> ViewResult<bool> {
        let selection = match selection {
            Some(selection) => *selection,
            None => match self.borrow_root()?.selection() {
                Some(selection) => selection,
                None => return Ok(false),
            },
        };
        if !self.is_ready() {
            return Ok(false);
        }

        let start = self.scroll_position();
        let frame = self.frame_size();
        let viewport = Rect::new(0, 0, frame.width, frame.height);
        let mut candidate = None;
        for pass in 1..=self.config.max_convergence_passes {
            let coords = self.coord_rects()?;
            let location = {
                let mut root = self.root.try_borrow_mut().map_err(|_| ViewError::RootBoxBusy)?;
                root.selection_location(&mut *self.graphics, &coords, &selection)?
            };
            self.grow_to_include(&location);
            let Some(target) = self.reveal_position(&location, mode, frame) else {
                return Ok(self.scroll_position() != start);
            };
            candidate = Some(target);

            let before = (self.vertical, self.horizontal);
            let trial = self.coord_rects_at(target)?;
            let outcome = {
                let mut root = self.root.try_borrow_mut().map_err(|_| ViewError::RootBoxBusy)?;
                root.prepare_to_draw(&mut *self.graphics, &trial, viewport)?
            };
            self.apply_expansions(&outcome.expansions, true)?;
            if (self.vertical, self.horizontal) == before {
                self.scroll_to(target);
                return Ok(true);
            }
            log::debug!(target: "rootsite", "{} range moved during trial pass {}", self.id, pass);
        }

        if let Some(target) = candidate {
            self.scroll_to(target);
        }
        self.report_error(&format!(
            "Selection position did not settle after {} passes",
            self.config.max_convergence_passes
        ));
        Ok(self.scroll_position() != start)
    }
}
