//! Two panes over one layout box.

use crate::error::{ViewError, ViewResult};
use crate::registry::ActiveSelectionRegistry;
use crate::root_site::{DrawOutcome, FocusState, LayoutOutcome, RootSite, ScrollMode, SiblingUpdate};
use crate::scroll::Axis;
use std::rc::Rc;
use vw_graphics::{Graphics, Point, Rect};

/// A split view: two root sites sharing one layout box, each with its own
/// scroll position.
///
/// Range changes and invalidations caused through either pane are applied to
/// both, and offscreen content is only released when neither pane shows it.
pub struct SplitView {
    panes: [RootSite; 2],
}

impl SplitView {
    pub fn new(mut first: RootSite, mut second: RootSite) -> ViewResult<Self> {
        if !Rc::ptr_eq(first.root(), second.root()) {
            return Err(ViewError::UnsharedRootBox);
        }
        first.enable_sibling_outbox();
        second.enable_sibling_outbox();
        log::debug!(target: "rootsite", "split view over {} and {}", first.id(), second.id());
        Ok(Self {
            panes: [first, second],
        })
    }

    pub fn pane(&self, index: usize) -> ViewResult<&RootSite> {
        self.panes.get(index).ok_or(ViewError::NoSuchPane(index))
    }

    pub fn pane_mut(&mut self, index: usize) -> ViewResult<&mut RootSite> {
        self.panes.get_mut(index).ok_or(ViewError::NoSuchPane(index))
    }

    pub fn into_panes(self) -> [RootSite; 2] {
        self.panes
    }

    fn check(&self, index: usize) -> ViewResult<usize> {
        if index < self.panes.len() {
            Ok(index)
        } else {
            Err(ViewError::NoSuchPane(index))
        }
    }

    /// Index of the pane whose selection is active.
    pub fn current_pane(&self) -> Option<usize> {
        self.panes.iter().position(RootSite::is_current)
    }

    /// Replay range changes each pane made on the other.
    ///
    /// Every split operation does this first; call it directly after working
    /// on a pane through [`pane_mut`](Self::pane_mut).
    pub fn sync(&mut self) {
        for (from, to) in [(0, 1), (1, 0)] {
            for update in self.panes[from].take_sibling_updates() {
                match update {
                    SiblingUpdate::Adjust {
                        size_delta,
                        position,
                        axis,
                    } => {
                        self.panes[to].apply_range_adjustment(size_delta, position, axis);
                    }
                    SiblingUpdate::Recompute => {
                        self.panes[to].refresh_scroll_range();
                    }
                }
            }
        }
    }

    /// Lay the shared box out at the first pane's width; the second pane
    /// adopts that layout.
    pub fn layout(&mut self) -> ViewResult<LayoutOutcome> {
        self.sync();
        let outcome = self.panes[0].layout()?;
        let width = self.panes[0].layout_width();
        self.panes[1].adopt_layout(width);
        self.sync();
        Ok(outcome)
    }

    /// Recompute both panes' ranges. True when either was forced.
    pub fn update_scroll_range(&mut self) -> bool {
        self.sync();
        let first = self.panes[0].refresh_scroll_range();
        let second = self.panes[1].refresh_scroll_range();
        first || second
    }

    /// Apply a range change to both panes. True when either was forced.
    pub fn adjust_scroll_range(&mut self, size_delta: i32, position: i32, axis: Axis) -> bool {
        self.sync();
        let first = self.panes[0].apply_range_adjustment(size_delta, position, axis);
        let second = self.panes[1].apply_range_adjustment(size_delta, position, axis);
        first || second
    }

    pub fn invalidate_layout_rect(&self, rect: Rect) {
        for pane in &self.panes {
            pane.invalidate_layout_rect(rect);
        }
    }

    /// A region may go lazy only if neither pane is near it.
    pub fn ok_to_convert_to_lazy(&self, top: i32, bottom: i32) -> bool {
        self.panes.iter().all(|pane| pane.ok_to_convert_to_lazy(top, bottom))
    }

    pub fn release_offscreen_content(&mut self) -> ViewResult<usize> {
        self.sync();
        let collapsed = {
            let [first, second] = &self.panes;
            let mut root = first.borrow_root_mut()?;
            root.convert_offscreen_to_lazy(&mut |top, bottom| {
                first.ok_to_convert_to_lazy(top, bottom) && second.ok_to_convert_to_lazy(top, bottom)
            })
        };
        for pane in &mut self.panes {
            pane.apply_expansions(&collapsed, false)?;
        }
        Ok(collapsed.len())
    }

    /// Give input focus to pane `index`; the other pane gives up focus and
    /// stops drawing the selection.
    pub fn focus_pane(&mut self, index: usize, registry: &mut ActiveSelectionRegistry) -> ViewResult<()> {
        let index = self.check(index)?;
        self.sync();
        let other = &mut self.panes[1 - index];
        if other.focus_state() != FocusState::Inactive {
            other.lose_focus();
        }
        if other.is_current() {
            other.make_non_current(registry);
        }
        self.panes[index].gain_focus(registry);
        Ok(())
    }

    /// Make pane `index` show the selection without moving input focus.
    pub fn set_current_pane(&mut self, index: usize, registry: &mut ActiveSelectionRegistry) -> ViewResult<()> {
        let index = self.check(index)?;
        self.sync();
        if self.panes[1 - index].is_current() {
            self.panes[1 - index].make_non_current(registry);
        }
        self.panes[index].make_current(registry);
        Ok(())
    }

    pub fn lose_focus(&mut self, index: usize) -> ViewResult<()> {
        self.sync();
        self.pane_mut(index)?.lose_focus();
        Ok(())
    }

    pub fn draw_pane(&mut self, index: usize, target: &mut dyn Graphics, paint_rect: Rect) -> ViewResult<DrawOutcome> {
        self.sync();
        let outcome = self.pane_mut(index)?.draw(target, paint_rect);
        self.sync();
        Ok(outcome)
    }

    pub fn scroll_by(&mut self, index: usize, dx: i32, dy: i32) -> ViewResult<Point> {
        self.sync();
        Ok(self.pane_mut(index)?.scroll_by(dx, dy))
    }

    /// Scroll the current pane (the first when none is) to its selection.
    pub fn scroll_selection_into_view(&mut self, mode: ScrollMode) -> ViewResult<bool> {
        self.sync();
        let index = self.current_pane().unwrap_or(0);
        let scrolled = self.panes[index].scroll_selection_into_view(None, mode);
        self.sync();
        scrolled
    }

    pub fn click(&mut self, index: usize, point: Point) -> ViewResult<()> {
        self.sync();
        self.pane_mut(index)?.click(point)?;
        self.sync();
        for pane in &self.panes {
            pane.host().borrow_mut().invalidate_rect(None);
        }
        Ok(())
    }
}

