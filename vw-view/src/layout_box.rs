//! The layout box capability a root site positions, scrolls and draws.

use crate::error::ViewResult;
use crate::selection::{Selection, SelectionLocation, SelectionState, TextPropChanges};
use std::cell::RefCell;
use std::rc::Rc;
use vw_graphics::{CoordRects, Graphics, Point, Rect};

/// A layout box shared by the panes that show it.
pub type SharedLayoutBox = Rc<RefCell<dyn LayoutBox>>;

/// Result of preparing content for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareStatus {
    /// Ready to draw at the given coordinates.
    Normal,
    /// Content changed size; recompute coordinates and prepare again.
    NeedsAdjustment,
    /// The whole view must be repainted; abandon this pass.
    Invalidated,
}

/// A lazy region that changed size, in layout units.
///
/// `position` is the layout y of the region's top; `delta` is positive when
/// the region expanded and negative when it collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyExpansion {
    pub position: i32,
    pub delta: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareOutcome {
    pub status: PrepareStatus,
    pub expansions: Vec<LazyExpansion>,
}

impl PrepareOutcome {
    pub fn normal() -> Self {
        Self {
            status: PrepareStatus::Normal,
            expansions: Vec::new(),
        }
    }

    /// Outcome reporting `expansions`; `NeedsAdjustment` unless there are none.
    pub fn expanded(expansions: Vec<LazyExpansion>) -> Self {
        let status = if expansions.is_empty() {
            PrepareStatus::Normal
        } else {
            PrepareStatus::NeedsAdjustment
        };
        Self { status, expansions }
    }
}

/// Laid-out content with a selection.
///
/// Coordinates passed in and returned are layout-frame device units computed
/// with `coords`; heights and widths are in layout units.
pub trait LayoutBox {
    /// Re-flow the content to `width` layout units.
    fn layout(&mut self, gr: &mut dyn Graphics, width: i32) -> ViewResult<()>;

    /// Total content height in layout units.
    fn height(&self) -> i32;

    /// Total content width in layout units.
    fn width(&self) -> i32;

    /// Materialize lazy content intersecting `clip` and report size changes.
    fn prepare_to_draw(&mut self, gr: &mut dyn Graphics, coords: &CoordRects, clip: Rect)
        -> ViewResult<PrepareOutcome>;

    fn draw_root(
        &mut self,
        gr: &mut dyn Graphics,
        coords: &CoordRects,
        clip: Rect,
        draw_selection: bool,
    ) -> ViewResult<()>;

    /// Install a caret at `point`, returning it, or `None` when nothing is there.
    fn make_selection_at(&mut self, gr: &mut dyn Graphics, coords: &CoordRects, point: Point)
        -> ViewResult<Option<Selection>>;

    fn selection(&self) -> Option<Selection>;

    fn make_text_selection(&mut self, selection: Selection) -> ViewResult<()>;

    /// Apply property changes to the text of the current selection.
    fn set_selection_properties(&mut self, changes: &TextPropChanges) -> ViewResult<()>;

    fn selection_location(
        &mut self,
        gr: &mut dyn Graphics,
        coords: &CoordRects,
        selection: &Selection,
    ) -> ViewResult<SelectionLocation>;

    fn activate(&mut self, state: SelectionState);

    /// Collapse materialized regions back to lazy placeholders where
    /// `approve(top, bottom)` (layout units) allows it, reporting the collapses.
    fn convert_offscreen_to_lazy(&mut self, approve: &mut dyn FnMut(i32, i32) -> bool) -> Vec<LazyExpansion>;
}
