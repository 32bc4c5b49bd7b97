//! The root site: one viewport onto a layout box.
//!
//! A root site owns the scroll state of its pane and the graphics engine used
//! to lay out and measure, translates between paint coordinates and the layout
//! box's coordinates, and keeps the selection visible as content changes.

mod focus;
mod scrolling;

use crate::config::ViewConfig;
use crate::context::RenderingContext;
use crate::error::{ViewError, ViewResult};
use crate::host::SharedHost;
use crate::layout_box::{LazyExpansion, PrepareStatus, SharedLayoutBox};
use crate::orientation::ViewKind;
use crate::registry::PaneId;
use crate::scroll::{Axis, ScrollInfo};
use crate::selection::{Selection, TextPropChanges};
use std::cell::{Ref, RefMut};
use std::rc::Rc;
use vw_graphics::{BackColor, CoordRects, Graphics, Point, Rect, Size};

pub use focus::FocusState;
pub use scrolling::ScrollMode;

/// Result of [`RootSite::layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOutcome {
    /// Width unchanged; only the scroll range was revalidated.
    Unchanged,
    /// Content was re-flowed.
    Changed,
    /// The view is too narrow or the layout failed; drawing should wait.
    NotReady,
}

/// Result of [`RootSite::draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// Layout is not ready; nothing was drawn.
    NotReady,
    /// The layout box invalidated the view; a full repaint was requested.
    Invalidated,
    /// An error interrupted the pass; it was reported and the pass dropped.
    Abandoned,
}

/// A scroll range change recorded for the sibling pane of a split view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SiblingUpdate {
    Adjust { size_delta: i32, position: i32, axis: Axis },
    /// The ranges were recomputed from the layout box's size.
    Recompute,
}

/// One viewport onto a (possibly shared) layout box.
pub struct RootSite {
    id: PaneId,
    root: SharedLayoutBox,
    host: SharedHost,
    graphics: Box<dyn Graphics>,
    kind: ViewKind,
    config: ViewConfig,
    context: Rc<RenderingContext>,
    /// Width of the last successful layout; `None` until the view is ready.
    layout_width: Option<i32>,
    vertical: ScrollInfo,
    horizontal: ScrollInfo,
    focus: FocusState,
    current: bool,
    draws_selection: bool,
    /// Range changes to mirror onto the sibling pane; `None` outside a split.
    sibling_outbox: Option<Vec<SiblingUpdate>>,
}

impl RootSite {
    pub fn new(
        root: SharedLayoutBox,
        host: SharedHost,
        graphics: Box<dyn Graphics>,
        kind: ViewKind,
        config: ViewConfig,
        context: Rc<RenderingContext>,
    ) -> Self {
        let id = context.allocate_pane_id();
        log::debug!(target: "rootsite", "{} created ({:?})", id, kind);
        Self {
            id,
            root,
            host,
            graphics,
            kind,
            config,
            context,
            layout_width: None,
            vertical: ScrollInfo::default(),
            horizontal: ScrollInfo::default(),
            focus: FocusState::Inactive,
            current: false,
            draws_selection: false,
            sibling_outbox: None,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn root(&self) -> &SharedLayoutBox {
        &self.root
    }

    pub fn host(&self) -> &SharedHost {
        &self.host
    }

    /// The graphics engine this site lays out and measures with.
    pub fn graphics_mut(&mut self) -> &mut dyn Graphics {
        &mut *self.graphics
    }

    pub fn context(&self) -> &Rc<RenderingContext> {
        &self.context
    }

    /// Scroll state of the layout frame's `axis`.
    pub fn scroll_info(&self, axis: Axis) -> ScrollInfo {
        match axis {
            Axis::Vertical => self.vertical,
            Axis::Horizontal => self.horizontal,
        }
    }

    pub fn scroll_position(&self) -> Point {
        Point::new(self.horizontal.pos, self.vertical.pos)
    }

    pub fn layout_width(&self) -> Option<i32> {
        self.layout_width
    }

    pub fn is_ready(&self) -> bool {
        self.layout_width.is_some()
    }

    pub(crate) fn scroll_info_mut(&mut self, axis: Axis) -> &mut ScrollInfo {
        match axis {
            Axis::Vertical => &mut self.vertical,
            Axis::Horizontal => &mut self.horizontal,
        }
    }

    pub(crate) fn enable_sibling_outbox(&mut self) {
        self.sibling_outbox.get_or_insert_with(Vec::new);
    }

    pub(crate) fn take_sibling_updates(&mut self) -> Vec<SiblingUpdate> {
        self.sibling_outbox.as_mut().map(std::mem::take).unwrap_or_default()
    }

    pub(crate) fn borrow_root(&self) -> ViewResult<Ref<'_, dyn crate::LayoutBox + 'static>> {
        self.root.try_borrow().map_err(|_| ViewError::RootBoxBusy)
    }

    pub(crate) fn borrow_root_mut(&self) -> ViewResult<RefMut<'_, dyn crate::LayoutBox + 'static>> {
        self.root.try_borrow_mut().map_err(|_| ViewError::RootBoxBusy)
    }

    fn client_rect(&self) -> Rect {
        self.host.borrow().client_rect()
    }

    /// Size of the visible layout frame.
    pub fn frame_size(&self) -> Size {
        self.kind.frame_size(&self.client_rect())
    }

    /// Width available to content: the frame width less both side margins.
    pub fn available_width(&self) -> i32 {
        self.frame_size().width - 2 * self.config.horizontal_margin
    }

    fn margin(&self) -> Point {
        Point::new(self.config.horizontal_margin, self.config.top_margin)
    }

    /// Layout-to-device mapping at the current scroll position.
    pub fn coord_rects(&self) -> ViewResult<CoordRects> {
        self.coord_rects_at(self.scroll_position())
    }

    pub(crate) fn coord_rects_at(&self, scroll: Point) -> ViewResult<CoordRects> {
        let dpi_x = self.graphics.x_units_per_inch()? as i32;
        let dpi_y = self.graphics.y_units_per_inch()? as i32;
        Ok(CoordRects::for_zoom(dpi_x, dpi_y, self.margin(), scroll, self.config.zoom))
    }

    /// Mapping from layout units onto a device of `target`'s resolution.
    ///
    /// The zoom is expected to be applied to `target` already.
    fn coord_rects_for(&self, target: &dyn Graphics) -> ViewResult<CoordRects> {
        let src_x = self.graphics.x_units_per_inch()? as i32;
        let src_y = self.graphics.y_units_per_inch()? as i32;
        let dst_x = target.x_units_per_inch()? as i32;
        let dst_y = target.y_units_per_inch()? as i32;
        let scroll = self.scroll_position();
        let margin = self.margin();
        Ok(CoordRects::new(
            Rect::new(0, 0, src_x, src_y),
            Rect::from_xywh(margin.x - scroll.x, margin.y - scroll.y, dst_x, dst_y),
        ))
    }

    /// Convert a paint-space point to layout units.
    pub fn client_to_layout(&self, point: Point) -> ViewResult<Point> {
        let frame = self.kind.paint_point_to_dst(point, &self.client_rect());
        Ok(self.coord_rects()?.to_src_point(frame))
    }

    /// Convert a point in layout units to paint space.
    pub fn layout_to_client(&self, point: Point) -> ViewResult<Point> {
        let frame = self.coord_rects()?.to_dst_point(point);
        Ok(self.kind.dst_point_to_paint(frame, &self.client_rect()))
    }

    /// Lay out to the width currently available in the client area, unzoomed.
    pub fn layout(&mut self) -> ViewResult<LayoutOutcome> {
        let width = (self.available_width() as f32 / self.config.zoom).round() as i32;
        self.layout_to(width)
    }

    /// Lay out to `width` layout units.
    ///
    /// Layout failures leave the view not ready rather than propagating; only
    /// a re-entrant borrow of the layout box is an error.
    pub fn layout_to(&mut self, width: i32) -> ViewResult<LayoutOutcome> {
        if self.layout_width == Some(width) {
            self.update_scroll_range();
            return Ok(LayoutOutcome::Unchanged);
        }
        if width < self.config.min_layout_width {
            log::debug!(target: "rootsite", "{} not ready: width {} too small", self.id, width);
            self.layout_width = None;
            return Ok(LayoutOutcome::NotReady);
        }
        let result = {
            let mut root = self.root.try_borrow_mut().map_err(|_| ViewError::RootBoxBusy)?;
            root.layout(&mut *self.graphics, width)
        };
        match result {
            Ok(()) => {
                log::debug!(target: "rootsite", "{} laid out at width {}", self.id, width);
                self.layout_width = Some(width);
                self.update_scroll_range();
                Ok(LayoutOutcome::Changed)
            }
            Err(err) => {
                log::warn!(target: "rootsite", "{} layout failed: {}", self.id, err);
                self.layout_width = None;
                Ok(LayoutOutcome::NotReady)
            }
        }
    }

    /// Take over a layout the sibling pane already performed at `width`.
    pub(crate) fn adopt_layout(&mut self, width: Option<i32>) {
        self.layout_width = width;
        if width.is_some() {
            self.refresh_scroll_range();
        }
    }

    /// Mark the layout stale so the next draw re-flows.
    pub fn invalidate_layout(&mut self) {
        self.layout_width = None;
        self.invalidate_all();
    }

    pub fn invalidate_all(&self) {
        self.host.borrow_mut().invalidate_rect(None);
    }

    /// Request a repaint of a rectangle given in layout units.
    pub fn invalidate_layout_rect(&self, rect: Rect) {
        let Ok(coords) = self.coord_rects() else {
            self.invalidate_all();
            return;
        };
        let client = self.client_rect();
        let paint = self.kind.rotate_dst_to_paint(coords.to_dst_rect(&rect.normalized()), &client);
        if paint.intersects(&client) {
            self.host.borrow_mut().invalidate_rect(Some(paint.intersect(&client)));
        }
    }

    /// Apply lazy-region size changes reported by the layout box.
    pub(crate) fn apply_expansions(&mut self, expansions: &[LazyExpansion], mirror: bool) -> ViewResult<bool> {
        if expansions.is_empty() {
            return Ok(false);
        }
        let coords = self.coord_rects_at(Point::new(0, 0))?;
        let mut forced = false;
        for expansion in expansions {
            let position = coords.to_dst_y(expansion.position);
            let delta = coords.scale_to_dst_y(expansion.delta);
            forced |= if mirror {
                self.adjust_scroll_range(delta, position, Axis::Vertical)
            } else {
                self.apply_range_adjustment(delta, position, Axis::Vertical)
            };
        }
        Ok(forced)
    }

    /// Paint the part of the view inside `paint_rect` onto `target`.
    ///
    /// Errors during the pass are reported once per distinct message and the
    /// pass is abandoned.
    pub fn draw(&mut self, target: &mut dyn Graphics, paint_rect: Rect) -> DrawOutcome {
        if !self.is_ready() {
            match self.layout() {
                Ok(LayoutOutcome::NotReady) => return DrawOutcome::NotReady,
                Ok(_) => {}
                Err(err) => {
                    self.report_error(&err.to_string());
                    return DrawOutcome::Abandoned;
                }
            }
        }
        match self.draw_pass(target, paint_rect) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report_error(&format!("Drawing failed: {}", err));
                DrawOutcome::Abandoned
            }
        }
    }

    /// Run a pass with `target` drawing at its resolution scaled by the
    /// zoom. Fonts on the target scale along with positions. A zoomed pass
    /// clears the target's resolution overrides when it ends.
    fn draw_pass(&mut self, target: &mut dyn Graphics, paint_rect: Rect) -> ViewResult<DrawOutcome> {
        let zoom = self.config.zoom;
        if zoom == 1.0 {
            return self.draw_pass_at(target, paint_rect);
        }
        let zoomed = |dpi: u32| ((dpi as f32 * zoom).round() as u32).max(1);
        let (dpi_x, dpi_y) = (target.x_units_per_inch()?, target.y_units_per_inch()?);
        target.set_x_units_per_inch(zoomed(dpi_x));
        target.set_y_units_per_inch(zoomed(dpi_y));
        let outcome = self.draw_pass_at(target, paint_rect);
        target.set_x_units_per_inch(0);
        target.set_y_units_per_inch(0);
        outcome
    }

    fn draw_pass_at(&mut self, target: &mut dyn Graphics, paint_rect: Rect) -> ViewResult<DrawOutcome> {
        let client = self.client_rect();
        let clip = self.kind.rotate_paint_to_dst(paint_rect.intersect(&client), &client);
        if clip.is_empty() {
            return Ok(DrawOutcome::Drawn);
        }

        let mut coords = self.coord_rects_for(target)?;
        let mut settled = false;
        for pass in 1..=self.config.max_convergence_passes {
            let outcome = self.borrow_root_mut()?.prepare_to_draw(target, &coords, clip)?;
            self.apply_expansions(&outcome.expansions, true)?;
            match outcome.status {
                PrepareStatus::Normal => {
                    settled = true;
                    break;
                }
                PrepareStatus::Invalidated => {
                    self.invalidate_all();
                    return Ok(DrawOutcome::Invalidated);
                }
                PrepareStatus::NeedsAdjustment => {
                    log::debug!(target: "rootsite", "{} prepare pass {} adjusted content", self.id, pass);
                    coords = self.coord_rects_for(target)?;
                }
            }
        }
        if !settled {
            self.report_error(&format!(
                "Content did not settle after {} prepare passes",
                self.config.max_convergence_passes
            ));
        }

        target.push_clip_rect(clip)?;
        target.set_back_color(BackColor::Color(self.config.background));
        let drawn = target
            .draw_rectangle(clip.left, clip.top, clip.right, clip.bottom)
            .map_err(ViewError::from)
            .and_then(|()| {
                self.borrow_root_mut()?
                    .draw_root(target, &coords, clip, self.draws_selection)
            });
        target.pop_clip_rect()?;
        drawn?;
        Ok(DrawOutcome::Drawn)
    }

    /// Place a caret at a paint-space point. Captures the mouse until
    /// [`RootSite::mouse_up`].
    pub fn mouse_down(&mut self, point: Point) -> ViewResult<Option<Selection>> {
        let frame = self.kind.paint_point_to_dst(point, &self.client_rect());
        let coords = self.coord_rects()?;
        let selection = {
            let mut root = self.root.try_borrow_mut().map_err(|_| ViewError::RootBoxBusy)?;
            root.make_selection_at(&mut *self.graphics, &coords, frame)?
        };
        self.host.borrow_mut().set_capture();
        if selection.is_some() {
            self.invalidate_all();
        }
        Ok(selection)
    }

    pub fn mouse_up(&mut self) {
        self.host.borrow_mut().release_capture();
    }

    /// Hit-test a paint-space point and select there.
    pub fn click(&mut self, point: Point) -> ViewResult<Option<Selection>> {
        let selection = self.mouse_down(point);
        self.mouse_up();
        selection
    }

    /// Install `selection` in the layout box and redraw.
    pub fn set_selection(&mut self, selection: Selection) -> ViewResult<()> {
        self.borrow_root_mut()?.make_text_selection(selection)?;
        self.invalidate_all();
        Ok(())
    }

    /// Apply property changes to the selected text, re-flowing the content.
    pub fn apply_selection_properties(&mut self, changes: &TextPropChanges) -> ViewResult<LayoutOutcome> {
        self.borrow_root_mut()?.set_selection_properties(changes)?;
        self.invalidate_layout();
        self.layout()
    }

    pub(crate) fn report_error(&self, message: &str) {
        let mut host = self.host.borrow_mut();
        self.context.report_error(&mut *host, message);
    }
}
