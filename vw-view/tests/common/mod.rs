#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use vw_graphics::{
    CoordRects, FixedMetrics, Graphics, Point, Rect, RecordingSurface, VwGraphics,
};
use vw_view::{
    HeadlessHost, LayoutBox, LazyExpansion, PrepareOutcome, RenderingContext, RootSite,
    Selection, SelectionLocation, SelectionState, SharedHost, SharedLayoutBox, TextPos,
    TextPropChanges, ViewConfig, ViewError, ViewKind, ViewResult,
};

/// A paragraph of fixed height that may start as a lazy placeholder.
#[derive(Debug, Clone)]
pub struct FakePara {
    pub height: i32,
    /// Placeholder height while lazy.
    pub estimate: Option<i32>,
    pub lazy: bool,
}

impl FakePara {
    pub fn current_height(&self) -> i32 {
        match (self.lazy, self.estimate) {
            (true, Some(estimate)) => estimate,
            _ => self.height,
        }
    }
}

/// A layout box made of stacked paragraphs, one unit of text wide.
#[derive(Debug, Default)]
pub struct FakeBox {
    pub paras: Vec<FakePara>,
    pub selection: Option<Selection>,
    /// Reported instead of the paragraph rectangle when set (layout units).
    pub location_override: Option<Rect>,
    pub fail_layout: bool,
    /// Every prepare grows the first paragraph by this much.
    pub grow_on_prepare: i32,
    pub layout_widths: Vec<i32>,
    pub prepare_calls: usize,
    pub draws: Vec<(Rect, bool)>,
    /// Target vertical resolution and the device offset of layout y = 20, per draw.
    pub draw_scales: Vec<(u32, i32)>,
    pub states: Vec<SelectionState>,
    pub property_changes: Vec<TextPropChanges>,
}

impl FakeBox {
    pub fn uniform(count: usize, height: i32) -> Self {
        Self {
            paras: (0..count)
                .map(|_| FakePara {
                    height,
                    estimate: None,
                    lazy: false,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// `count` paragraphs of `height` units that start lazy at `estimate`.
    pub fn lazy(count: usize, height: i32, estimate: i32) -> Self {
        Self {
            paras: (0..count)
                .map(|_| FakePara {
                    height,
                    estimate: Some(estimate),
                    lazy: true,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn para_top(&self, index: usize) -> i32 {
        self.paras[..index].iter().map(FakePara::current_height).sum()
    }

    fn para_at(&self, y: i32) -> Option<usize> {
        let mut top = 0;
        for (i, para) in self.paras.iter().enumerate() {
            let bottom = top + para.current_height();
            if y >= top && y < bottom {
                return Some(i);
            }
            top = bottom;
        }
        None
    }

    fn para_rect(&self, index: usize) -> Rect {
        let top = self.para_top(index);
        Rect::new(0, top, 100, top + self.paras[index].current_height())
    }
}

impl LayoutBox for FakeBox {
    fn layout(&mut self, _gr: &mut dyn Graphics, width: i32) -> ViewResult<()> {
        if self.fail_layout {
            return Err(ViewError::Layout("refused".to_string()));
        }
        self.layout_widths.push(width);
        Ok(())
    }

    fn height(&self) -> i32 {
        self.paras.iter().map(FakePara::current_height).sum()
    }

    fn width(&self) -> i32 {
        self.layout_widths.last().copied().unwrap_or(0)
    }

    fn prepare_to_draw(
        &mut self,
        _gr: &mut dyn Graphics,
        coords: &CoordRects,
        clip: Rect,
    ) -> ViewResult<PrepareOutcome> {
        self.prepare_calls += 1;
        let mut expansions = Vec::new();
        if self.grow_on_prepare != 0 {
            self.paras[0].height += self.grow_on_prepare;
            expansions.push(LazyExpansion {
                position: 0,
                delta: self.grow_on_prepare,
            });
        }
        let mut top = 0;
        for para in &mut self.paras {
            let shown = para.current_height();
            let (dst_top, dst_bottom) = (coords.to_dst_y(top), coords.to_dst_y(top + shown));
            if para.lazy && dst_bottom > clip.top && dst_top < clip.bottom {
                para.lazy = false;
                expansions.push(LazyExpansion {
                    position: top,
                    delta: para.height - shown,
                });
            }
            top += para.current_height();
        }
        Ok(PrepareOutcome::expanded(expansions))
    }

    fn draw_root(
        &mut self,
        gr: &mut dyn Graphics,
        coords: &CoordRects,
        clip: Rect,
        draw_selection: bool,
    ) -> ViewResult<()> {
        self.draw_scales.push((gr.y_units_per_inch()?, coords.to_dst_y(20) - coords.to_dst_y(0)));
        gr.draw_line(clip.left, clip.top, clip.right, clip.top)?;
        self.draws.push((clip, draw_selection));
        Ok(())
    }

    fn make_selection_at(
        &mut self,
        _gr: &mut dyn Graphics,
        coords: &CoordRects,
        point: Point,
    ) -> ViewResult<Option<Selection>> {
        let y = coords.to_src_y(point.y);
        let selection = self
            .para_at(y)
            .map(|para| Selection::caret(TextPos::new(para, 0)));
        if selection.is_some() {
            self.selection = selection;
        }
        Ok(selection)
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn make_text_selection(&mut self, selection: Selection) -> ViewResult<()> {
        self.selection = Some(selection);
        Ok(())
    }

    fn set_selection_properties(&mut self, changes: &TextPropChanges) -> ViewResult<()> {
        self.property_changes.push(changes.clone());
        Ok(())
    }

    fn selection_location(
        &mut self,
        _gr: &mut dyn Graphics,
        coords: &CoordRects,
        selection: &Selection,
    ) -> ViewResult<SelectionLocation> {
        let primary = self
            .location_override
            .unwrap_or_else(|| self.para_rect(selection.end.para));
        let secondary = (selection.is_range() && self.location_override.is_none())
            .then(|| coords.to_dst_rect(&self.para_rect(selection.anchor.para)));
        Ok(SelectionLocation {
            primary: coords.to_dst_rect(&primary),
            secondary,
            end_before_anchor: selection.end_before_anchor(),
            is_range: selection.is_range(),
        })
    }

    fn activate(&mut self, state: SelectionState) {
        self.states.push(state);
    }

    fn convert_offscreen_to_lazy(
        &mut self,
        approve: &mut dyn FnMut(i32, i32) -> bool,
    ) -> Vec<LazyExpansion> {
        let mut collapsed = Vec::new();
        let mut top = 0;
        for para in &mut self.paras {
            if let Some(estimate) = para.estimate {
                if !para.lazy && approve(top, top + para.height) {
                    para.lazy = true;
                    collapsed.push(LazyExpansion {
                        position: top,
                        delta: estimate - para.height,
                    });
                }
            }
            top += para.current_height();
        }
        collapsed
    }
}

pub struct Fixture {
    pub host: Rc<RefCell<HeadlessHost>>,
    pub root: Rc<RefCell<FakeBox>>,
    pub context: Rc<RenderingContext>,
}

impl Fixture {
    pub fn new(layout_box: FakeBox, width: i32, height: i32) -> Self {
        Self {
            host: HeadlessHost::shared(width, height),
            root: Rc::new(RefCell::new(layout_box)),
            context: RenderingContext::new(8),
        }
    }

    pub fn site(&self, kind: ViewKind, config: ViewConfig) -> RootSite {
        self.site_on(self.host.clone(), kind, config)
    }

    pub fn site_on(&self, host: Rc<RefCell<HeadlessHost>>, kind: ViewKind, config: ViewConfig) -> RootSite {
        let root: SharedLayoutBox = self.root.clone();
        let host: SharedHost = host;
        RootSite::new(root, host, Box::new(measuring_graphics()), kind, config, self.context.clone())
    }
}

pub fn measuring_graphics() -> VwGraphics<RecordingSurface> {
    VwGraphics::with_surface(RecordingSurface::with_metrics(96, FixedMetrics::default()))
}

/// No margins, so layout units map one to one onto device units.
pub fn flush_config() -> ViewConfig {
    ViewConfig {
        horizontal_margin: 0,
        top_margin: 0,
        ..ViewConfig::default()
    }
}
