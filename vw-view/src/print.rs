//! Paginated output of a layout box.

use crate::context::CancelFlag;
use crate::error::{ViewError, ViewResult};
use crate::layout_box::{PrepareStatus, SharedLayoutBox};
use serde::Deserialize;
use vw_graphics::{CoordRects, Graphics, Point, Rect};

/// Prepare passes allowed while materializing lazy content before paging.
const MAX_EXPANSION_PASSES: usize = 16;

/// Page geometry in device units at `dpi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageSetup {
    pub width: i32,
    pub height: i32,
    pub margin: i32,
    pub dpi: u32,
}

impl PageSetup {
    /// US letter with half-inch margins.
    pub fn letter(dpi: u32) -> Self {
        let dpi_i = dpi as i32;
        Self {
            width: dpi_i * 17 / 2,
            height: dpi_i * 11,
            margin: dpi_i / 2,
            dpi,
        }
    }

    /// The area inside the margins.
    pub fn printable(&self) -> Rect {
        Rect::new(self.margin, self.margin, self.width - self.margin, self.height - self.margin)
    }
}

/// Receives one graphics target per page.
pub trait PageSink {
    type Page: Graphics;

    fn begin_page(&mut self, index: usize) -> ViewResult<Self::Page>;

    fn end_page(&mut self, index: usize, page: Self::Page) -> ViewResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    Completed { pages: usize },
    Cancelled { pages_printed: usize },
}

/// Lay `root` out to the printable width and emit it page by page.
///
/// `measure` is used for layout at the page resolution and gets its own
/// resolution back afterwards. Cancellation is polled before each page; a
/// cancelled job stops cleanly with the pages already emitted.
pub fn print_pages<S: PageSink>(
    root: &SharedLayoutBox,
    measure: &mut dyn Graphics,
    setup: &PageSetup,
    cancel: &CancelFlag,
    sink: &mut S,
) -> ViewResult<PrintOutcome> {
    let printable = setup.printable();
    if printable.is_empty() {
        return Err(ViewError::Config(format!(
            "page {}x{} has no room inside a margin of {}",
            setup.width, setup.height, setup.margin
        )));
    }
    measure.set_x_units_per_inch(setup.dpi);
    measure.set_y_units_per_inch(setup.dpi);
    let outcome = print_at_resolution(root, measure, setup, cancel, sink);
    measure.set_x_units_per_inch(0);
    measure.set_y_units_per_inch(0);
    outcome
}

fn print_at_resolution<S: PageSink>(
    root: &SharedLayoutBox,
    measure: &mut dyn Graphics,
    setup: &PageSetup,
    cancel: &CancelFlag,
    sink: &mut S,
) -> ViewResult<PrintOutcome> {
    let printable = setup.printable();
    let dpi = setup.dpi as i32;
    let origin = Point::new(setup.margin, setup.margin);

    let mut root = root.try_borrow_mut().map_err(|_| ViewError::RootBoxBusy)?;
    root.layout(measure, printable.width())?;

    let coords = CoordRects::for_scroll(dpi, dpi, origin, Point::new(0, 0));
    for _ in 0..MAX_EXPANSION_PASSES {
        let everything = Rect::new(printable.left, printable.top, printable.right, origin.y + root.height());
        if root.prepare_to_draw(measure, &coords, everything)?.status == PrepareStatus::Normal {
            break;
        }
    }

    let page_height = printable.height();
    let total = root.height();
    let pages = ((total + page_height - 1) / page_height).max(1) as usize;
    log::info!(target: "print", "printing {} pages at {} dpi", pages, setup.dpi);

    for index in 0..pages {
        if cancel.is_cancelled() {
            log::info!(target: "print", "cancelled after {} pages", index);
            return Ok(PrintOutcome::Cancelled { pages_printed: index });
        }
        let mut page = sink.begin_page(index)?;
        let scroll = Point::new(0, index as i32 * page_height);
        let coords = CoordRects::for_scroll(dpi, dpi, origin, scroll);
        page.push_clip_rect(printable)?;
        let drawn = root.draw_root(&mut page, &coords, printable, false);
        page.pop_clip_rect()?;
        drawn?;
        sink.end_page(index, page)?;
        log::debug!(target: "print", "page {} done", index + 1);
    }
    Ok(PrintOutcome::Completed { pages })
}
