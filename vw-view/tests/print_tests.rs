mod common;

use common::{measuring_graphics, FakeBox};
use std::cell::RefCell;
use std::rc::Rc;
use vw_graphics::{DrawCommand, Rect, RecordingSurface, VwGraphics};
use vw_view::{
    print_pages, CancelFlag, PageSetup, PageSink, PrintOutcome, SharedLayoutBox, ViewError,
    ViewResult,
};

#[derive(Default)]
struct CollectingSink {
    pages: Vec<Vec<DrawCommand>>,
    /// Cancel once this many pages are finished.
    cancel_after: Option<(usize, CancelFlag)>,
}

impl PageSink for CollectingSink {
    type Page = VwGraphics<RecordingSurface>;

    fn begin_page(&mut self, _index: usize) -> ViewResult<Self::Page> {
        Ok(VwGraphics::with_surface(RecordingSurface::new(96)))
    }

    fn end_page(&mut self, index: usize, mut page: Self::Page) -> ViewResult<()> {
        let mut surface = page
            .release_device()
            .ok_or_else(|| ViewError::Layout("page device already released".to_string()))?;
        self.pages.push(surface.take_commands());
        if let Some((after, flag)) = &self.cancel_after {
            if index + 1 == *after {
                flag.cancel();
            }
        }
        Ok(())
    }
}

fn setup() -> PageSetup {
    PageSetup {
        width: 400,
        height: 500,
        margin: 50,
        dpi: 96,
    }
}

fn shared(layout_box: FakeBox) -> (Rc<RefCell<FakeBox>>, SharedLayoutBox) {
    let concrete = Rc::new(RefCell::new(layout_box));
    let shared: SharedLayoutBox = concrete.clone();
    (concrete, shared)
}

#[test]
fn test_prints_every_page_without_selection() {
    let (layout_box, root) = shared(FakeBox::uniform(50, 20));
    let mut sink = CollectingSink::default();
    let outcome = print_pages(&root, &mut measuring_graphics(), &setup(), &CancelFlag::new(), &mut sink).unwrap();

    assert_eq!(outcome, PrintOutcome::Completed { pages: 3 });
    assert_eq!(sink.pages.len(), 3);
    let layout_box = layout_box.borrow();
    assert_eq!(layout_box.layout_widths, vec![300]);
    let printable = Rect::new(50, 50, 350, 450);
    assert_eq!(layout_box.draws, vec![(printable, false); 3]);
    // Each page draws under the printable clip and releases it.
    for page in &sink.pages {
        assert!(page.iter().any(|c| matches!(c, DrawCommand::SetClip { .. })));
        assert!(matches!(page.last(), Some(DrawCommand::RestoreState { .. })));
    }
}

#[test]
fn test_lazy_content_is_expanded_before_paging() {
    let (layout_box, root) = shared(FakeBox::lazy(50, 40, 20));
    let mut sink = CollectingSink::default();
    let outcome = print_pages(&root, &mut measuring_graphics(), &setup(), &CancelFlag::new(), &mut sink).unwrap();
    assert_eq!(outcome, PrintOutcome::Completed { pages: 5 });
    assert!(layout_box.borrow().paras.iter().all(|p| !p.lazy));
}

#[test]
fn test_cancel_stops_after_current_page() {
    let (_, root) = shared(FakeBox::uniform(100, 20));
    let cancel = CancelFlag::new();
    let mut sink = CollectingSink {
        cancel_after: Some((2, cancel.clone())),
        ..CollectingSink::default()
    };
    let outcome = print_pages(&root, &mut measuring_graphics(), &setup(), &cancel, &mut sink).unwrap();
    assert_eq!(outcome, PrintOutcome::Cancelled { pages_printed: 2 });
    assert_eq!(sink.pages.len(), 2);
}

#[test]
fn test_margins_leaving_no_room_are_rejected() {
    let (_, root) = shared(FakeBox::uniform(10, 20));
    let setup = PageSetup {
        margin: 250,
        ..setup()
    };
    let result = print_pages(&root, &mut measuring_graphics(), &setup, &CancelFlag::new(), &mut CollectingSink::default());
    assert!(matches!(result, Err(ViewError::Config(_))));
}

#[test]
fn test_measure_resolution_restored_after_job() {
    let setup = PageSetup {
        dpi: 300,
        ..setup()
    };
    let mut measure = measuring_graphics();

    let (_, root) = shared(FakeBox::uniform(10, 20));
    print_pages(&root, &mut measure, &setup, &CancelFlag::new(), &mut CollectingSink::default()).unwrap();
    assert_eq!(measure.x_units_per_inch().unwrap(), 96);
    assert_eq!(measure.y_units_per_inch().unwrap(), 96);

    let mut failing = FakeBox::uniform(10, 20);
    failing.fail_layout = true;
    let (_, root) = shared(failing);
    let result = print_pages(&root, &mut measure, &setup, &CancelFlag::new(), &mut CollectingSink::default());
    assert!(result.is_err());
    assert_eq!(measure.y_units_per_inch().unwrap(), 96);
}
