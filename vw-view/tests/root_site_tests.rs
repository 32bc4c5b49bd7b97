mod common;

use common::{flush_config, measuring_graphics, FakeBox, Fixture};
use rstest::rstest;
use vw_graphics::{Point, Rect, VwGraphics, RecordingSurface};
use vw_view::{
    ActiveSelectionRegistry, Axis, DrawOutcome, FocusState, LayoutOutcome, Orientation, ScrollInfo,
    ScrollMode, Selection, SelectionState, TextPos, TextPropChanges, ViewConfig, ViewKind,
};

fn assert_clamped(info: ScrollInfo) {
    assert!(info.pos >= 0, "{:?}", info);
    assert!(info.pos <= (info.max - info.page + 1).max(0), "{:?}", info);
}

fn caret(para: usize) -> Selection {
    Selection::caret(TextPos::new(para, 0))
}

#[test]
fn test_layout_not_ready_below_min_width() {
    let fixture = Fixture::new(FakeBox::uniform(10, 20), 15, 400);
    let mut site = fixture.site(ViewKind::default(), ViewConfig::default());
    assert_eq!(site.layout().unwrap(), LayoutOutcome::NotReady);
    assert!(!site.is_ready());

    let mut target = measuring_graphics();
    assert_eq!(site.draw(&mut target, Rect::new(0, 0, 15, 400)), DrawOutcome::NotReady);
    assert!(fixture.root.borrow().layout_widths.is_empty());
    assert!(fixture.root.borrow().draws.is_empty());
}

#[test]
fn test_layout_failure_leaves_view_not_ready() {
    let mut layout_box = FakeBox::uniform(10, 20);
    layout_box.fail_layout = true;
    let fixture = Fixture::new(layout_box, 300, 400);
    let mut site = fixture.site(ViewKind::default(), ViewConfig::default());
    assert_eq!(site.layout().unwrap(), LayoutOutcome::NotReady);
    assert_eq!(site.layout_width(), None);
}

#[test]
fn test_same_width_only_revalidates_range() {
    let fixture = Fixture::new(FakeBox::uniform(10, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), ViewConfig::default());
    assert_eq!(site.layout().unwrap(), LayoutOutcome::Changed);
    assert_eq!(site.layout().unwrap(), LayoutOutcome::Unchanged);
    // Both side margins come off the client width.
    assert_eq!(fixture.root.borrow().layout_widths, vec![296]);

    fixture.host.borrow_mut().resize(200, 400);
    assert_eq!(site.layout().unwrap(), LayoutOutcome::Changed);
    assert_eq!(fixture.root.borrow().layout_widths, vec![296, 196]);
}

#[test]
fn test_scroll_range_covers_content_and_padding() {
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    // 2000 units of content plus 96/8 + 2 below it.
    let expected = ScrollInfo {
        max: 2013,
        page: 400,
        pos: 0,
    };
    assert_eq!(site.scroll_info(Axis::Vertical), expected);
    assert_eq!(fixture.host.borrow().scroll_info(Axis::Vertical), Some(expected));
    assert_eq!(fixture.host.borrow().scroll_info(Axis::Horizontal), None);
}

#[test]
fn test_plain_view_never_scrolls() {
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 300, 400);
    let mut site = fixture.site(ViewKind::Plain, flush_config());
    site.layout().unwrap();
    assert_eq!(site.scroll_by(0, 100), Point::new(0, 0));
    assert_eq!(fixture.host.borrow().scroll_info(Axis::Vertical), None);
    assert!(fixture.host.borrow().scrolls().is_empty());
}

#[test]
fn test_update_clamps_when_content_shrinks() {
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    site.scroll_to(Point::new(0, 1500));
    assert_eq!(site.scroll_position().y, 1500);

    fixture.root.borrow_mut().paras.truncate(50);
    fixture.host.borrow_mut().clear_requests();
    assert!(site.update_scroll_range());
    assert_eq!(site.scroll_position().y, 1014 - 400);
    assert!(fixture.host.borrow().fully_invalidated());
    assert_clamped(site.scroll_info(Axis::Vertical));
}

/// Content of 986 units gives a range of 0..=999 in a 400 unit view.
#[rstest]
#[case(200, 500, 800, false)]
#[case(200, 700, 600, false)]
#[case(-100, 100, 500, false)]
#[case(-300, 700, 300, true)]
fn test_adjust_scroll_range(
    #[case] size_delta: i32,
    #[case] position: i32,
    #[case] expected_pos: i32,
    #[case] expected_forced: bool,
) {
    let fixture = Fixture::new(FakeBox::uniform(1, 986), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    assert_eq!(site.scroll_info(Axis::Vertical).max, 999);
    site.scroll_to(Point::new(0, 600));
    assert_eq!(site.scroll_position().y, 600);
    fixture.host.borrow_mut().clear_requests();

    let forced = site.adjust_scroll_range(size_delta, position, Axis::Vertical);
    assert_eq!(forced, expected_forced);
    assert_eq!(site.scroll_position().y, expected_pos);
    assert_eq!(site.scroll_info(Axis::Vertical).max, 999 + size_delta);
    assert_eq!(fixture.host.borrow().fully_invalidated(), expected_forced);
    assert_eq!(
        fixture.host.borrow().scroll_info(Axis::Vertical),
        Some(site.scroll_info(Axis::Vertical))
    );
}

#[test]
fn test_position_stays_clamped_through_adjustments() {
    let fixture = Fixture::new(FakeBox::uniform(40, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    site.scroll_to(Point::new(0, 300));
    let changes = [(500, 10), (-700, 900), (-200, 0), (60, 50), (-1000, 5), (300, 20), (1, 1)];
    for (size_delta, position) in changes {
        site.adjust_scroll_range(size_delta, position, Axis::Vertical);
        assert_clamped(site.scroll_info(Axis::Vertical));
        site.update_scroll_range();
        assert_clamped(site.scroll_info(Axis::Vertical));
    }
}

#[test]
fn test_scroll_by_blits_host() {
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    assert_eq!(site.scroll_by(0, 120), Point::new(0, 120));
    assert_eq!(site.scroll_by(0, -500), Point::new(0, -120));
    assert_eq!(fixture.host.borrow().scrolls(), [(0, -120), (0, 120)]);
}

#[test]
fn test_selection_far_below_content_estimate() {
    // Content reports 1000 units but the selection sits at 1200..1220.
    let mut layout_box = FakeBox::uniform(50, 20);
    layout_box.location_override = Some(Rect::new(0, 1200, 100, 1220));
    let fixture = Fixture::new(layout_box, 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();

    let scrolled = site
        .scroll_selection_into_view(Some(&caret(60)), ScrollMode::Default)
        .unwrap();
    assert!(scrolled);
    let pos = site.scroll_position().y;
    assert_eq!(pos, 821);
    assert!(1200 - pos <= 400 - 20);
    assert!(1220 - pos >= 0);
    assert!(fixture.root.borrow().prepare_calls <= 2);
    assert_eq!(site.scroll_info(Axis::Vertical).max, 1234);
    assert!(fixture.context.reported_messages().is_empty());
}

#[test]
fn test_visible_selection_does_not_scroll() {
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    let scrolled = site
        .scroll_selection_into_view(Some(&caret(5)), ScrollMode::Default)
        .unwrap();
    assert!(!scrolled);
    assert_eq!(site.scroll_position(), Point::new(0, 0));
    assert_eq!(fixture.root.borrow().prepare_calls, 0);
}

#[test]
fn test_uses_box_selection_when_none_given() {
    let mut layout_box = FakeBox::uniform(100, 20);
    layout_box.selection = Some(caret(30));
    let fixture = Fixture::new(layout_box, 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    assert!(site.scroll_selection_into_view(None, ScrollMode::Default).unwrap());
    // Para 30 spans 600..620; its padded bottom meets the view bottom.
    assert_eq!(site.scroll_position().y, 621 - 400);
}

/// A selection taller than the view shows the edge nearest its end.
#[rstest]
#[case(TextPos::new(10, 0), TextPos::new(70, 0), 1501 - 400)]
#[case(TextPos::new(70, 0), TextPos::new(10, 0), 499)]
fn test_tall_selection_shows_end_edge(#[case] anchor: TextPos, #[case] end: TextPos, #[case] expected: i32) {
    let mut layout_box = FakeBox::uniform(100, 20);
    layout_box.location_override = Some(Rect::new(0, 500, 100, 1500));
    let fixture = Fixture::new(layout_box, 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    let selection = Selection::range(anchor, end);
    assert!(site
        .scroll_selection_into_view(Some(&selection), ScrollMode::Default)
        .unwrap());
    assert_eq!(site.scroll_position().y, expected);
}

#[rstest]
// Off-screen: top lands a quarter of the way down.
#[case(50, Some(999 - 100))]
// On screen but deep in the view.
#[case(17, Some(339 - 100))]
// Near the top already.
#[case(5, None)]
fn test_near_top_mode(#[case] para: usize, #[case] expected: Option<i32>) {
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    let scrolled = site
        .scroll_selection_into_view(Some(&caret(para)), ScrollMode::NearTop)
        .unwrap();
    assert_eq!(scrolled, expected.is_some());
    assert_eq!(site.scroll_position().y, expected.unwrap_or(0));
}

#[test]
fn test_convergence_through_lazy_expansion() {
    // Paragraphs estimated at 20 units turn out to be 40 once drawn.
    let fixture = Fixture::new(FakeBox::lazy(100, 40, 20), 300, 400);
    let config = ViewConfig {
        max_convergence_passes: 8,
        ..flush_config()
    };
    let mut site = fixture.site(ViewKind::default(), config);
    site.layout().unwrap();
    assert!(site
        .scroll_selection_into_view(Some(&caret(60)), ScrollMode::Default)
        .unwrap());

    let pos = site.scroll_position().y;
    assert_eq!(pos, 1221);
    let top = fixture.root.borrow().para_top(60);
    assert!(top - pos >= 0 && top + 40 - pos <= 400);
    assert_eq!(fixture.root.borrow().prepare_calls, 6);
    assert!(fixture.context.reported_messages().is_empty());
}

#[test]
fn test_convergence_cap_reports_and_uses_last_candidate() {
    let fixture = Fixture::new(FakeBox::lazy(100, 40, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    assert!(site
        .scroll_selection_into_view(Some(&caret(60)), ScrollMode::Default)
        .unwrap());
    assert_eq!(fixture.root.borrow().prepare_calls, 4);
    assert_eq!(site.scroll_position().y, 1201);
    let messages = fixture.context.reported_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("did not settle"));
}

#[test]
fn test_unsettling_content_always_terminates() {
    let mut layout_box = FakeBox::uniform(100, 20);
    layout_box.grow_on_prepare = 100;
    let fixture = Fixture::new(layout_box, 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    site.scroll_selection_into_view(Some(&caret(80)), ScrollMode::Default)
        .unwrap();
    assert_eq!(fixture.root.borrow().prepare_calls, 4);
    assert_clamped(site.scroll_info(Axis::Vertical));
    assert_eq!(fixture.host.borrow().messages().len(), 1);

    // The same failure is not shown twice.
    site.scroll_selection_into_view(Some(&caret(80)), ScrollMode::Default)
        .unwrap();
    assert_eq!(fixture.host.borrow().messages().len(), 1);
}

#[test]
fn test_draw_expands_visible_lazy_content() {
    let fixture = Fixture::new(FakeBox::lazy(50, 40, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    assert_eq!(site.scroll_info(Axis::Vertical).max, 1013);

    let mut target = measuring_graphics();
    assert_eq!(site.draw(&mut target, Rect::new(0, 0, 300, 400)), DrawOutcome::Drawn);
    // Ten paragraphs fill the view once expanded.
    assert_eq!(site.scroll_info(Axis::Vertical).max, 1213);
    assert_eq!(fixture.root.borrow().prepare_calls, 2);
    assert_eq!(fixture.root.borrow().draws, vec![(Rect::new(0, 0, 300, 400), false)]);
    assert_eq!(target.clip_depth(), 0);
}

#[test]
fn test_draw_still_paints_when_content_never_settles() {
    let mut layout_box = FakeBox::uniform(10, 20);
    layout_box.grow_on_prepare = 5;
    let fixture = Fixture::new(layout_box, 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();

    let mut target = measuring_graphics();
    let paint = Rect::new(0, 0, 300, 400);
    assert_eq!(site.draw(&mut target, paint), DrawOutcome::Drawn);
    assert_eq!(fixture.root.borrow().prepare_calls, 4);
    assert_eq!(fixture.root.borrow().draws.len(), 1);
    let messages = fixture.context.reported_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("did not settle after 4 prepare passes"));
}

#[rstest]
#[case::actual_size(1.0, 96, 20)]
#[case::doubled(2.0, 192, 40)]
#[case::halved(0.5, 48, 10)]
fn test_zoom_scales_target_resolution(#[case] zoom: f32, #[case] dpi: u32, #[case] line: i32) {
    let fixture = Fixture::new(FakeBox::uniform(10, 20), 300, 400);
    let config = ViewConfig {
        zoom,
        ..flush_config()
    };
    let mut site = fixture.site(ViewKind::default(), config);
    site.layout().unwrap();
    assert_eq!(fixture.root.borrow().layout_widths, vec![(300.0 / zoom) as i32]);

    let mut target = measuring_graphics();
    assert_eq!(site.draw(&mut target, Rect::new(0, 0, 300, 400)), DrawOutcome::Drawn);
    assert_eq!(fixture.root.borrow().draw_scales, vec![(dpi, line)]);
    assert_eq!(target.y_units_per_inch().unwrap(), 96);
}

#[test]
fn test_draw_outside_client_is_a_no_op() {
    let fixture = Fixture::new(FakeBox::uniform(10, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    let mut target = measuring_graphics();
    assert_eq!(site.draw(&mut target, Rect::new(400, 0, 500, 100)), DrawOutcome::Drawn);
    assert!(fixture.root.borrow().draws.is_empty());
}

#[test]
fn test_draw_failure_reported_once() {
    let fixture = Fixture::new(FakeBox::uniform(10, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    let mut unbound: VwGraphics<RecordingSurface> = VwGraphics::new();
    let paint = Rect::new(0, 0, 300, 400);
    assert_eq!(site.draw(&mut unbound, paint), DrawOutcome::Abandoned);
    assert_eq!(site.draw(&mut unbound, paint), DrawOutcome::Abandoned);
    assert_eq!(fixture.host.borrow().messages().len(), 1);
    assert!(fixture.root.borrow().draws.is_empty());
}

#[test]
fn test_click_selects_under_point() {
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    assert_eq!(site.click(Point::new(5, 45)).unwrap(), Some(caret(2)));
    assert!(!fixture.host.borrow().is_captured());

    site.scroll_to(Point::new(0, 100));
    assert_eq!(site.click(Point::new(5, 45)).unwrap(), Some(caret(7)));
    assert_eq!(fixture.root.borrow().selection, Some(caret(7)));
}

#[test]
fn test_mouse_capture_spans_down_and_up() {
    let fixture = Fixture::new(FakeBox::uniform(10, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    site.mouse_down(Point::new(5, 5)).unwrap();
    assert!(fixture.host.borrow().is_captured());
    site.mouse_up();
    assert!(!fixture.host.borrow().is_captured());
}

#[test]
fn test_vertical_view_maps_frame_onto_host() {
    let kind = ViewKind::Scrolling {
        horizontal_scroll: false,
        orientation: Orientation::Vertical,
    };
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 400, 300);
    let mut site = fixture.site(kind, flush_config());
    site.layout().unwrap();
    // Lines run down the 300 unit client height.
    assert_eq!(fixture.root.borrow().layout_widths, vec![300]);
    let info = fixture.host.borrow().scroll_info(Axis::Horizontal).unwrap();
    assert_eq!((info.max, info.page), (2013, 400));
    assert_eq!(fixture.host.borrow().scroll_info(Axis::Vertical), None);

    site.scroll_by(0, 50);
    assert_eq!(fixture.host.borrow().scrolls(), [(50, 0)]);
    assert_eq!(site.client_to_layout(Point::new(390, 10)).unwrap(), Point::new(10, 60));
    assert_eq!(site.layout_to_client(Point::new(10, 60)).unwrap(), Point::new(390, 10));
}

#[test]
fn test_invalidate_layout_rect_maps_to_paint() {
    let fixture = Fixture::new(FakeBox::uniform(100, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    site.scroll_to(Point::new(0, 100));
    fixture.host.borrow_mut().clear_requests();

    site.invalidate_layout_rect(Rect::new(0, 150, 50, 170));
    // Entirely above the view: nothing requested.
    site.invalidate_layout_rect(Rect::new(0, 0, 50, 20));
    assert_eq!(fixture.host.borrow().invalidations(), [Some(Rect::new(0, 50, 50, 70))]);
}

#[test]
fn test_focus_transitions() {
    let mut layout_box = FakeBox::uniform(10, 20);
    layout_box.selection = Some(caret(1));
    let fixture = Fixture::new(layout_box, 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    let mut registry = ActiveSelectionRegistry::new();

    assert_eq!(site.gain_focus(&mut registry), None);
    assert_eq!(site.focus_state(), FocusState::FocusedActiveSelection);
    assert!(site.is_current() && site.draws_selection());
    assert_eq!(registry.current(), Some(site.id()));

    // A caret disappears with focus.
    site.lose_focus();
    assert_eq!(site.focus_state(), FocusState::Inactive);
    assert!(!site.draws_selection());

    // A range stays drawn, out of focus.
    fixture.root.borrow_mut().selection = Some(Selection::range(TextPos::new(1, 0), TextPos::new(3, 2)));
    site.gain_focus(&mut registry);
    site.lose_focus();
    assert!(site.draws_selection());
    assert_eq!(
        fixture.root.borrow().states,
        vec![
            SelectionState::Enabled,
            SelectionState::Disabled,
            SelectionState::Enabled,
            SelectionState::OutOfFocus,
        ]
    );
}

#[test]
fn test_ok_to_convert_to_lazy_needs_a_full_view_of_distance() {
    let fixture = Fixture::new(FakeBox::uniform(200, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    assert!(site.ok_to_convert_to_lazy(900, 1000));
    assert!(!site.ok_to_convert_to_lazy(500, 700));
    site.scroll_to(Point::new(0, 1200));
    assert!(site.ok_to_convert_to_lazy(0, 100));
    assert!(!site.ok_to_convert_to_lazy(700, 900));
}

#[test]
fn test_release_offscreen_content_keeps_view_anchored() {
    let fixture = Fixture::new(FakeBox::lazy(100, 40, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    let mut target = measuring_graphics();
    site.draw(&mut target, Rect::new(0, 0, 300, 400));
    assert_eq!(site.scroll_info(Axis::Vertical).max, 2213);

    site.scroll_to(Point::new(0, 1500));
    assert_eq!(site.release_offscreen_content().unwrap(), 10);
    assert_eq!(site.scroll_position().y, 1300);
    assert_eq!(site.scroll_info(Axis::Vertical).max, 2013);
}

#[test]
fn test_apply_selection_properties_relayouts() {
    let fixture = Fixture::new(FakeBox::uniform(10, 20), 300, 400);
    let mut site = fixture.site(ViewKind::default(), flush_config());
    site.layout().unwrap();
    let changes = TextPropChanges {
        bold: Some(true),
        ..TextPropChanges::default()
    };
    assert_eq!(site.apply_selection_properties(&changes).unwrap(), LayoutOutcome::Changed);
    assert_eq!(fixture.root.borrow().property_changes, vec![changes]);
    assert_eq!(fixture.root.borrow().layout_widths.len(), 2);
}
