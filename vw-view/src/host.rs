//! The host window capability and an in-memory implementation.

use crate::scroll::{Axis, ScrollInfo};
use std::cell::RefCell;
use std::rc::Rc;
use vw_graphics::Rect;

/// A host window shared between a root site and whoever owns the window.
pub type SharedHost = Rc<RefCell<dyn HostWindow>>;

/// What a root site needs from the window it lives in. Coordinates are paint
/// (client) device units.
pub trait HostWindow {
    fn client_rect(&self) -> Rect;

    fn set_scroll_info(&mut self, axis: Axis, info: ScrollInfo);

    /// Request a repaint of `rect`, or of the whole client area for `None`.
    fn invalidate_rect(&mut self, rect: Option<Rect>);

    /// Move the painted content by (`dx`, `dy`) and repaint the exposed strip.
    fn scroll_window(&mut self, dx: i32, dy: i32);

    fn set_capture(&mut self);
    fn release_capture(&mut self);

    /// Show a non-modal notification.
    fn show_message(&mut self, message: &str);
}

/// A window without a screen: records every request for inspection.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    client: Rect,
    vertical: Option<ScrollInfo>,
    horizontal: Option<ScrollInfo>,
    invalidations: Vec<Option<Rect>>,
    scrolls: Vec<(i32, i32)>,
    captured: bool,
    messages: Vec<String>,
}

impl HeadlessHost {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            client: Rect::new(0, 0, width, height),
            ..Self::default()
        }
    }

    /// A host ready to hand to a root site.
    pub fn shared(width: i32, height: i32) -> Rc<RefCell<HeadlessHost>> {
        Rc::new(RefCell::new(Self::new(width, height)))
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.client = Rect::new(self.client.left, self.client.top, self.client.left + width, self.client.top + height);
    }

    pub fn scroll_info(&self, axis: Axis) -> Option<ScrollInfo> {
        match axis {
            Axis::Vertical => self.vertical,
            Axis::Horizontal => self.horizontal,
        }
    }

    pub fn invalidations(&self) -> &[Option<Rect>] {
        &self.invalidations
    }

    /// Whether the whole client area was invalidated since the last clear.
    pub fn fully_invalidated(&self) -> bool {
        self.invalidations.iter().any(Option::is_none)
    }

    pub fn scrolls(&self) -> &[(i32, i32)] {
        &self.scrolls
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Forget recorded invalidations and scrolls.
    pub fn clear_requests(&mut self) {
        self.invalidations.clear();
        self.scrolls.clear();
    }
}

impl HostWindow for HeadlessHost {
    fn client_rect(&self) -> Rect {
        self.client
    }

    fn set_scroll_info(&mut self, axis: Axis, info: ScrollInfo) {
        match axis {
            Axis::Vertical => self.vertical = Some(info),
            Axis::Horizontal => self.horizontal = Some(info),
        }
    }

    fn invalidate_rect(&mut self, rect: Option<Rect>) {
        self.invalidations.push(rect);
    }

    fn scroll_window(&mut self, dx: i32, dy: i32) {
        self.scrolls.push((dx, dy));
    }

    fn set_capture(&mut self) {
        self.captured = true;
    }

    fn release_capture(&mut self) {
        self.captured = false;
    }

    fn show_message(&mut self, message: &str) {
        log::info!(target: "rootsite", "host message: {}", message);
        self.messages.push(message.to_string());
    }
}
