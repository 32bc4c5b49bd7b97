//! Application-lifetime state shared by every root site.

use crate::host::HostWindow;
use crate::registry::PaneId;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Remembers recently reported messages so each is shown only once.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    history: VecDeque<String>,
    capacity: usize,
}

impl ErrorReporter {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record `message`; returns true when it should be shown (not seen recently).
    pub fn report(&mut self, message: &str) -> bool {
        if self.history.iter().any(|m| m == message) {
            return false;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(message.to_string());
        true
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }
}

/// The shared "cancel requested" flag polled by long operations.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Error deduplication, cancellation and pane identity for one application.
#[derive(Debug)]
pub struct RenderingContext {
    reporter: RefCell<ErrorReporter>,
    cancel: CancelFlag,
    next_pane: Cell<u32>,
}

impl RenderingContext {
    pub fn new(error_history: usize) -> Rc<Self> {
        Rc::new(Self {
            reporter: RefCell::new(ErrorReporter::new(error_history)),
            cancel: CancelFlag::new(),
            next_pane: Cell::new(1),
        })
    }

    pub fn allocate_pane_id(&self) -> PaneId {
        let id = self.next_pane.get();
        self.next_pane.set(id + 1);
        PaneId(id)
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Log `message` and show it through `host` unless it was shown recently.
    pub fn report_error(&self, host: &mut dyn HostWindow, message: &str) {
        log::error!(target: "rootsite", "{}", message);
        if self.reporter.borrow_mut().report(message) {
            host.show_message(message);
        }
    }

    pub fn reported_messages(&self) -> Vec<String> {
        self.reporter.borrow().history().map(str::to_string).collect()
    }
}
