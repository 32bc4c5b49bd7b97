//! Which pane's selection is the active one.

use std::fmt;

/// Identity of one root site, unique within a [`RenderingContext`](crate::RenderingContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(pub u32);

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane#{}", self.0)
    }
}

/// Owned by the top-level window; refers to the current pane by id only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSelectionRegistry {
    current: Option<PaneId>,
}

impl ActiveSelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<PaneId> {
        self.current
    }

    pub fn is_current(&self, pane: PaneId) -> bool {
        self.current == Some(pane)
    }

    /// Make `pane` current and return the pane it displaced, if any.
    pub fn set_current(&mut self, pane: PaneId) -> Option<PaneId> {
        self.current.replace(pane).filter(|&previous| previous != pane)
    }

    /// Clear the registration if `pane` holds it (e.g. the pane is closing).
    pub fn clear_if_current(&mut self, pane: PaneId) {
        if self.current == Some(pane) {
            self.current = None;
        }
    }
}
