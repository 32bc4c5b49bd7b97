//! Input focus and selection activation.

use super::RootSite;
use crate::registry::{ActiveSelectionRegistry, PaneId};
use crate::selection::SelectionState;

/// Focus state of a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Inactive,
    /// Has input focus while its sibling pane shows the selection.
    FocusedInactiveSelection,
    FocusedActiveSelection,
}

impl RootSite {
    pub fn focus_state(&self) -> FocusState {
        self.focus
    }

    /// Whether this pane is the one whose selection is active.
    pub fn is_current(&self) -> bool {
        self.current
    }

    /// Whether drawing paints the selection highlight.
    pub fn draws_selection(&self) -> bool {
        self.draws_selection
    }

    fn activate(&self, state: SelectionState) {
        match self.root.try_borrow_mut() {
            Ok(mut root) => root.activate(state),
            Err(_) => log::warn!(target: "rootsite", "{} could not set selection {:?}: box busy", self.id, state),
        }
    }

    /// Take input focus and make this pane's selection the active one.
    /// Returns the pane that was current before, if another.
    pub fn gain_focus(&mut self, registry: &mut ActiveSelectionRegistry) -> Option<PaneId> {
        let displaced = registry.set_current(self.id);
        self.focus = FocusState::FocusedActiveSelection;
        self.current = true;
        self.draws_selection = true;
        self.activate(SelectionState::Enabled);
        self.invalidate_all();
        log::debug!(target: "rootsite", "{} gained focus", self.id);
        displaced
    }

    /// Give up input focus. A range selection stays drawn out of focus; a
    /// caret is hidden.
    pub fn lose_focus(&mut self) {
        self.focus = FocusState::Inactive;
        if !self.current {
            return;
        }
        let is_range = self
            .root
            .try_borrow()
            .ok()
            .and_then(|root| root.selection())
            .is_some_and(|selection| selection.is_range());
        if is_range {
            self.activate(SelectionState::OutOfFocus);
        } else {
            self.draws_selection = false;
            self.activate(SelectionState::Disabled);
        }
        self.invalidate_all();
        log::debug!(target: "rootsite", "{} lost focus", self.id);
    }

    /// Another pane over the same content became current.
    pub(crate) fn make_non_current(&mut self, registry: &mut ActiveSelectionRegistry) {
        self.current = false;
        self.draws_selection = false;
        if self.focus == FocusState::FocusedActiveSelection {
            self.focus = FocusState::FocusedInactiveSelection;
        }
        registry.clear_if_current(self.id);
        self.invalidate_all();
    }

    /// Become the pane showing the selection without taking input focus.
    pub(crate) fn make_current(&mut self, registry: &mut ActiveSelectionRegistry) {
        registry.set_current(self.id);
        self.current = true;
        self.draws_selection = true;
        if self.focus == FocusState::FocusedInactiveSelection {
            self.focus = FocusState::FocusedActiveSelection;
        }
        self.activate(SelectionState::Enabled);
        self.invalidate_all();
    }
}
