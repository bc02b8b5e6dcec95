//! Multi-select of attendees for bulk actions.

use super::{AttendeeDeskState, DeskAction, DeskEnvironment};
use crate::types::{Attendee, AttendeeId};
use eventdesk_core::{SmallVec, effect::Effect, reducer::Reducer};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Ids currently marked for a bulk action
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<AttendeeId>);

impl Selection {
    /// Number of selected ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Membership test
    #[must_use]
    pub fn contains(&self, id: &AttendeeId) -> bool {
        self.0.contains(id)
    }

    /// Selected ids in id order
    pub fn iter(&self) -> impl Iterator<Item = &AttendeeId> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, id: AttendeeId) {
        self.0.insert(id);
    }

    pub(crate) fn remove(&mut self, id: &AttendeeId) {
        self.0.remove(id);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn retain<F: FnMut(&AttendeeId) -> bool>(&mut self, f: F) {
        self.0.retain(f);
    }

    pub(crate) fn replace_with(&mut self, view: &[Arc<Attendee>]) {
        self.0 = view.iter().map(|a| a.id.clone()).collect();
    }

    /// Derived state of the "select all" checkbox for a filtered view
    ///
    /// Checked iff the view is non-empty and the selection has as many ids as the
    /// view. Under [`SelectionPolicy::Retain`](crate::SelectionPolicy::Retain) hidden
    /// ids count towards the size.
    #[must_use]
    pub fn header_checked(&self, view: &[Arc<Attendee>]) -> bool {
        !view.is_empty() && self.0.len() == view.len()
    }
}

/// Handles select-all and per-row toggles
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionReducer;

impl Reducer for SelectionReducer {
    type State = AttendeeDeskState;
    type Action = DeskAction;
    type Environment = DeskEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            DeskAction::SelectAll { checked: true } => {
                let view = state.visible();
                state.selection.replace_with(&view);
                state.last_error = None;
            },
            DeskAction::SelectAll { checked: false } => {
                state.selection.clear();
                state.last_error = None;
            },
            DeskAction::ToggleSelection { id, checked: true } => {
                let visible = state
                    .roster
                    .get(&id)
                    .is_some_and(|attendee| state.filter.matches(attendee));
                if !visible {
                    return state.reject(format!("Attendee {id} is not in the current view"));
                }
                state.selection.insert(id);
                state.last_error = None;
            },
            DeskAction::ToggleSelection { id, checked: false } => {
                state.selection.remove(&id);
                state.last_error = None;
            },
            _ => {},
        }
        SmallVec::new()
    }
}
