//! The attendee roster and the check-in state machine.

use super::{AttendeeDeskState, DeskAction, DeskEnvironment};
use crate::notify::{Notification, notify_effect};
use crate::types::{Attendee, AttendeeId, CheckIn};
use eventdesk_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::sync::Arc;
use thiserror::Error;

/// Roster update failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// No attendee with this id
    #[error("Attendee {0} not found")]
    UnknownAttendee(AttendeeId),
    /// An attendee with this id already exists
    #[error("Attendee {0} is already registered")]
    DuplicateAttendee(AttendeeId),
}

/// Ordered list of attendee records
///
/// Records are shared: an update swaps in a new `Arc` for exactly one attendee and
/// leaves every other element pointer-equal to before.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    attendees: Vec<Arc<Attendee>>,
}

impl Roster {
    /// Builds a roster in the given order
    pub fn new(attendees: impl IntoIterator<Item = Attendee>) -> Self {
        Self {
            attendees: attendees.into_iter().map(Arc::new).collect(),
        }
    }

    /// Number of attendees
    #[must_use]
    pub fn len(&self) -> usize {
        self.attendees.len()
    }

    /// Returns `true` for an empty roster
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }

    /// Attendees in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Attendee>> {
        self.attendees.iter()
    }

    /// Looks up one attendee
    #[must_use]
    pub fn get(&self, id: &AttendeeId) -> Option<&Arc<Attendee>> {
        self.attendees.iter().find(|a| &a.id == id)
    }

    /// Distinct event names, in order of first appearance
    #[must_use]
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for attendee in &self.attendees {
            if !names.contains(&attendee.event_name.as_str()) {
                names.push(&attendee.event_name);
            }
        }
        names
    }

    /// Appends an attendee
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::DuplicateAttendee`] when the id is taken.
    pub fn push(&mut self, attendee: Attendee) -> Result<(), RosterError> {
        if self.get(&attendee.id).is_some() {
            return Err(RosterError::DuplicateAttendee(attendee.id));
        }
        self.attendees.push(Arc::new(attendee));
        Ok(())
    }

    /// Replaces one attendee with an updated copy
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownAttendee`] when no attendee has this id.
    pub fn update<F>(&mut self, id: &AttendeeId, f: F) -> Result<&Arc<Attendee>, RosterError>
    where
        F: FnOnce(&mut Attendee),
    {
        let slot = self
            .attendees
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| RosterError::UnknownAttendee(id.clone()))?;

        let mut updated = Attendee::clone(slot);
        f(&mut updated);
        *slot = Arc::new(updated);
        Ok(slot)
    }
}

/// Handles roster membership and check-in transitions
#[derive(Clone, Copy, Debug, Default)]
pub struct RosterReducer;

impl RosterReducer {
    fn transition(
        state: &mut AttendeeDeskState,
        id: &AttendeeId,
        check_in: CheckIn,
        env: &DeskEnvironment,
        notification: Notification,
    ) -> SmallVec<[Effect<DeskAction>; 4]> {
        match state.roster.update(id, |attendee| attendee.check_in = check_in) {
            Ok(attendee) => {
                tracing::info!(
                    attendee_id = %attendee.id,
                    checked_in = attendee.check_in.is_checked_in(),
                    "Check-in status changed"
                );
                state.last_error = None;
                smallvec![notify_effect(&env.notifier, notification)]
            },
            Err(error) => state.reject(error.to_string()),
        }
    }
}

impl Reducer for RosterReducer {
    type State = AttendeeDeskState;
    type Action = DeskAction;
    type Environment = DeskEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            DeskAction::AddAttendee(attendee) => {
                let id = attendee.id.clone();
                match state.roster.push(attendee) {
                    Ok(()) => {
                        tracing::debug!(attendee_id = %id, "Attendee added to roster");
                        state.last_error = None;
                        SmallVec::new()
                    },
                    Err(error) => state.reject(error.to_string()),
                }
            },
            DeskAction::CheckIn { id } => Self::transition(
                state,
                &id,
                CheckIn::CheckedIn {
                    at: env.clock.now(),
                },
                env,
                Notification::success("Check-in successful", "Attendee has been checked in."),
            ),
            DeskAction::CheckOut { id } => Self::transition(
                state,
                &id,
                CheckIn::NotCheckedIn,
                env,
                Notification::success("Check-out successful", "Attendee has been checked out."),
            ),
            _ => SmallVec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_update_replaces_only_one_record() {
        let mut roster = Roster::new(seed::attendees());
        let before: Vec<Arc<Attendee>> = roster.iter().cloned().collect();

        roster
            .update(&AttendeeId::new("2"), |a| a.name = "Michael Chen".to_string())
            .unwrap();

        for (old, new) in before.iter().zip(roster.iter()) {
            if old.id.as_str() == "2" {
                assert!(!Arc::ptr_eq(old, new));
                assert_eq!(new.name, "Michael Chen");
            } else {
                assert!(Arc::ptr_eq(old, new));
            }
        }
    }

    #[test]
    fn test_unknown_and_duplicate_ids() {
        let mut roster = Roster::new(seed::attendees());
        let err = roster.update(&AttendeeId::new("99"), |_| {}).unwrap_err();
        assert_eq!(err, RosterError::UnknownAttendee(AttendeeId::new("99")));

        let duplicate = seed::attendees().remove(0);
        assert!(matches!(
            roster.push(duplicate),
            Err(RosterError::DuplicateAttendee(_))
        ));
        assert_eq!(roster.len(), 5);
    }

    #[test]
    fn test_event_names_in_first_seen_order() {
        let roster = Roster::new(seed::attendees());
        assert_eq!(
            roster.event_names(),
            vec![
                "Tech Conference 2024",
                "Product Launch Event",
                "Networking Mixer"
            ]
        );
    }
}
