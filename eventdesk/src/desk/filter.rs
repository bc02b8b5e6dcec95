//! Search and event filtering of the roster.

use super::{AttendeeDeskState, DeskAction, DeskEnvironment, roster::Roster};
use crate::config::SelectionPolicy;
use crate::types::Attendee;
use eventdesk_core::{SmallVec, effect::Effect, reducer::Reducer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Event selector of the attendee view
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventFilter {
    /// Every event
    #[default]
    All,
    /// Only attendees whose event name equals this string exactly
    Named(String),
}

impl FromStr for EventFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "all" {
            Self::All
        } else {
            Self::Named(s.to_string())
        })
    }
}

impl From<&str> for EventFilter {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(filter) => filter,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Free-text query plus event selector
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttendeeFilter {
    /// Case-insensitive substring of name or email; empty matches everything
    pub search_term: String,
    /// Event selector
    pub event: EventFilter,
}

impl AttendeeFilter {
    /// Returns `true` when the attendee satisfies both predicates
    #[must_use]
    pub fn matches(&self, attendee: &Attendee) -> bool {
        let matches_event = match &self.event {
            EventFilter::All => true,
            EventFilter::Named(name) => &attendee.event_name == name,
        };
        if !matches_event {
            return false;
        }

        let needle = self.search_term.to_lowercase();
        attendee.name.to_lowercase().contains(&needle)
            || attendee.email.to_lowercase().contains(&needle)
    }

    /// The filtered view: matching records in roster order, sharing the roster's `Arc`s
    #[must_use]
    pub fn apply(&self, roster: &Roster) -> Vec<Arc<Attendee>> {
        roster
            .iter()
            .filter(|attendee| self.matches(attendee))
            .cloned()
            .collect()
    }
}

/// Handles search and event filter edits
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterReducer;

impl FilterReducer {
    fn after_filter_change(state: &mut AttendeeDeskState, policy: SelectionPolicy) {
        state.last_error = None;
        if policy == SelectionPolicy::Retain {
            return;
        }

        let filter = &state.filter;
        let roster = &state.roster;
        let before = state.selection.len();
        state.selection.retain(|id| {
            roster
                .get(id)
                .is_some_and(|attendee| filter.matches(attendee))
        });

        let pruned = before - state.selection.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned hidden attendees from selection");
        }
    }
}

impl Reducer for FilterReducer {
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
            DeskAction::SetSearchTerm(term) => {
                state.filter.search_term = term;
                Self::after_filter_change(state, env.selection_policy);
            },
            DeskAction::SetEventFilter(event) => {
                state.filter.event = event;
                Self::after_filter_change(state, env.selection_policy);
            },
            _ => {},
        }
        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn ids(view: &[Arc<Attendee>]) -> Vec<&str> {
        view.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let roster = Roster::new(seed::attendees());
        let view = AttendeeFilter::default().apply(&roster);
        assert_eq!(ids(&view), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_query_is_case_insensitive_over_name_and_email() {
        let roster = Roster::new(seed::attendees());
        let by_name = AttendeeFilter {
            search_term: "CHEN".to_string(),
            event: EventFilter::All,
        };
        assert_eq!(ids(&by_name.apply(&roster)), vec!["2"]);

        let by_email = AttendeeFilter {
            search_term: "@EMAIL.com".to_string(),
            event: EventFilter::All,
        };
        assert_eq!(by_email.apply(&roster).len(), 5);
    }

    #[test]
    fn test_event_filter_and_query_combine() {
        let roster = Roster::new(seed::attendees());
        let filter = AttendeeFilter {
            search_term: "a".to_string(),
            event: "Tech Conference 2024".into(),
        };
        // "a" also matches every "email.com" address
        assert_eq!(ids(&filter.apply(&roster)), vec!["1", "2", "5"]);

        let narrower = AttendeeFilter {
            search_term: "son".to_string(),
            event: "Tech Conference 2024".into(),
        };
        assert_eq!(ids(&narrower.apply(&roster)), vec!["1"]);
    }

    #[test]
    fn test_view_shares_roster_records() {
        let roster = Roster::new(seed::attendees());
        let view = AttendeeFilter::default().apply(&roster);
        for (from_view, from_roster) in view.iter().zip(roster.iter()) {
            assert!(Arc::ptr_eq(from_view, from_roster));
        }
    }

    #[test]
    fn test_event_filter_parsing() {
        assert_eq!(EventFilter::from("all"), EventFilter::All);
        assert_eq!(
            EventFilter::from("Networking Mixer"),
            EventFilter::Named("Networking Mixer".to_string())
        );
        assert_eq!(EventFilter::from("All").to_string(), "All");
    }
}
