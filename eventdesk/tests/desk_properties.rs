//! Property tests for the attendee desk: filtering, check-in and select-all laws

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use eventdesk::desk::{
    AttendeeDeskState, AttendeeFilter, DeskAction, DeskEnvironment, DeskReducer, EventFilter,
    Roster, SimulatedMessageGateway,
};
use eventdesk::{AttendeeId, CheckIn, RecordingNotifier, SelectionPolicy, seed};
use eventdesk_core::reducer::Reducer;
use eventdesk_testing::test_clock;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn env(policy: SelectionPolicy) -> DeskEnvironment {
    DeskEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SimulatedMessageGateway::new(Duration::ZERO)),
        Arc::new(RecordingNotifier::new()),
    )
    .with_selection_policy(policy)
}

fn seeded() -> AttendeeDeskState {
    AttendeeDeskState::new(Roster::new(seed::attendees()))
}

fn ids(view: &[Arc<eventdesk::Attendee>]) -> Vec<AttendeeId> {
    view.iter().map(|a| a.id.clone()).collect()
}

fn event_filter() -> impl Strategy<Value = EventFilter> {
    prop_oneof![
        Just(EventFilter::All),
        Just(EventFilter::from("Tech Conference 2024")),
        Just(EventFilter::from("Product Launch Event")),
        Just(EventFilter::from("Networking Mixer")),
        Just(EventFilter::from("No Such Event")),
    ]
}

fn search_term() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z. @]{0,5}",
        Just("sarah".to_string()),
        Just("EMAIL.COM".to_string()),
        Just("chen".to_string()),
    ]
}

fn policy() -> impl Strategy<Value = SelectionPolicy> {
    prop_oneof![
        Just(SelectionPolicy::PruneOnFilterChange),
        Just(SelectionPolicy::Retain),
    ]
}

proptest! {
    #[test]
    fn filtering_is_idempotent(term in search_term(), event in event_filter()) {
        let filter = AttendeeFilter { search_term: term, event };
        let once = filter.apply(&Roster::new(seed::attendees()));
        let twice = filter.apply(&Roster::new(once.iter().map(|a| (**a).clone())));
        prop_assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn filtered_view_keeps_roster_order(term in search_term(), event in event_filter()) {
        let roster = Roster::new(seed::attendees());
        let view = AttendeeFilter { search_term: term, event }.apply(&roster);
        let positions: Vec<usize> = view
            .iter()
            .map(|a| roster.iter().position(|r| r.id == a.id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn check_in_then_out_restores_not_checked_in(index in 0usize..5) {
        let reducer = DeskReducer::new();
        let env = env(SelectionPolicy::default());
        let mut state = seeded();
        let id = AttendeeId::new((index + 1).to_string());

        let _ = reducer.reduce(&mut state, DeskAction::CheckIn { id: id.clone() }, &env);
        let checked = state.roster.get(&id).unwrap();
        prop_assert!(checked.check_in.is_checked_in());
        prop_assert!(checked.check_in.time().is_some());

        let _ = reducer.reduce(&mut state, DeskAction::CheckOut { id: id.clone() }, &env);
        let out = state.roster.get(&id).unwrap();
        prop_assert_eq!(out.check_in, CheckIn::NotCheckedIn);
        prop_assert!(out.check_in.time().is_none());
        prop_assert_eq!(state.roster.len(), 5);
    }

    #[test]
    fn select_all_is_bounded_by_the_view(
        term in search_term(),
        event in event_filter(),
        policy in policy(),
    ) {
        let reducer = DeskReducer::new();
        let env = env(policy);
        let mut state = seeded();

        let _ = reducer.reduce(&mut state, DeskAction::SetSearchTerm(term), &env);
        let _ = reducer.reduce(&mut state, DeskAction::SetEventFilter(event), &env);
        let _ = reducer.reduce(&mut state, DeskAction::SelectAll { checked: true }, &env);

        let visible = state.visible();
        prop_assert_eq!(state.selection.len(), visible.len());
        prop_assert!(visible.iter().all(|a| state.selection.contains(&a.id)));
        prop_assert_eq!(state.all_visible_selected(), !visible.is_empty());

        let _ = reducer.reduce(&mut state, DeskAction::SelectAll { checked: false }, &env);
        prop_assert!(state.selection.is_empty());
        prop_assert!(!state.all_visible_selected());
    }
}
