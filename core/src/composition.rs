//! Reducer composition utilities
//!
//! A workflow that is naturally split into several concerns (filtering, selection,
//! messaging) can be written as several small reducers over the same state and action
//! types, then joined with [`combine_reducers`].
//!
//! # Example
//!
//! ```
//! use eventdesk_core::composition::{combine_reducers, SharedReducer};
//! use eventdesk_core::{effect::Effect, reducer::Reducer, SmallVec};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Default)]
//! struct DeskState {
//!     checked_in: u32,
//!     note: String,
//! }
//!
//! #[derive(Clone)]
//! enum DeskAction {
//!     CheckIn,
//!     Note(String),
//! }
//!
//! struct CheckIns;
//! struct Notes;
//!
//! impl Reducer for CheckIns {
//!     type State = DeskState;
//!     type Action = DeskAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut DeskState,
//!         action: DeskAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<DeskAction>; 4]> {
//!         if matches!(action, DeskAction::CheckIn) {
//!             state.checked_in += 1;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! impl Reducer for Notes {
//!     type State = DeskState;
//!     type Action = DeskAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut DeskState,
//!         action: DeskAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<DeskAction>; 4]> {
//!         if let DeskAction::Note(note) = action {
//!             state.note = note;
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let parts: Vec<SharedReducer<DeskState, DeskAction, ()>> =
//!     vec![Arc::new(CheckIns), Arc::new(Notes)];
//! let combined = combine_reducers(parts);
//! let mut state = DeskState::default();
//! let _ = combined.reduce(&mut state, DeskAction::CheckIn, &());
//! let _ = combined.reduce(&mut state, DeskAction::Note("doors open".into()), &());
//! assert_eq!(state.checked_in, 1);
//! assert_eq!(state.note, "doors open");
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;
use std::sync::Arc;

/// A shareable reducer trait object, as stored inside a [`CombinedReducer`]
pub type SharedReducer<S, A, E> =
    Arc<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in order on the same state, so a later reducer observes the
/// changes made by an earlier one for the same action. All effects are collected and
/// concatenated in reducer order.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<SharedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    A: Clone,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`]. Cloning is cheap: the parts are shared.
pub struct CombinedReducer<S, A, E> {
    reducers: Vec<SharedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E> {
    /// Number of reducers joined together
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Returns `true` when no reducers were combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Clone for CombinedReducer<S, A, E> {
    fn clone(&self) -> Self {
        Self {
            reducers: self.reducers.clone(),
        }
    }
}

impl<S, A, E> std::fmt::Debug for CombinedReducer<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("reducers", &self.reducers.len())
            .finish()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    A: Clone,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects.into_iter().filter(|effect| !effect.is_none()));
        }

        all_effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smallvec;

    #[derive(Clone, Default)]
    struct TestState {
        counter: i32,
        trail: Vec<&'static str>,
    }

    #[derive(Clone)]
    enum TestAction {
        Increment,
        Reset,
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            state.trail.push("counter");
            match action {
                TestAction::Increment => state.counter += 1,
                TestAction::Reset => state.counter = 0,
            }
            smallvec![Effect::None]
        }
    }

    struct ObserverReducer;

    impl Reducer for ObserverReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            state.trail.push("observer");
            if matches!(action, TestAction::Increment) && state.counter >= 2 {
                return smallvec![Effect::Delay {
                    duration: std::time::Duration::from_millis(1),
                    action: Box::new(TestAction::Reset),
                }];
            }
            SmallVec::new()
        }
    }

    #[test]
    fn reducers_run_in_order_on_shared_state() {
        let parts: Vec<SharedReducer<TestState, TestAction, ()>> =
            vec![Arc::new(CounterReducer), Arc::new(ObserverReducer)];
        let combined = combine_reducers(parts);
        assert_eq!(combined.len(), 2);

        let mut state = TestState::default();
        let effects = combined.reduce(&mut state, TestAction::Increment, &());
        assert_eq!(state.counter, 1);
        assert_eq!(state.trail, vec!["counter", "observer"]);
        assert!(effects.is_empty());

        // The observer sees the counter already incremented by the first reducer
        let effects = combined.clone().reduce(&mut state, TestAction::Increment, &());
        assert_eq!(state.counter, 2);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Delay { .. }));
    }
}
