//! The attendee desk: roster, filtering, selection, check-in and bulk messaging.
//!
//! Every concern is its own reducer over the shared [`AttendeeDeskState`]; the
//! [`DeskReducer`] joins them with `combine_reducers` so each action passes through
//! all of them in a fixed order:
//!
//! ```text
//! DeskAction ─▶ FilterReducer ─▶ SelectionReducer ─▶ RosterReducer ─▶ BulkMessageReducer
//!                     │                  │                 │                  │
//!                     └──────────────────┴── AttendeeDeskState ───────────────┘
//! ```
//!
//! Invalid commands never panic: they record `last_error` and produce no effects.

pub mod filter;
pub mod messaging;
pub mod roster;
pub mod selection;

pub use filter::{AttendeeFilter, EventFilter, FilterReducer};
pub use messaging::{
    BulkMessageReducer, BulkMessageState, DeliveryError, DeliveryReceipt, DialogPhase,
    MessageDraft, MessageGateway, OutgoingMessage, Recipient, SMS_CHAR_LIMIT,
    SimulatedMessageGateway,
};
pub use roster::{Roster, RosterError, RosterReducer};
pub use selection::{Selection, SelectionReducer};

use crate::config::SelectionPolicy;
use crate::notify::Notifier;
use crate::types::{Attendee, AttendeeId, MessageChannel, MessageTemplate};
use eventdesk_core::composition::{CombinedReducer, SharedReducer, combine_reducers};
use eventdesk_core::environment::Clock;
use eventdesk_core::{SmallVec, effect::Effect, reducer::Reducer};
use eventdesk_runtime::Store;
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// Everything the attendee desk shows
#[derive(Clone, Debug, Default)]
pub struct AttendeeDeskState {
    /// All attendees
    pub roster: Roster,
    /// Active search and event selector
    pub filter: AttendeeFilter,
    /// Ids marked for bulk actions
    pub selection: Selection,
    /// Bulk message dialog
    pub bulk: BulkMessageState,
    /// Last rejected command
    pub last_error: Option<String>,
}

impl AttendeeDeskState {
    /// Desk showing the given roster with no filter and no selection
    #[must_use]
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            ..Self::default()
        }
    }

    /// The filtered view
    #[must_use]
    pub fn visible(&self) -> Vec<Arc<Attendee>> {
        self.filter.apply(&self.roster)
    }

    /// Derived state of the "select all" header checkbox
    #[must_use]
    pub fn all_visible_selected(&self) -> bool {
        self.selection.header_checked(&self.visible())
    }

    /// Selected attendees with their current email, in roster order
    #[must_use]
    pub fn selected_recipients(&self) -> Vec<Recipient> {
        self.roster
            .iter()
            .filter(|attendee| self.selection.contains(&attendee.id))
            .map(|attendee| Recipient {
                id: attendee.id.clone(),
                email: attendee.email.clone(),
            })
            .collect()
    }

    /// Records a rejected command; no effects follow
    pub(crate) fn reject<A>(&mut self, error: String) -> SmallVec<[Effect<A>; 4]> {
        tracing::warn!(error = %error, "Desk command rejected");
        self.last_error = Some(error);
        SmallVec::new()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs of the attendee desk
#[derive(Clone, Debug)]
pub enum DeskAction {
    // Filter
    /// Replace the free-text query
    SetSearchTerm(String),
    /// Replace the event selector
    SetEventFilter(EventFilter),

    // Selection
    /// Select every visible attendee, or clear the selection
    SelectAll {
        /// `true` selects, `false` clears
        checked: bool,
    },
    /// Select or deselect one attendee
    ToggleSelection {
        /// Attendee
        id: AttendeeId,
        /// `true` selects, `false` deselects
        checked: bool,
    },

    // Roster
    /// Append a newly registered attendee
    AddAttendee(Attendee),
    /// Mark an attendee as checked in now
    CheckIn {
        /// Attendee
        id: AttendeeId,
    },
    /// Undo a check-in
    CheckOut {
        /// Attendee
        id: AttendeeId,
    },

    // Bulk messaging
    /// Show the bulk message dialog
    OpenBulkMessage,
    /// Hide the bulk message dialog
    CloseBulkMessage,
    /// Choose email or SMS
    SetChannel(MessageChannel),
    /// Edit the subject
    SetSubject(String),
    /// Edit the body
    SetBody(String),
    /// Overwrite subject and body from a template
    ApplyTemplate(MessageTemplate),
    /// Deliver the draft to the selection
    SendBulkMessage,
    /// Delivery finished
    MessagesSent {
        /// Gateway receipt
        receipt: DeliveryReceipt,
    },
    /// Delivery failed
    DeliveryFailed {
        /// Gateway error
        error: DeliveryError,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the attendee desk
#[derive(Clone)]
pub struct DeskEnvironment {
    /// Clock for check-in timestamps
    pub clock: Arc<dyn Clock>,
    /// Bulk message delivery
    pub gateway: Arc<dyn MessageGateway>,
    /// User-facing notifications
    pub notifier: Arc<dyn Notifier>,
    /// Selection handling on filter changes
    pub selection_policy: SelectionPolicy,
}

impl DeskEnvironment {
    /// Creates an environment with the default selection policy
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn MessageGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            clock,
            gateway,
            notifier,
            selection_policy: SelectionPolicy::default(),
        }
    }

    /// Overrides the selection policy
    #[must_use]
    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selection_policy = policy;
        self
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// The attendee desk reducer: all desk concerns combined
#[derive(Clone, Debug)]
pub struct DeskReducer {
    inner: CombinedReducer<AttendeeDeskState, DeskAction, DeskEnvironment>,
}

impl DeskReducer {
    /// Creates the combined desk reducer
    #[must_use]
    pub fn new() -> Self {
        let parts: Vec<SharedReducer<AttendeeDeskState, DeskAction, DeskEnvironment>> = vec![
            Arc::new(FilterReducer),
            Arc::new(SelectionReducer),
            Arc::new(RosterReducer),
            Arc::new(BulkMessageReducer),
        ];
        Self {
            inner: combine_reducers(parts),
        }
    }
}

impl Default for DeskReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for DeskReducer {
    type State = AttendeeDeskState;
    type Action = DeskAction;
    type Environment = DeskEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(?action, "Desk action");
        self.inner.reduce(state, action, env)
    }
}

/// Store running the attendee desk
pub type DeskStore = Store<AttendeeDeskState, DeskAction, DeskEnvironment, DeskReducer>;
