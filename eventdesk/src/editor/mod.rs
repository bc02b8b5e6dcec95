//! The event/ticket editor: form state for one event draft.
//!
//! Field edits are plain setters; required fields are only checked on `Submit`,
//! which saves through the [`EventRepository`] after the configured delay.

pub mod reducer;
pub mod tickets;

pub use reducer::EditorReducer;

use crate::catalog::{EventRepository, SaveError};
use crate::notify::Notifier;
use crate::settings::EventDefaults;
use crate::types::{EventDraft, EventId, EventRecord, TicketTypeId, TicketTypePatch};
use chrono::{NaiveDate, NaiveTime};
use eventdesk_core::environment::IdGenerator;
use eventdesk_runtime::Store;
use std::sync::Arc;
use std::time::Duration;

/// Editor phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditorPhase {
    /// Accepting edits
    #[default]
    Editing,
    /// Waiting for the repository
    Saving,
    /// Last submit succeeded; further edits go back to `Editing`
    Saved,
}

/// Editor state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventEditorState {
    /// Catalog id once the event has been saved
    pub event_id: Option<EventId>,
    /// Form contents
    pub draft: EventDraft,
    /// Phase
    pub phase: EditorPhase,
    /// Last rejected command or failed save
    pub last_error: Option<String>,
}

impl EventEditorState {
    /// Blank draft with the starter ticket type
    #[must_use]
    pub fn new_draft() -> Self {
        Self {
            event_id: None,
            draft: EventDraft {
                ticket_types: tickets::starter_tickets(),
                ..EventDraft::default()
            },
            phase: EditorPhase::Editing,
            last_error: None,
        }
    }

    /// Blank draft following the organizer's event defaults
    #[must_use]
    pub fn from_defaults(defaults: &EventDefaults) -> Self {
        let mut state = Self::new_draft();
        state.draft.published = defaults.auto_publish;
        state
    }

    /// Editor seeded from a saved event
    #[must_use]
    pub fn from_record(record: EventRecord) -> Self {
        Self {
            event_id: Some(record.id),
            draft: record.draft,
            phase: EditorPhase::Editing,
            last_error: None,
        }
    }

    /// Returns `true` until the draft has been saved once
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.event_id.is_none()
    }
}

impl Default for EventEditorState {
    fn default() -> Self {
        Self::new_draft()
    }
}

/// Inputs of the editor
#[derive(Clone, Debug)]
pub enum EditorAction {
    // Fields
    /// Edit the name
    SetName(String),
    /// Edit the description
    SetDescription(String),
    /// Edit the date
    SetDate(Option<NaiveDate>),
    /// Edit the start time
    SetTime(Option<NaiveTime>),
    /// Edit the venue
    SetLocation(String),
    /// Replace the banner reference
    SetBanner(Option<String>),
    /// Publish or unpublish
    SetPublished(bool),

    // Ticket types
    /// Append a free ticket type
    AddTicketType,
    /// Merge a partial update into a ticket type
    UpdateTicketType {
        /// Ticket type
        id: TicketTypeId,
        /// Fields to change
        patch: TicketTypePatch,
    },
    /// Remove a ticket type
    RemoveTicketType {
        /// Ticket type
        id: TicketTypeId,
    },

    // Tags
    /// Add a tag (trimmed; blank and duplicate tags are ignored)
    AddTag(String),
    /// Remove the exact tag
    RemoveTag(String),

    // Lifecycle
    /// Replace the form with a saved event
    LoadEvent(EventRecord),
    /// Validate and save
    Submit,
    /// Write the validated record once the save latency has elapsed
    Persist {
        /// Record to store
        record: EventRecord,
        /// `true` for a first save
        created: bool,
    },
    /// Save finished
    Saved {
        /// Stored record
        record: EventRecord,
        /// `true` for a first save
        created: bool,
    },
    /// Save failed
    SaveFailed {
        /// Repository error
        error: SaveError,
    },
}

/// Environment dependencies for the editor
#[derive(Clone)]
pub struct EditorEnvironment {
    /// Ids for new events and ticket types
    pub ids: Arc<dyn IdGenerator>,
    /// Catalog storage
    pub repository: Arc<dyn EventRepository>,
    /// User-facing notifications
    pub notifier: Arc<dyn Notifier>,
    /// Simulated save latency
    pub save_delay: Duration,
}

/// Store running one editor
pub type EditorStore = Store<EventEditorState, EditorAction, EditorEnvironment, EditorReducer>;
