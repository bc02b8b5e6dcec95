//! EventDesk - event management engine built on reducers and effects
//!
//! Organizers edit events and run the attendee desk; the public browses the catalog
//! and registers. Every workflow is a reducer driven by a
//! [`Store`](eventdesk_runtime::Store), and every slow operation is a simulated
//! gateway call that answers after a configurable delay.
//!
//! # Architecture
//!
//! ```text
//!  ┌────────────┐   ┌──────────────┐   ┌──────────────┐   ┌────────────┐
//!  │   Login    │   │ Registration │   │ Event editor │   │ Attendee   │
//!  │   store    │   │    store     │   │    store     │   │ desk store │
//!  └─────┬──────┘   └──────┬───────┘   └──────┬───────┘   └─────┬──────┘
//!        │                 │ Registered       │                 │
//!        │                 └──────────────────┼──▶ AddAttendee ─┘
//!        ▼                                    ▼
//!  SessionStore                        EventRepository
//! ```
//!
//! The desk store combines four reducers over one state: filter, selection,
//! roster (check-in) and bulk messaging. See [`desk`].
//!
//! # Failure model
//!
//! Invalid commands leave a human-readable `last_error` on the workflow state and
//! emit nothing. Failed gateway calls come back as failure actions that return the
//! workflow to its editable phase and notify the user.
//!
//! # Usage
//!
//! [`EventDesk`] builds every store from a [`Config`]; the `eventdesk` binary walks
//! through each workflow.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod catalog;
pub mod config;
pub mod desk;
pub mod editor;
mod json_file;
pub mod notify;
pub mod registration;
pub mod seed;
pub mod session;
pub mod settings;
pub mod types;

pub use app::{EventDesk, OrganizerConsole};
pub use config::{Config, ConfigError, SelectionPolicy};
pub use desk::{AttendeeDeskState, DeskAction, DeskReducer, DeskStore};
pub use editor::{EditorAction, EditorReducer, EditorStore, EventEditorState};
pub use notify::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use registration::{RegistrationAction, RegistrationReducer, RegistrationStore};
pub use session::{Session, SessionError, SessionStore};
pub use settings::{OrganizerSettings, SettingsAction, SettingsStore};
pub use types::*;
