//! Public registration dialog for one event.
//!
//! `Closed -> Open -> Submitting -> Closed`. A successful submit yields a fresh
//! [`Attendee`]; whoever owns the roster forwards it from the
//! [`RegistrationAction::Registered`] action.

use crate::notify::{Notification, Notifier, notify_effect};
use crate::types::{Attendee, AttendeeId, CheckIn, EventRecord, TicketType, TicketTypeId};
use eventdesk_core::environment::{Clock, IdGenerator};
use eventdesk_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use eventdesk_runtime::Store;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Registration failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// No tickets of the requested type remain
    #[error("ticket type {0} is sold out")]
    SoldOut(TicketTypeId),
    /// The backend refused the registration
    #[error("registration rejected: {reason}")]
    Rejected {
        /// Backend explanation
        reason: String,
    },
}

/// Dialog phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistrationPhase {
    /// No dialog
    #[default]
    Closed,
    /// Dialog shown, accepting edits
    Open,
    /// Waiting for the gateway
    Submitting,
}

/// Registration form fields
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Chosen ticket type of the event
    pub ticket: Option<TicketTypeId>,
}

impl RegistrationForm {
    /// Names of the blank required fields, in form order
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.ticket.is_none() {
            missing.push("ticket type");
        }
        for (name, value) in [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        missing
    }
}

/// A validated registration handed to the gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Event name the attendee is registering for
    pub event_name: String,
    /// Chosen ticket type
    pub ticket: TicketType,
    /// Full name, `"first last"`
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
}

/// Registration backend
pub trait RegistrationGateway: Send + Sync {
    /// Register one person, returning the new attendee record
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if the registration is refused.
    fn register(
        &self,
        request: RegistrationRequest,
    ) -> BoxFuture<'static, Result<Attendee, RegistrationError>>;
}

/// Gateway that accepts every registration after a fixed delay
#[derive(Clone)]
pub struct SimulatedRegistrationGateway {
    delay: Duration,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl SimulatedRegistrationGateway {
    /// Creates a gateway that answers after `delay`
    #[must_use]
    pub fn new(delay: Duration, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { delay, clock, ids }
    }
}

impl RegistrationGateway for SimulatedRegistrationGateway {
    fn register(
        &self,
        request: RegistrationRequest,
    ) -> BoxFuture<'static, Result<Attendee, RegistrationError>> {
        let delay = self.delay;
        let clock = Arc::clone(&self.clock);
        let ids = Arc::clone(&self.ids);
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            if request.ticket.quantity == 0 {
                return Err(RegistrationError::SoldOut(request.ticket.id));
            }
            let attendee = Attendee {
                id: AttendeeId::new(ids.next_id()),
                name: request.name,
                email: request.email,
                ticket_type: request.ticket.name,
                event_name: request.event_name,
                registration_date: clock.now().date_naive(),
                check_in: CheckIn::NotCheckedIn,
            };
            tracing::info!(
                attendee_id = %attendee.id,
                event = %attendee.event_name,
                "Registration accepted"
            );
            Ok(attendee)
        })
    }
}

/// Registration dialog state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationState {
    /// Phase
    pub phase: RegistrationPhase,
    /// Event the dialog is open for
    pub event: Option<EventRecord>,
    /// Form contents
    pub form: RegistrationForm,
    /// Last rejected command or failed submit
    pub last_error: Option<String>,
}

impl RegistrationState {
    /// Ticket types offered by the open event
    #[must_use]
    pub fn ticket_types(&self) -> &[TicketType] {
        self.event
            .as_ref()
            .map_or(&[], |event| event.draft.ticket_types.as_slice())
    }

    /// The chosen ticket type, if it belongs to the open event
    #[must_use]
    pub fn selected_ticket(&self) -> Option<&TicketType> {
        let id = self.form.ticket.as_ref()?;
        self.ticket_types().iter().find(|t| &t.id == id)
    }

    fn reject(&mut self, error: String) -> SmallVec<[Effect<RegistrationAction>; 4]> {
        tracing::warn!(error = %error, "Registration command rejected");
        self.last_error = Some(error);
        SmallVec::new()
    }
}

/// Inputs of the registration dialog
#[derive(Clone, Debug)]
pub enum RegistrationAction {
    /// Show the dialog for an event
    Open {
        /// Event to register for
        event: EventRecord,
    },
    /// Dismiss the dialog
    Close,
    /// Edit the first name
    SetFirstName(String),
    /// Edit the last name
    SetLastName(String),
    /// Edit the email
    SetEmail(String),
    /// Edit the phone number
    SetPhone(String),
    /// Choose a ticket type of the open event
    SelectTicket(TicketTypeId),
    /// Validate and register
    Submit,
    /// Gateway accepted the registration
    Registered {
        /// New roster entry
        attendee: Attendee,
    },
    /// Gateway refused the registration
    RegistrationFailed {
        /// Gateway error
        error: RegistrationError,
    },
}

/// Environment dependencies for registration
#[derive(Clone)]
pub struct RegistrationEnvironment {
    /// Registration backend
    pub gateway: Arc<dyn RegistrationGateway>,
    /// User-facing notifications
    pub notifier: Arc<dyn Notifier>,
}

/// Reducer for the registration dialog
#[derive(Clone, Debug, Default)]
pub struct RegistrationReducer;

impl RegistrationReducer {
    /// Creates a new `RegistrationReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn edit<F>(state: &mut RegistrationState, f: F) -> SmallVec<[Effect<RegistrationAction>; 4]>
    where
        F: FnOnce(&mut RegistrationForm),
    {
        match state.phase {
            RegistrationPhase::Open => {
                f(&mut state.form);
                state.last_error = None;
                SmallVec::new()
            },
            RegistrationPhase::Submitting => SmallVec::new(),
            RegistrationPhase::Closed => {
                state.reject("Registration dialog is not open".to_string())
            },
        }
    }

    fn submit(
        state: &mut RegistrationState,
        env: &RegistrationEnvironment,
    ) -> SmallVec<[Effect<RegistrationAction>; 4]> {
        match state.phase {
            RegistrationPhase::Open => {},
            RegistrationPhase::Submitting => return SmallVec::new(),
            RegistrationPhase::Closed => {
                return state.reject("Registration dialog is not open".to_string());
            },
        }

        let missing = state.form.missing_fields();
        if !missing.is_empty() {
            return state.reject(format!("Missing required fields: {}", missing.join(", ")));
        }
        let (Some(event), Some(ticket)) = (state.event.as_ref(), state.selected_ticket()) else {
            return state.reject("Selected ticket type is not offered by this event".to_string());
        };

        let request = RegistrationRequest {
            event_name: event.draft.name.clone(),
            ticket: ticket.clone(),
            name: format!(
                "{} {}",
                state.form.first_name.trim(),
                state.form.last_name.trim()
            ),
            email: state.form.email.trim().to_string(),
            phone: state.form.phone.trim().to_string(),
        };

        tracing::info!(
            event = %request.event_name,
            ticket = %request.ticket.name,
            "Submitting registration"
        );
        state.phase = RegistrationPhase::Submitting;
        state.last_error = None;

        let gateway = Arc::clone(&env.gateway);
        smallvec![async_effect! {
            Some(match gateway.register(request).await {
                Ok(attendee) => RegistrationAction::Registered { attendee },
                Err(error) => RegistrationAction::RegistrationFailed { error },
            })
        }]
    }
}

impl Reducer for RegistrationReducer {
    type State = RegistrationState;
    type Action = RegistrationAction;
    type Environment = RegistrationEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RegistrationAction::Open { event } => {
                if state.phase == RegistrationPhase::Submitting {
                    return SmallVec::new();
                }
                tracing::debug!(event_id = %event.id, "Registration dialog opened");
                *state = RegistrationState {
                    phase: RegistrationPhase::Open,
                    event: Some(event),
                    ..RegistrationState::default()
                };
                SmallVec::new()
            },
            RegistrationAction::Close => {
                if state.phase == RegistrationPhase::Submitting {
                    return SmallVec::new();
                }
                state.phase = RegistrationPhase::Closed;
                SmallVec::new()
            },
            RegistrationAction::SetFirstName(value) => Self::edit(state, |f| f.first_name = value),
            RegistrationAction::SetLastName(value) => Self::edit(state, |f| f.last_name = value),
            RegistrationAction::SetEmail(value) => Self::edit(state, |f| f.email = value),
            RegistrationAction::SetPhone(value) => Self::edit(state, |f| f.phone = value),
            RegistrationAction::SelectTicket(id) => {
                if state.phase == RegistrationPhase::Open
                    && !state.ticket_types().iter().any(|t| t.id == id)
                {
                    return state.reject(format!("Ticket type {id} is not offered by this event"));
                }
                Self::edit(state, |f| f.ticket = Some(id))
            },
            RegistrationAction::Submit => Self::submit(state, env),
            RegistrationAction::Registered { attendee } => {
                if state.phase != RegistrationPhase::Submitting {
                    tracing::warn!(
                        attendee_id = %attendee.id,
                        "Registration result without a submit in flight"
                    );
                    return SmallVec::new();
                }
                *state = RegistrationState::default();
                smallvec![notify_effect(
                    &env.notifier,
                    Notification::success(
                        "Registration successful!",
                        "You've been registered for the event. Check your email for confirmation.",
                    ),
                )]
            },
            RegistrationAction::RegistrationFailed { error } => {
                if state.phase != RegistrationPhase::Submitting {
                    tracing::warn!(%error, "Registration failure without a submit in flight");
                    return SmallVec::new();
                }
                tracing::warn!(%error, "Registration failed");
                state.phase = RegistrationPhase::Open;
                state.last_error = Some(error.to_string());
                smallvec![notify_effect(
                    &env.notifier,
                    Notification::error("Error", "Failed to register. Please try again."),
                )]
            },
        }
    }
}

/// Store running the registration dialog
pub type RegistrationStore =
    Store<RegistrationState, RegistrationAction, RegistrationEnvironment, RegistrationReducer>;
