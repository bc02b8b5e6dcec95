//! Bulk messaging: compose a templated email or SMS and deliver it to the selection.
//!
//! ```text
//! Closed ──Open──▶ Open ──edit──▶ Composing ──Send──▶ Sending ──MessagesSent──▶ Closed
//!                                      ▲                  │
//!                                      └──DeliveryFailed──┘
//! ```

use super::{AttendeeDeskState, DeskAction, DeskEnvironment};
use crate::notify::{Notification, notify_effect};
use crate::types::{AttendeeId, MessageChannel};
use eventdesk_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Advisory SMS length; longer bodies are flagged but still sent
pub const SMS_CHAR_LIMIT: usize = 160;

// ============================================================================
// Gateway
// ============================================================================

/// One addressee of a bulk message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    /// Attendee id
    pub id: AttendeeId,
    /// Address at submit time
    pub email: String,
}

/// A message ready for delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Delivery channel
    pub channel: MessageChannel,
    /// Subject line (email only)
    pub subject: Option<String>,
    /// Message body
    pub body: String,
    /// Addressees captured at submit time
    pub recipients: Vec<Recipient>,
}

/// Outcome of a successful delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Gateway batch id
    pub batch_id: String,
    /// Number of messages handed over
    pub delivered: usize,
}

/// Delivery failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The batch had no recipients
    #[error("no recipients")]
    NoRecipients,
    /// The gateway refused the batch
    #[error("delivery rejected: {reason}")]
    Rejected {
        /// Gateway explanation
        reason: String,
    },
}

/// Message delivery backend
pub trait MessageGateway: Send + Sync {
    /// Deliver one message to all its recipients
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the batch is not accepted.
    fn deliver(
        &self,
        message: OutgoingMessage,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryReceipt, DeliveryError>> + Send>>;
}

/// Gateway that accepts every non-empty batch after a fixed delay
#[derive(Clone, Debug, Default)]
pub struct SimulatedMessageGateway {
    delay: Duration,
}

impl SimulatedMessageGateway {
    /// Creates a gateway with the given latency
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl MessageGateway for SimulatedMessageGateway {
    fn deliver(
        &self,
        message: OutgoingMessage,
    ) -> Pin<Box<dyn Future<Output = Result<DeliveryReceipt, DeliveryError>> + Send>> {
        let delay = self.delay;
        Box::pin(async move {
            // Simulate network delay
            tokio::time::sleep(delay).await;

            if message.recipients.is_empty() {
                return Err(DeliveryError::NoRecipients);
            }

            let batch_id = format!("batch_{}", uuid::Uuid::new_v4());
            tracing::info!(
                batch_id = %batch_id,
                channel = ?message.channel,
                recipients = message.recipients.len(),
                "Simulated bulk message delivered"
            );

            Ok(DeliveryReceipt {
                batch_id,
                delivered: message.recipients.len(),
            })
        })
    }
}

// ============================================================================
// State
// ============================================================================

/// Dialog phase
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DialogPhase {
    /// Not shown
    #[default]
    Closed,
    /// Shown, untouched
    Open,
    /// Shown, edited
    Composing,
    /// Waiting for the gateway
    Sending {
        /// Addressees captured at submit time
        recipients: Vec<Recipient>,
    },
}

/// Message being composed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageDraft {
    /// Delivery channel
    pub channel: MessageChannel,
    /// Subject line (required for email)
    pub subject: String,
    /// Body (always required)
    pub body: String,
}

impl MessageDraft {
    /// Returns `true` for an SMS whose body is longer than [`SMS_CHAR_LIMIT`]
    #[must_use]
    pub fn exceeds_sms_limit(&self) -> bool {
        self.channel == MessageChannel::Sms && self.body.chars().count() > SMS_CHAR_LIMIT
    }

    fn validate(&self) -> Result<(), String> {
        if self.body.trim().is_empty() {
            return Err("Message body is required".to_string());
        }
        if self.channel == MessageChannel::Email && self.subject.trim().is_empty() {
            return Err("Subject is required for email".to_string());
        }
        Ok(())
    }
}

/// Bulk message dialog state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkMessageState {
    /// Dialog phase
    pub phase: DialogPhase,
    /// Current draft
    pub draft: MessageDraft,
    /// Last delivery failure, cleared by the next successful send
    pub last_delivery_error: Option<DeliveryError>,
}

impl BulkMessageState {
    /// Returns `true` while the dialog accepts edits
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self.phase, DialogPhase::Open | DialogPhase::Composing)
    }

    /// Returns `true` while a delivery is in flight
    #[must_use]
    pub const fn is_sending(&self) -> bool {
        matches!(self.phase, DialogPhase::Sending { .. })
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Handles the bulk message dialog
#[derive(Clone, Copy, Debug, Default)]
pub struct BulkMessageReducer;

impl BulkMessageReducer {
    /// Applies a draft edit, moving `Open` to `Composing`
    fn edit(
        state: &mut AttendeeDeskState,
        f: impl FnOnce(&mut MessageDraft),
    ) -> SmallVec<[Effect<DeskAction>; 4]> {
        if state.bulk.is_sending() {
            tracing::debug!("Ignoring draft edit while sending");
            return SmallVec::new();
        }
        if !state.bulk.is_editable() {
            return state.reject("Bulk message dialog is not open".to_string());
        }
        f(&mut state.bulk.draft);
        state.bulk.phase = DialogPhase::Composing;
        state.last_error = None;
        SmallVec::new()
    }

    fn send(
        state: &mut AttendeeDeskState,
        env: &DeskEnvironment,
    ) -> SmallVec<[Effect<DeskAction>; 4]> {
        if state.bulk.is_sending() {
            tracing::debug!("Ignoring re-submission while sending");
            return SmallVec::new();
        }
        if !state.bulk.is_editable() {
            return state.reject("Bulk message dialog is not open".to_string());
        }
        if let Err(error) = state.bulk.draft.validate() {
            return state.reject(error);
        }

        let recipients = state.selected_recipients();
        if recipients.is_empty() {
            return state.reject("No attendees selected".to_string());
        }

        let draft = &state.bulk.draft;
        let message = OutgoingMessage {
            channel: draft.channel,
            subject: (draft.channel == MessageChannel::Email).then(|| draft.subject.clone()),
            body: draft.body.clone(),
            recipients: recipients.clone(),
        };

        tracing::info!(
            channel = ?message.channel,
            recipients = recipients.len(),
            "Sending bulk message"
        );
        state.bulk.phase = DialogPhase::Sending { recipients };
        state.last_error = None;

        let gateway = Arc::clone(&env.gateway);
        smallvec![async_effect! {
            Some(match gateway.deliver(message).await {
                Ok(receipt) => DeskAction::MessagesSent { receipt },
                Err(error) => DeskAction::DeliveryFailed { error },
            })
        }]
    }
}

impl Reducer for BulkMessageReducer {
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
            DeskAction::OpenBulkMessage => {
                if state.bulk.phase != DialogPhase::Closed {
                    return SmallVec::new();
                }
                if state.selection.is_empty() {
                    return state.reject("Select at least one attendee first".to_string());
                }
                state.bulk.phase = DialogPhase::Open;
                state.last_error = None;
                SmallVec::new()
            },
            DeskAction::CloseBulkMessage => {
                if state.bulk.is_sending() {
                    tracing::debug!("Ignoring close while sending");
                } else {
                    state.bulk.phase = DialogPhase::Closed;
                }
                SmallVec::new()
            },
            DeskAction::SetChannel(channel) => Self::edit(state, |d| d.channel = channel),
            DeskAction::SetSubject(subject) => Self::edit(state, |d| d.subject = subject),
            DeskAction::SetBody(body) => Self::edit(state, |d| d.body = body),
            DeskAction::ApplyTemplate(template) => Self::edit(state, |d| {
                d.subject = template.subject().to_string();
                d.body = template.body().to_string();
            }),
            DeskAction::SendBulkMessage => Self::send(state, env),
            DeskAction::MessagesSent { receipt } => {
                let DialogPhase::Sending { recipients } = &state.bulk.phase else {
                    tracing::warn!(
                        batch_id = %receipt.batch_id,
                        "Delivery receipt without a send in flight"
                    );
                    return SmallVec::new();
                };
                let count = recipients.len();

                tracing::info!(batch_id = %receipt.batch_id, count, "Bulk message sent");
                state.bulk.phase = DialogPhase::Closed;
                state.bulk.draft.subject.clear();
                state.bulk.draft.body.clear();
                state.bulk.last_delivery_error = None;
                state.selection.clear();
                state.last_error = None;

                smallvec![notify_effect(
                    &env.notifier,
                    Notification::success(
                        "Messages sent",
                        format!("Message sent to {count} attendees.")
                    ),
                )]
            },
            DeskAction::DeliveryFailed { error } => {
                if !state.bulk.is_sending() {
                    tracing::warn!(%error, "Delivery failure without a send in flight");
                    return SmallVec::new();
                }

                tracing::warn!(%error, "Bulk message delivery failed");
                state.bulk.phase = DialogPhase::Composing;
                state.last_error = Some(error.to_string());
                state.bulk.last_delivery_error = Some(error);

                smallvec![notify_effect(
                    &env.notifier,
                    Notification::error("Error", "Failed to send message. Please try again."),
                )]
            },
            _ => SmallVec::new(),
        }
    }
}
