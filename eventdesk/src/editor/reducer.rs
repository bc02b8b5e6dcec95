//! Reducer for the event editor.

use super::{EditorAction, EditorEnvironment, EditorPhase, EventEditorState, tickets};
use crate::notify::{Notification, notify_effect};
use crate::types::{EventDraft, EventId, EventRecord, TicketTypeId};
use eventdesk_core::{SmallVec, async_effect, delay, effect::Effect, reducer::Reducer, smallvec};
use std::sync::Arc;

/// Reducer for the event editor
#[derive(Clone, Debug)]
pub struct EditorReducer;

impl EditorReducer {
    /// Creates a new `EditorReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn reject(state: &mut EventEditorState, error: String) -> SmallVec<[Effect<EditorAction>; 4]> {
        tracing::warn!(error = %error, "Editor command rejected");
        state.last_error = Some(error);
        SmallVec::new()
    }

    /// Applies an edit to the draft; edits are ignored while saving
    fn edit<F>(state: &mut EventEditorState, f: F) -> SmallVec<[Effect<EditorAction>; 4]>
    where
        F: FnOnce(&mut EventDraft) -> Result<(), String>,
    {
        if state.phase == EditorPhase::Saving {
            tracing::debug!("Ignoring edit while saving");
            return SmallVec::new();
        }
        match f(&mut state.draft) {
            Ok(()) => {
                state.phase = EditorPhase::Editing;
                state.last_error = None;
                SmallVec::new()
            },
            Err(error) => Self::reject(state, error),
        }
    }

    fn submit(
        state: &mut EventEditorState,
        env: &EditorEnvironment,
    ) -> SmallVec<[Effect<EditorAction>; 4]> {
        if state.phase == EditorPhase::Saving {
            tracing::debug!("Ignoring re-submission while saving");
            return SmallVec::new();
        }

        let missing = state.draft.missing_fields();
        if !missing.is_empty() {
            return Self::reject(
                state,
                format!("Missing required fields: {}", missing.join(", ")),
            );
        }

        let created = state.is_new();
        let id = state
            .event_id
            .clone()
            .unwrap_or_else(|| EventId::new(env.ids.next_id()));
        let record = EventRecord {
            id,
            draft: state.draft.clone(),
        };

        tracing::info!(event_id = %record.id, created, "Saving event");
        state.phase = EditorPhase::Saving;
        state.last_error = None;

        // Simulated network latency before the write
        smallvec![delay! {
            duration: env.save_delay,
            action: EditorAction::Persist { record, created }
        }]
    }

    fn persist(
        state: &EventEditorState,
        record: EventRecord,
        created: bool,
        env: &EditorEnvironment,
    ) -> SmallVec<[Effect<EditorAction>; 4]> {
        if state.phase != EditorPhase::Saving {
            tracing::warn!(event_id = %record.id, "Persist without a save in flight");
            return SmallVec::new();
        }
        let repository = Arc::clone(&env.repository);
        smallvec![async_effect! {
            Some(match repository.save(record).await {
                Ok(record) => EditorAction::Saved { record, created },
                Err(error) => EditorAction::SaveFailed { error },
            })
        }]
    }
}

impl Default for EditorReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for EditorReducer {
    type State = EventEditorState;
    type Action = EditorAction;
    type Environment = EditorEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Fields ==========
            EditorAction::SetName(name) => Self::edit(state, |d| {
                d.name = name;
                Ok(())
            }),
            EditorAction::SetDescription(description) => Self::edit(state, |d| {
                d.description = description;
                Ok(())
            }),
            EditorAction::SetDate(date) => Self::edit(state, |d| {
                d.date = date;
                Ok(())
            }),
            EditorAction::SetTime(time) => Self::edit(state, |d| {
                d.time = time;
                Ok(())
            }),
            EditorAction::SetLocation(location) => Self::edit(state, |d| {
                d.location = location;
                Ok(())
            }),
            EditorAction::SetBanner(banner) => Self::edit(state, |d| {
                d.banner = banner;
                Ok(())
            }),
            EditorAction::SetPublished(published) => Self::edit(state, |d| {
                d.published = published;
                Ok(())
            }),

            // ========== Ticket types ==========
            EditorAction::AddTicketType => {
                let id = TicketTypeId::new(env.ids.next_id());
                Self::edit(state, |d| {
                    d.ticket_types.push(tickets::new_ticket(id));
                    Ok(())
                })
            },
            EditorAction::UpdateTicketType { id, patch } => {
                Self::edit(state, |d| tickets::update(&mut d.ticket_types, &id, &patch))
            },
            EditorAction::RemoveTicketType { id } => {
                Self::edit(state, |d| tickets::remove(&mut d.ticket_types, &id))
            },

            // ========== Tags ==========
            EditorAction::AddTag(tag) => Self::edit(state, |d| {
                if !d.tags.insert(&tag) {
                    tracing::debug!(tag = %tag, "Ignoring blank or duplicate tag");
                }
                Ok(())
            }),
            EditorAction::RemoveTag(tag) => Self::edit(state, |d| {
                d.tags.remove(&tag);
                Ok(())
            }),

            // ========== Lifecycle ==========
            EditorAction::LoadEvent(record) => {
                if state.phase == EditorPhase::Saving {
                    tracing::debug!("Ignoring load while saving");
                    return SmallVec::new();
                }
                tracing::debug!(event_id = %record.id, "Loaded event into editor");
                *state = EventEditorState::from_record(record);
                SmallVec::new()
            },
            EditorAction::Submit => Self::submit(state, env),
            EditorAction::Persist { record, created } => Self::persist(state, record, created, env),
            EditorAction::Saved { record, created } => {
                if state.phase != EditorPhase::Saving {
                    tracing::warn!(event_id = %record.id, "Save result without a save in flight");
                    return SmallVec::new();
                }
                state.event_id = Some(record.id);
                state.phase = EditorPhase::Saved;
                state.last_error = None;

                let notification = if created {
                    Notification::success(
                        "Event created!",
                        "Your event has been successfully created.",
                    )
                } else {
                    Notification::success(
                        "Event updated!",
                        "Your event has been successfully updated.",
                    )
                };
                smallvec![notify_effect(&env.notifier, notification)]
            },
            EditorAction::SaveFailed { error } => {
                if state.phase != EditorPhase::Saving {
                    tracing::warn!(%error, "Save failure without a save in flight");
                    return SmallVec::new();
                }
                tracing::warn!(%error, "Event save failed");
                state.phase = EditorPhase::Editing;
                state.last_error = Some(error.to_string());
                smallvec![notify_effect(
                    &env.notifier,
                    Notification::error("Error", "Failed to save event. Please try again."),
                )]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryEventRepository, SaveError};
    use crate::notify::RecordingNotifier;
    use crate::types::{Money, TicketTypePatch};
    use chrono::{NaiveDate, NaiveTime};
    use eventdesk_testing::{ReducerTest, SequentialIdGenerator, assertions};
    use std::time::Duration;

    fn test_env() -> EditorEnvironment {
        EditorEnvironment {
            ids: Arc::new(SequentialIdGenerator::new("id")),
            repository: Arc::new(InMemoryEventRepository::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            save_delay: Duration::ZERO,
        }
    }

    fn complete_draft() -> EventEditorState {
        let mut state = EventEditorState::new_draft();
        state.draft.name = "Launch Party".to_string();
        state.draft.description = "Drinks and demos".to_string();
        state.draft.date = NaiveDate::from_ymd_opt(2025, 6, 1);
        state.draft.time = NaiveTime::from_hms_opt(18, 0, 0);
        state.draft.location = "Rooftop Venue".to_string();
        state
    }

    #[test]
    fn test_new_draft_has_starter_ticket() {
        let state = EventEditorState::new_draft();
        assert_eq!(state.draft.ticket_types.len(), 1);
        let ticket = &state.draft.ticket_types[0];
        assert_eq!(ticket.name, "General Admission");
        assert_eq!(ticket.price, Money::from_dollars(50));
        assert_eq!(ticket.quantity, 100);
        assert!(!ticket.is_free);
    }

    #[test]
    fn test_new_draft_follows_auto_publish() {
        let mut defaults = crate::settings::OrganizerSettings::default().event_defaults;
        assert!(!EventEditorState::from_defaults(&defaults).draft.published);

        defaults.auto_publish = true;
        let state = EventEditorState::from_defaults(&defaults);
        assert!(state.draft.published);
        assert!(state.is_new());
        assert_eq!(state.draft.ticket_types.len(), 1);
    }

    #[test]
    fn test_add_ticket_type() {
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(EventEditorState::new_draft())
            .when_action(EditorAction::AddTicketType)
            .then_state(|state| {
                let ticket = state.draft.ticket_types.last().unwrap();
                assert_eq!(ticket.id, TicketTypeId::new("id-1"));
                assert_eq!(ticket.name, "New Ticket Type");
                assert_eq!(ticket.price, Money::ZERO);
                assert_eq!(ticket.quantity, 50);
                assert!(ticket.is_free);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_free_ticket_price_stays_zero() {
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(EventEditorState::new_draft())
            .when_action(EditorAction::UpdateTicketType {
                id: TicketTypeId::new("1"),
                patch: TicketTypePatch {
                    is_free: Some(true),
                    ..TicketTypePatch::default()
                },
            })
            .when_action(EditorAction::UpdateTicketType {
                id: TicketTypeId::new("1"),
                patch: TicketTypePatch {
                    is_free: Some(false),
                    ..TicketTypePatch::default()
                },
            })
            .then_state(|state| {
                let ticket = &state.draft.ticket_types[0];
                assert!(!ticket.is_free);
                assert_eq!(ticket.price, Money::ZERO);
            })
            .run();
    }

    #[test]
    fn test_remove_every_ticket_type() {
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(EventEditorState::new_draft())
            .when_action(EditorAction::RemoveTicketType {
                id: TicketTypeId::new("1"),
            })
            .then_state(|state| {
                assert!(state.draft.ticket_types.is_empty());
                assert!(state.last_error.is_none());
            })
            .run();
    }

    #[test]
    fn test_update_unknown_ticket_type_is_rejected() {
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(EventEditorState::new_draft())
            .when_action(EditorAction::UpdateTicketType {
                id: TicketTypeId::new("nope"),
                patch: TicketTypePatch::default(),
            })
            .then_state(|state| {
                assert_eq!(
                    state.last_error.as_deref(),
                    Some("Ticket type nope not found")
                );
            })
            .run();
    }

    #[test]
    fn test_tags_trim_and_ignore_duplicates() {
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(EventEditorState::new_draft())
            .when_action(EditorAction::AddTag(" music ".to_string()))
            .when_action(EditorAction::AddTag("music".to_string()))
            .when_action(EditorAction::AddTag("   ".to_string()))
            .when_action(EditorAction::AddTag("Music".to_string()))
            .when_action(EditorAction::RemoveTag("Music".to_string()))
            .then_state(|state| {
                assert_eq!(state.draft.tags.iter().collect::<Vec<_>>(), vec!["music"]);
                assert!(state.last_error.is_none());
            })
            .run();
    }

    #[test]
    fn test_submit_validates_required_fields() {
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(EventEditorState::new_draft())
            .when_action(EditorAction::SetName("Launch".to_string()))
            .when_action(EditorAction::Submit)
            .then_state(|state| {
                assert_eq!(state.phase, EditorPhase::Editing);
                assert_eq!(
                    state.last_error.as_deref(),
                    Some("Missing required fields: description, date, time, location")
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_submit_enters_saving() {
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(complete_draft())
            .when_action(EditorAction::SetPublished(true))
            .when_action(EditorAction::Submit)
            .then_state(|state| {
                assert_eq!(state.phase, EditorPhase::Saving);
                assert!(state.draft.published);
                assert!(state.is_new());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_delay_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_persist_writes_while_saving() {
        let mut saving = complete_draft();
        saving.phase = EditorPhase::Saving;
        let record = EventRecord {
            id: EventId::new("id-3"),
            draft: saving.draft.clone(),
        };

        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(saving)
            .when_action(EditorAction::Persist {
                record,
                created: true,
            })
            .then_state(|state| assert_eq!(state.phase, EditorPhase::Saving))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_persist_ignored_outside_saving() {
        let record = EventRecord {
            id: EventId::new("id-3"),
            draft: complete_draft().draft,
        };

        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(complete_draft())
            .when_action(EditorAction::Persist {
                record,
                created: true,
            })
            .then_state(|state| assert_eq!(state.phase, EditorPhase::Editing))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_edits_and_resubmit_ignored_while_saving() {
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(complete_draft())
            .when_action(EditorAction::Submit)
            .when_action(EditorAction::SetName("Changed".to_string()))
            .when_action(EditorAction::Submit)
            .then_state(|state| {
                assert_eq!(state.phase, EditorPhase::Saving);
                assert_eq!(state.draft.name, "Launch Party");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_saved_records_id_and_notifies() {
        let mut saving = complete_draft();
        saving.phase = EditorPhase::Saving;
        let record = EventRecord {
            id: EventId::new("id-7"),
            draft: saving.draft.clone(),
        };

        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(saving)
            .when_action(EditorAction::Saved {
                record,
                created: true,
            })
            .then_state(|state| {
                assert_eq!(state.phase, EditorPhase::Saved);
                assert_eq!(state.event_id, Some(EventId::new("id-7")));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_save_failed_returns_to_editing() {
        let mut saving = complete_draft();
        saving.phase = EditorPhase::Saving;

        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(saving)
            .when_action(EditorAction::SaveFailed {
                error: SaveError::Unavailable {
                    reason: "disk full".to_string(),
                },
            })
            .then_state(|state| {
                assert_eq!(state.phase, EditorPhase::Editing);
                assert!(state.is_new());
                assert!(state.last_error.as_deref().unwrap().contains("disk full"));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_load_event_seeds_editor() {
        let record = crate::seed::events().remove(0);
        ReducerTest::new(EditorReducer::new())
            .with_env(test_env())
            .given_state(EventEditorState::new_draft())
            .when_action(EditorAction::LoadEvent(record))
            .then_state(|state| {
                assert_eq!(state.event_id, Some(EventId::new("1")));
                assert_eq!(state.draft.name, "Tech Conference 2024");
                assert_eq!(state.draft.ticket_types.len(), 3);
                assert!(!state.is_new());
            })
            .run();
    }
}
