//! Event editor save flow against the in-memory catalog

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

use chrono::{NaiveDate, NaiveTime};
use eventdesk::catalog::{EventRepository, InMemoryEventRepository, SaveError};
use eventdesk::editor::{EditorEnvironment, EditorPhase, EditorStore};
use eventdesk::notify::{Level, RecordingNotifier};
use eventdesk::{EditorAction, EditorReducer, EventEditorState, EventId, Money, TicketTypeId};
use eventdesk_core::environment::IdGenerator;
use eventdesk_runtime::Store;
use eventdesk_testing::SequentialIdGenerator;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

const IDLE: Duration = Duration::from_secs(5);

fn editor(
    state: EventEditorState,
    repository: Arc<dyn EventRepository>,
) -> (EditorStore, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let ids: Arc<dyn IdGenerator> = Arc::new(SequentialIdGenerator::new("event"));
    let store = Store::new(
        state,
        EditorReducer::new(),
        EditorEnvironment {
            ids,
            repository,
            notifier: notifier.clone(),
            save_delay: Duration::ZERO,
        },
    );
    (store, notifier)
}

async fn fill_required(store: &EditorStore) {
    for action in [
        EditorAction::SetName("Launch Party".to_string()),
        EditorAction::SetDescription("Drinks and demos".to_string()),
        EditorAction::SetDate(NaiveDate::from_ymd_opt(2025, 6, 1)),
        EditorAction::SetTime(NaiveTime::from_hms_opt(18, 0, 0)),
        EditorAction::SetLocation("Rooftop Venue".to_string()),
    ] {
        store.send(action).await.unwrap();
    }
}

#[tokio::test]
async fn new_event_is_created_in_catalog() {
    let repository = Arc::new(InMemoryEventRepository::new());
    let (store, notifier) = editor(EventEditorState::new_draft(), repository.clone());

    fill_required(&store).await;
    store.send(EditorAction::AddTicketType).await.unwrap();
    store.send(EditorAction::AddTag("party".to_string())).await.unwrap();
    store
        .send_and_wait_for(
            EditorAction::Submit,
            |a| matches!(a, EditorAction::Saved { .. } | EditorAction::SaveFailed { .. }),
            IDLE,
        )
        .await
        .unwrap();
    store.wait_idle(IDLE).await.unwrap();

    let (phase, event_id) = store.state(|s| (s.phase, s.event_id.clone())).await;
    assert_eq!(phase, EditorPhase::Saved);
    // The ticket type took the first id; the event the second
    assert_eq!(event_id, Some(EventId::new("event-2")));

    let saved = repository.get(&EventId::new("event-2")).await.unwrap();
    assert_eq!(saved.draft.name, "Launch Party");
    assert_eq!(saved.draft.ticket_types.len(), 2);
    assert_eq!(saved.draft.ticket_types[1].id, TicketTypeId::new("event-1"));
    assert!(saved.draft.tags.contains("party"));
    assert!(!saved.draft.published);

    let sent = notifier.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Event created!");
    assert_eq!(sent[0].description, "Your event has been successfully created.");
}

#[tokio::test]
async fn existing_event_is_updated_in_place() {
    let repository = Arc::new(InMemoryEventRepository::seeded());
    let record = repository.get(&EventId::new("3")).await.unwrap();
    let (store, notifier) = editor(EventEditorState::from_record(record), repository.clone());

    store
        .send(EditorAction::UpdateTicketType {
            id: TicketTypeId::new("1"),
            patch: eventdesk::TicketTypePatch {
                price: Some(Money::from_dollars(30)),
                ..Default::default()
            },
        })
        .await
        .unwrap();
    store.send(EditorAction::Submit).await.unwrap();
    store.wait_idle(IDLE).await.unwrap();

    let events = repository.list().await;
    assert_eq!(events.len(), 4);
    assert_eq!(events[2].id, EventId::new("3"));
    assert_eq!(
        events[2].draft.ticket_types[0].price,
        Money::from_dollars(30)
    );
    assert_eq!(notifier.titles(), vec!["Event updated!"]);
}

/// Repository that refuses every write
struct OfflineRepository;

impl EventRepository for OfflineRepository {
    fn save(
        &self,
        _record: eventdesk::EventRecord,
    ) -> BoxFuture<'static, Result<eventdesk::EventRecord, SaveError>> {
        Box::pin(async {
            Err(SaveError::Unavailable {
                reason: "offline".to_string(),
            })
        })
    }

    fn get(&self, _id: &EventId) -> BoxFuture<'static, Option<eventdesk::EventRecord>> {
        Box::pin(async { None })
    }

    fn list(&self) -> BoxFuture<'static, Vec<eventdesk::EventRecord>> {
        Box::pin(async { Vec::new() })
    }

    fn delete(
        &self,
        id: &EventId,
    ) -> BoxFuture<'static, Result<eventdesk::EventRecord, SaveError>> {
        let id = id.clone();
        Box::pin(async move { Err(SaveError::NotFound(id)) })
    }
}

#[tokio::test]
async fn failed_save_returns_to_editing() {
    let (store, notifier) = editor(EventEditorState::new_draft(), Arc::new(OfflineRepository));

    fill_required(&store).await;
    store.send(EditorAction::Submit).await.unwrap();
    store.wait_idle(IDLE).await.unwrap();

    let (phase, is_new, error) = store
        .state(|s| (s.phase, s.is_new(), s.last_error.clone()))
        .await;
    assert_eq!(phase, EditorPhase::Editing);
    assert!(is_new);
    assert_eq!(error.as_deref(), Some("event store unavailable: offline"));

    let sent = notifier.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].level, Level::Error);
    assert_eq!(sent[0].description, "Failed to save event. Please try again.");

    // Editing resumes normally after a failure
    store
        .send(EditorAction::SetName("Renamed".to_string()))
        .await
        .unwrap();
    assert_eq!(store.state(|s| s.draft.name.clone()).await, "Renamed");
}
