//! The event catalog: saved events, organizer search, the public listing and
//! countdowns.

use crate::seed;
use crate::types::{EventDraft, EventId, EventRecord};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Catalog write failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// Required fields are blank
    #[error("missing required fields: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
    /// No event with this id
    #[error("event {0} not found")]
    NotFound(EventId),
    /// The backend refused the write
    #[error("event store unavailable: {reason}")]
    Unavailable {
        /// Backend explanation
        reason: String,
    },
}

/// Storage of saved events
pub trait EventRepository: Send + Sync {
    /// Insert or replace an event, keyed by id
    ///
    /// # Errors
    ///
    /// Returns [`SaveError`] if the record cannot be stored.
    fn save(&self, record: EventRecord) -> BoxFuture<'static, Result<EventRecord, SaveError>>;

    /// Look up one event
    fn get(&self, id: &EventId) -> BoxFuture<'static, Option<EventRecord>>;

    /// All events in catalog order
    fn list(&self) -> BoxFuture<'static, Vec<EventRecord>>;

    /// Remove an event, returning it
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::NotFound`] for an unknown id.
    fn delete(&self, id: &EventId) -> BoxFuture<'static, Result<EventRecord, SaveError>>;
}

/// In-memory catalog; new events are appended, updates keep their position
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<Vec<EventRecord>>>,
}

impl InMemoryEventRepository {
    /// Empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the four demo events
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            events: Arc::new(RwLock::new(seed::events())),
        }
    }
}

impl EventRepository for InMemoryEventRepository {
    fn save(&self, record: EventRecord) -> BoxFuture<'static, Result<EventRecord, SaveError>> {
        let events = Arc::clone(&self.events);
        Box::pin(async move {
            let missing = record.draft.missing_fields();
            if !missing.is_empty() {
                return Err(SaveError::Incomplete(missing));
            }

            let mut events = events.write().await;
            match events.iter_mut().find(|e| e.id == record.id) {
                Some(existing) => existing.clone_from(&record),
                None => events.push(record.clone()),
            }
            tracing::info!(event_id = %record.id, name = %record.draft.name, "Event saved");
            Ok(record)
        })
    }

    fn get(&self, id: &EventId) -> BoxFuture<'static, Option<EventRecord>> {
        let events = Arc::clone(&self.events);
        let id = id.clone();
        Box::pin(async move { events.read().await.iter().find(|e| e.id == id).cloned() })
    }

    fn list(&self) -> BoxFuture<'static, Vec<EventRecord>> {
        let events = Arc::clone(&self.events);
        Box::pin(async move { events.read().await.clone() })
    }

    fn delete(&self, id: &EventId) -> BoxFuture<'static, Result<EventRecord, SaveError>> {
        let events = Arc::clone(&self.events);
        let id = id.clone();
        Box::pin(async move {
            let mut events = events.write().await;
            let index = events
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| SaveError::NotFound(id.clone()))?;
            let removed = events.remove(index);
            tracing::info!(event_id = %removed.id, "Event deleted");
            Ok(removed)
        })
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Publication status shown in the organizer list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    /// Visible to the public
    Published,
    /// Organizer only
    Draft,
}

impl From<&EventDraft> for EventStatus {
    fn from(draft: &EventDraft) -> Self {
        if draft.published {
            Self::Published
        } else {
            Self::Draft
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Organizer list search: case-insensitive over name and location
#[must_use]
pub fn organizer_search<'a>(events: &'a [EventRecord], term: &str) -> Vec<&'a EventRecord> {
    let needle = term.to_lowercase();
    events
        .iter()
        .filter(|e| contains_ci(&e.draft.name, &needle) || contains_ci(&e.draft.location, &needle))
        .collect()
}

/// Public listing: published events only, searched over name, description and tags
#[must_use]
pub fn public_search<'a>(events: &'a [EventRecord], term: &str) -> Vec<&'a EventRecord> {
    let needle = term.to_lowercase();
    events
        .iter()
        .filter(|e| e.draft.published)
        .filter(|e| {
            contains_ci(&e.draft.name, &needle)
                || contains_ci(&e.draft.description, &needle)
                || e.draft.tags.iter().any(|tag| contains_ci(tag, &needle))
        })
        .collect()
}

/// Time left until an event starts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    /// Whole days
    pub days: u64,
    /// Hours past the days
    pub hours: u64,
    /// Minutes past the hours
    pub minutes: u64,
    /// Seconds past the minutes
    pub seconds: u64,
}

impl Countdown {
    /// Returns `true` once the target has passed
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// Remaining time from `now` until `target`, all zero once `target` has passed
#[must_use]
pub fn countdown(target: DateTime<Utc>, now: DateTime<Utc>) -> Countdown {
    let remaining = u64::try_from((target - now).num_seconds()).unwrap_or(0);
    Countdown {
        days: remaining / 86_400,
        hours: remaining % 86_400 / 3_600,
        minutes: remaining % 3_600 / 60,
        seconds: remaining % 60,
    }
}

/// What the public landing page of one event shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventLanding {
    /// The event
    pub record: EventRecord,
    /// `Free`, the lowest ticket price, or `TBA`
    pub price_label: String,
    /// Start in UTC, when date and time are set
    pub starts_at: Option<DateTime<Utc>>,
    /// Time left until the start; `None` without a start time
    pub countdown: Option<Countdown>,
}

impl EventLanding {
    /// Landing view of `record` as seen at `now`
    #[must_use]
    pub fn new(record: EventRecord, now: DateTime<Utc>) -> Self {
        let starts_at = record.starts_at();
        Self {
            price_label: record.price_label(),
            countdown: starts_at.map(|start| countdown(start, now)),
            starts_at,
            record,
        }
    }
}
