//! Domain types shared by the EventDesk workflows.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for an attendee, stable for the session
    AttendeeId
);

string_id!(
    /// Unique identifier for a saved event
    EventId
);

string_id!(
    /// Identifier of a ticket type within one event
    TicketTypeId
);

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Non-negative amount of money in cents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole dollars, saturating on overflow
    #[must_use]
    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Attendee
// ============================================================================

/// Check-in status of an attendee
///
/// The check-in time exists exactly when the attendee is checked in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckIn {
    /// Registered but not yet at the door
    #[default]
    NotCheckedIn,
    /// Checked in at the given time
    CheckedIn {
        /// When the attendee was (last) checked in
        at: DateTime<Utc>,
    },
}

impl CheckIn {
    /// Returns `true` when checked in
    #[must_use]
    pub const fn is_checked_in(&self) -> bool {
        matches!(self, Self::CheckedIn { .. })
    }

    /// The check-in time, if checked in
    #[must_use]
    pub const fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::CheckedIn { at } => Some(*at),
            Self::NotCheckedIn => None,
        }
    }
}

/// One registered attendee
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AttendeeRecord", try_from = "AttendeeRecord")]
pub struct Attendee {
    /// Unique id
    pub id: AttendeeId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Ticket category label (`VIP`, `General Admission`, `Student`, ...)
    pub ticket_type: String,
    /// Name of the event the attendee registered for
    pub event_name: String,
    /// Registration day
    pub registration_date: NaiveDate,
    /// Check-in status
    pub check_in: CheckIn,
}

/// Wire status values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum CheckInStatus {
    CheckedIn,
    NotCheckedIn,
}

/// Serialized form of an [`Attendee`]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttendeeRecord {
    id: AttendeeId,
    name: String,
    email: String,
    ticket_type: String,
    event_name: String,
    registration_date: NaiveDate,
    check_in_status: CheckInStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    check_in_time: Option<DateTime<Utc>>,
}

impl From<Attendee> for AttendeeRecord {
    fn from(attendee: Attendee) -> Self {
        let (check_in_status, check_in_time) = match attendee.check_in {
            CheckIn::CheckedIn { at } => (CheckInStatus::CheckedIn, Some(at)),
            CheckIn::NotCheckedIn => (CheckInStatus::NotCheckedIn, None),
        };
        Self {
            id: attendee.id,
            name: attendee.name,
            email: attendee.email,
            ticket_type: attendee.ticket_type,
            event_name: attendee.event_name,
            registration_date: attendee.registration_date,
            check_in_status,
            check_in_time,
        }
    }
}

impl TryFrom<AttendeeRecord> for Attendee {
    type Error = String;

    fn try_from(record: AttendeeRecord) -> Result<Self, Self::Error> {
        let check_in = match (record.check_in_status, record.check_in_time) {
            (CheckInStatus::CheckedIn, Some(at)) => CheckIn::CheckedIn { at },
            (CheckInStatus::NotCheckedIn, None) => CheckIn::NotCheckedIn,
            (CheckInStatus::CheckedIn, None) => {
                return Err(format!("attendee {} is checked in without a time", record.id));
            },
            (CheckInStatus::NotCheckedIn, Some(_)) => {
                return Err(format!(
                    "attendee {} has a check-in time but is not checked in",
                    record.id
                ));
            },
        };
        Ok(Self {
            id: record.id,
            name: record.name,
            email: record.email,
            ticket_type: record.ticket_type,
            event_name: record.event_name,
            registration_date: record.registration_date,
            check_in,
        })
    }
}

// ============================================================================
// Ticket types and event drafts
// ============================================================================

/// A named, priced (or free) inventory line item within an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TicketTypeRecord")]
pub struct TicketType {
    /// Id, unique within the event
    pub id: TicketTypeId,
    /// Display name
    pub name: String,
    /// Price; always zero when `is_free`
    pub price: Money,
    /// Number of tickets on offer
    pub quantity: u32,
    /// Free tickets have no price
    pub is_free: bool,
}

impl TicketType {
    /// Re-applies the free-price rule
    pub fn normalize(&mut self) {
        if self.is_free {
            self.price = Money::ZERO;
        }
    }
}

/// Unchecked serialized form of a [`TicketType`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketTypeRecord {
    id: TicketTypeId,
    name: String,
    price: Money,
    quantity: u32,
    is_free: bool,
}

impl TryFrom<TicketTypeRecord> for TicketType {
    type Error = String;

    fn try_from(record: TicketTypeRecord) -> Result<Self, Self::Error> {
        if record.is_free && record.price != Money::ZERO {
            return Err(format!(
                "ticket type {} is free but priced at {}",
                record.id, record.price
            ));
        }
        Ok(Self {
            id: record.id,
            name: record.name,
            price: record.price,
            quantity: record.quantity,
            is_free: record.is_free,
        })
    }
}

/// Partial update of a [`TicketType`]; `None` fields are left unchanged
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TicketTypePatch {
    /// New name
    pub name: Option<String>,
    /// New price (ignored while the ticket is free)
    pub price: Option<Money>,
    /// New quantity
    pub quantity: Option<u32>,
    /// New free flag
    pub is_free: Option<bool>,
}

impl TicketTypePatch {
    /// Applies the patch, then the free-price rule
    ///
    /// Turning `is_free` off does not restore an earlier price.
    pub fn apply_to(&self, ticket: &mut TicketType) {
        if let Some(name) = &self.name {
            ticket.name.clone_from(name);
        }
        if let Some(price) = self.price {
            ticket.price = price;
        }
        if let Some(quantity) = self.quantity {
            ticket.quantity = quantity;
        }
        if let Some(is_free) = self.is_free {
            ticket.is_free = is_free;
        }
        ticket.normalize();
    }
}

/// Unique, case-sensitive, insertion-ordered set of tags
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0
    }
}

impl TryFrom<Vec<String>> for TagSet {
    type Error = String;

    fn try_from(tags: Vec<String>) -> Result<Self, Self::Error> {
        let mut set = Self::default();
        for tag in tags {
            if tag.trim() != tag {
                return Err(format!("tag {tag:?} has surrounding whitespace"));
            }
            if !set.insert(&tag) {
                return Err(format!("tag {tag:?} is blank or repeated"));
            }
        }
        Ok(set)
    }
}

impl TagSet {
    /// Adds a tag after trimming it
    ///
    /// Returns `false` (and changes nothing) for a blank or already present tag.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Removes the exact tag; returns whether it was present
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Exact, case-sensitive membership
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Tags in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no tags
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tags = Self::default();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// Form state of one event
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Event name
    pub name: String,
    /// Description shown on the public page
    pub description: String,
    /// Calendar day
    pub date: Option<NaiveDate>,
    /// Start time
    pub time: Option<NaiveTime>,
    /// Venue
    pub location: String,
    /// Opaque banner image reference
    pub banner: Option<String>,
    /// Tags
    pub tags: TagSet,
    /// Ticket line items
    pub ticket_types: Vec<TicketType>,
    /// Whether the event is visible to the public
    pub published: bool,
}

impl EventDraft {
    /// Names of required fields that are still blank
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.time.is_none() {
            missing.push("time");
        }
        if self.location.trim().is_empty() {
            missing.push("location");
        }
        missing
    }

    /// Lowest ticket price, `None` when the event has no ticket types
    #[must_use]
    pub fn lowest_price(&self) -> Option<Money> {
        self.ticket_types.iter().map(|t| t.price).min()
    }
}

/// A saved event: the catalog entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Catalog id
    pub id: EventId,
    /// Saved form state
    #[serde(flatten)]
    pub draft: EventDraft,
}

impl EventRecord {
    /// Start of the event in UTC, when both date and time are set
    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        let date = self.draft.date?;
        let time = self.draft.time?;
        Some(date.and_time(time).and_utc())
    }

    /// Public price label: `Free`, the lowest price, or `TBA` without tickets
    #[must_use]
    pub fn price_label(&self) -> String {
        match self.draft.lowest_price() {
            Some(price) if price.is_zero() => "Free".to_string(),
            Some(price) => price.to_string(),
            None => "TBA".to_string(),
        }
    }

    /// Looks up one of the event's ticket types
    #[must_use]
    pub fn ticket_type(&self, id: &TicketTypeId) -> Option<&TicketType> {
        self.draft.ticket_types.iter().find(|t| &t.id == id)
    }
}

// ============================================================================
// Messaging
// ============================================================================

/// Bulk message delivery channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageChannel {
    /// Email (requires a subject)
    #[default]
    Email,
    /// Text message
    Sms,
}

/// Predefined bulk message content
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageTemplate {
    /// Thanks for registering
    Welcome,
    /// Upcoming event reminder
    Reminder,
    /// Check-in instructions
    CheckIn,
}

impl MessageTemplate {
    /// All templates
    pub const ALL: [Self; 3] = [Self::Welcome, Self::Reminder, Self::CheckIn];

    /// Subject line
    #[must_use]
    pub const fn subject(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome to our event!",
            Self::Reminder => "Event reminder - Don't forget!",
            Self::CheckIn => "Check-in instructions",
        }
    }

    /// Message body
    #[must_use]
    pub const fn body(self) -> &'static str {
        match self {
            Self::Welcome => {
                "Thank you for registering for our event. We're excited to see you there!"
            },
            Self::Reminder => {
                "This is a friendly reminder about the upcoming event. We look forward to seeing you!"
            },
            Self::CheckIn => {
                "Here are your check-in instructions for the event. Please arrive 15 minutes early."
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn attendee(check_in: CheckIn) -> Attendee {
        Attendee {
            id: AttendeeId::new("1"),
            name: "Sarah Johnson".to_string(),
            email: "sarah.johnson@email.com".to_string(),
            ticket_type: "VIP".to_string(),
            event_name: "Tech Conference 2024".to_string(),
            registration_date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            check_in,
        }
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_dollars(50).to_string(), "$50.00");
        assert_eq!(Money::from_cents(705).to_string(), "$7.05");
        assert_eq!(Money::from_dollars(u64::MAX).cents(), u64::MAX);
    }

    #[test]
    fn test_attendee_serializes_with_status_fields() {
        let at = DateTime::parse_from_rfc3339("2024-03-15T09:15:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_value(attendee(CheckIn::CheckedIn { at })).unwrap();
        assert_eq!(json["checkInStatus"], "checked-in");
        assert_eq!(json["checkInTime"], "2024-03-15T09:15:00Z");
        assert_eq!(json["ticketType"], "VIP");

        let json = serde_json::to_value(attendee(CheckIn::NotCheckedIn)).unwrap();
        assert_eq!(json["checkInStatus"], "not-checked-in");
        assert!(json.get("checkInTime").is_none());
    }

    #[test]
    fn test_attendee_rejects_time_without_status() {
        let mut json = serde_json::to_value(attendee(CheckIn::NotCheckedIn)).unwrap();
        json["checkInTime"] = serde_json::Value::String("2024-03-15T09:15:00Z".to_string());
        assert!(serde_json::from_value::<Attendee>(json).is_err());
    }

    #[test]
    fn test_patch_keeps_free_tickets_at_zero() {
        let mut ticket = TicketType {
            id: TicketTypeId::new("t"),
            name: "New Ticket Type".to_string(),
            price: Money::ZERO,
            quantity: 50,
            is_free: true,
        };

        TicketTypePatch {
            price: Some(Money::from_dollars(20)),
            ..TicketTypePatch::default()
        }
        .apply_to(&mut ticket);
        assert_eq!(ticket.price, Money::ZERO);

        TicketTypePatch {
            is_free: Some(false),
            ..TicketTypePatch::default()
        }
        .apply_to(&mut ticket);
        assert!(!ticket.is_free);
        assert_eq!(ticket.price, Money::ZERO);
    }

    #[test]
    fn test_tag_set_trims_and_dedups() {
        let mut tags = TagSet::default();
        assert!(tags.insert("  music "));
        assert!(!tags.insert("music"));
        assert!(!tags.insert("   "));
        assert!(tags.insert("Music"));
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["music", "Music"]);
        assert!(tags.remove("music"));
        assert!(!tags.remove("music"));
    }

    #[test]
    fn test_ticket_type_rejects_priced_free_ticket() {
        let json = serde_json::json!({
            "id": "1",
            "name": "Community Pass",
            "price": 1500,
            "quantity": 20,
            "isFree": true,
        });
        let error = serde_json::from_value::<TicketType>(json).unwrap_err();
        assert!(error.to_string().contains("free but priced"));

        let json = serde_json::json!({
            "id": "1",
            "name": "Community Pass",
            "price": 0,
            "quantity": 20,
            "isFree": true,
        });
        let ticket: TicketType = serde_json::from_value(json).unwrap();
        assert!(ticket.is_free);
        assert_eq!(serde_json::to_value(&ticket).unwrap()["isFree"], true);
    }

    #[test]
    fn test_tag_set_rejects_repeated_and_blank_tags() {
        let tags: TagSet = serde_json::from_str(r#"["tech", "Tech"]"#).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["tech","Tech"]"#);

        assert!(serde_json::from_str::<TagSet>(r#"["tech", "tech"]"#).is_err());
        assert!(serde_json::from_str::<TagSet>(r#"["  "]"#).is_err());
        assert!(serde_json::from_str::<TagSet>(r#"[" tech"]"#).is_err());
    }

    #[test]
    fn test_missing_fields() {
        let draft = EventDraft {
            name: "Launch".to_string(),
            location: "  ".to_string(),
            ..EventDraft::default()
        };
        assert_eq!(
            draft.missing_fields(),
            vec!["description", "date", "time", "location"]
        );
    }

    #[test]
    fn test_template_text() {
        assert_eq!(MessageTemplate::Welcome.subject(), "Welcome to our event!");
        assert!(MessageTemplate::CheckIn.body().contains("15 minutes early"));
    }
}
