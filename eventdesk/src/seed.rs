//! Demo data the desk and the catalog start with.

use crate::types::{
    Attendee, AttendeeId, CheckIn, EventDraft, EventId, EventRecord, Money, TagSet, TicketType,
    TicketTypeId,
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

fn checked_in(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> CheckIn {
    let at: DateTime<Utc> = Utc
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or_default();
    CheckIn::CheckedIn { at }
}

fn attendee(
    id: &str,
    name: &str,
    email: &str,
    ticket_type: &str,
    event_name: &str,
    registered: NaiveDate,
    check_in: CheckIn,
) -> Attendee {
    Attendee {
        id: AttendeeId::new(id),
        name: name.to_string(),
        email: email.to_string(),
        ticket_type: ticket_type.to_string(),
        event_name: event_name.to_string(),
        registration_date: registered,
        check_in,
    }
}

/// The five attendees of the demo roster
#[must_use]
pub fn attendees() -> Vec<Attendee> {
    vec![
        attendee(
            "1",
            "Sarah Johnson",
            "sarah.johnson@email.com",
            "VIP",
            "Tech Conference 2024",
            date(2024, 2, 15),
            checked_in(2024, 3, 15, 9, 15),
        ),
        attendee(
            "2",
            "Mike Chen",
            "mike.chen@email.com",
            "General Admission",
            "Tech Conference 2024",
            date(2024, 2, 20),
            CheckIn::NotCheckedIn,
        ),
        attendee(
            "3",
            "Emily Davis",
            "emily.davis@email.com",
            "Student",
            "Product Launch Event",
            date(2024, 2, 25),
            checked_in(2024, 3, 18, 14, 30),
        ),
        attendee(
            "4",
            "John Smith",
            "john.smith@email.com",
            "General Admission",
            "Networking Mixer",
            date(2024, 3, 1),
            CheckIn::NotCheckedIn,
        ),
        attendee(
            "5",
            "Lisa Wang",
            "lisa.wang@email.com",
            "VIP",
            "Tech Conference 2024",
            date(2024, 2, 10),
            checked_in(2024, 3, 15, 8, 45),
        ),
    ]
}

fn ticket(id: &str, name: &str, dollars: u64, quantity: u32) -> TicketType {
    TicketType {
        id: TicketTypeId::new(id),
        name: name.to_string(),
        price: Money::from_dollars(dollars),
        quantity,
        is_free: dollars == 0,
    }
}

/// Builds one catalog entry
#[allow(clippy::too_many_arguments)]
fn event(
    id: &str,
    name: &str,
    description: &str,
    day: NaiveDate,
    start: NaiveTime,
    location: &str,
    tags: &[&str],
    ticket_types: Vec<TicketType>,
    published: bool,
) -> EventRecord {
    EventRecord {
        id: EventId::new(id),
        draft: EventDraft {
            name: name.to_string(),
            description: description.to_string(),
            date: Some(day),
            time: Some(start),
            location: location.to_string(),
            banner: None,
            tags: tags.iter().copied().collect::<TagSet>(),
            ticket_types,
            published,
        },
    }
}

/// The four demo events
#[must_use]
pub fn events() -> Vec<EventRecord> {
    vec![
        event(
            "1",
            "Tech Conference 2024",
            "Join industry leaders for the biggest tech conference of the year.",
            date(2024, 3, 15),
            time(9, 0),
            "Convention Center, Downtown",
            &["technology", "conference", "networking"],
            vec![
                ticket("1", "Early Bird", 75, 50),
                ticket("2", "General Admission", 100, 200),
                ticket("3", "VIP Pass", 250, 25),
            ],
            true,
        ),
        event(
            "2",
            "Product Launch Event",
            "Be the first to see our revolutionary new product in action.",
            date(2024, 3, 18),
            time(14, 0),
            "Main Auditorium",
            &["business", "launch"],
            vec![ticket("1", "General Admission", 0, 75)],
            false,
        ),
        event(
            "3",
            "Networking Mixer",
            "Connect with professionals from various industries in a relaxed setting.",
            date(2024, 3, 22),
            time(18, 0),
            "Rooftop Venue",
            &["networking"],
            vec![ticket("1", "General Admission", 25, 200)],
            true,
        ),
        event(
            "4",
            "Workshop: Digital Marketing",
            "Learn the latest digital marketing strategies from industry experts.",
            date(2024, 3, 25),
            time(10, 0),
            "Training Room A",
            &["education", "marketing"],
            vec![ticket("1", "Workshop Seat", 150, 30)],
            true,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_roster() {
        let roster = attendees();
        assert_eq!(roster.len(), 5);
        assert_eq!(
            roster.iter().filter(|a| a.check_in.is_checked_in()).count(),
            3
        );
    }

    #[test]
    fn test_seed_catalog() {
        let events = events();
        assert_eq!(events.len(), 4);
        assert_eq!(events.iter().filter(|e| e.draft.published).count(), 3);
        assert_eq!(events[0].price_label(), "$75.00");
        assert_eq!(events[1].price_label(), "Free");
        assert!(events.iter().all(|e| e.draft.missing_fields().is_empty()));
    }
}
