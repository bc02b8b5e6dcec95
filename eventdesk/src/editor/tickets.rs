//! Ticket-type line items of an event draft.

use crate::types::{Money, TicketType, TicketTypeId, TicketTypePatch};

/// Name given to a freshly added ticket type
pub const NEW_TICKET_NAME: &str = "New Ticket Type";

/// Quantity given to a freshly added ticket type
pub const NEW_TICKET_QUANTITY: u32 = 50;

/// Ticket types a brand new draft starts with
#[must_use]
pub fn starter_tickets() -> Vec<TicketType> {
    vec![TicketType {
        id: TicketTypeId::new("1"),
        name: "General Admission".to_string(),
        price: Money::from_dollars(50),
        quantity: 100,
        is_free: false,
    }]
}

/// A new free ticket type
#[must_use]
pub fn new_ticket(id: TicketTypeId) -> TicketType {
    TicketType {
        id,
        name: NEW_TICKET_NAME.to_string(),
        price: Money::ZERO,
        quantity: NEW_TICKET_QUANTITY,
        is_free: true,
    }
}

/// Merges `patch` into the ticket type with this id
///
/// # Errors
///
/// Returns a message naming the id when no ticket type has it.
pub fn update(
    tickets: &mut [TicketType],
    id: &TicketTypeId,
    patch: &TicketTypePatch,
) -> Result<(), String> {
    let ticket = tickets
        .iter_mut()
        .find(|t| &t.id == id)
        .ok_or_else(|| format!("Ticket type {id} not found"))?;
    patch.apply_to(ticket);
    Ok(())
}

/// Removes the ticket type with this id; the list may become empty
///
/// # Errors
///
/// Returns a message naming the id when no ticket type has it.
pub fn remove(tickets: &mut Vec<TicketType>, id: &TicketTypeId) -> Result<(), String> {
    let before = tickets.len();
    tickets.retain(|t| &t.id != id);
    if tickets.len() == before {
        return Err(format!("Ticket type {id} not found"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_last_ticket_leaves_empty_list() {
        let mut tickets = starter_tickets();
        assert!(remove(&mut tickets, &TicketTypeId::new("1")).is_ok());
        assert!(tickets.is_empty());
        assert_eq!(
            remove(&mut tickets, &TicketTypeId::new("1")),
            Err("Ticket type 1 not found".to_string())
        );
    }

    #[test]
    fn test_update_unknown_ticket() {
        let mut tickets = starter_tickets();
        let result = update(
            &mut tickets,
            &TicketTypeId::new("9"),
            &TicketTypePatch::default(),
        );
        assert!(result.is_err());
    }
}
