use thiserror::Error;

use crate::models::{CandidateTicket, TicketCategory};

/// Unrecoverable configuration/data inconsistency: the event sells unbound
/// tickets but has no unbounded category to charge them against. Retrying
/// hits the same state; an operator has to fix the event setup.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("event {event_id} has no unbounded category to back unbound ticket {ticket_id}")]
pub struct NoUnboundedCategory {
    pub event_id: i64,
    pub ticket_id: i64,
}

/// Pick the fallback category for unbound tickets, once per distribution
/// run: among the event's unbounded categories, the one expiring last.
pub fn pick_unbounded_fallback(categories: &[TicketCategory]) -> Option<&TicketCategory> {
    categories.iter().max_by_key(|c| (c.expiration, c.id))
}

/// Resolve the category one matched seat is reserved in: the ticket's own
/// bound category if present, otherwise the pre-selected unbounded fallback.
pub fn resolve_category(
    ticket: &CandidateTicket,
    fallback: Option<&TicketCategory>,
) -> Result<i64, NoUnboundedCategory> {
    match ticket.category_id {
        Some(category_id) => Ok(category_id),
        None => fallback.map(|c| c.id).ok_or(NoUnboundedCategory {
            event_id: ticket.event_id,
            ticket_id: ticket.id,
        }),
    }
}
