//! Foyer Queue - waiting-queue seat distribution for the Foyer ticketing platform
//!
//! When tickets for a sold-out event are released back from cancelled or
//! timed-out reservations, this service matches them to queued subscribers in
//! FIFO order, computes a working-day-aware confirmation deadline per batch,
//! and tracks the allocation lifecycle of every subscription.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{reservation_deadline, AllocationError, SeatAllocator, StatusTracker, WorkingDays};
pub use crate::models::{CandidateTicket, Event, ReservationDraft, SeatMatch, SubscriptionStatus, TicketCategory, TicketStatus, WaitingSubscription};
