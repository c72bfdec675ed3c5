// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidateTicket, Event, ReservationDraft, SeatMatch, SubscriptionStatus, TicketCategory, TicketStatus, WaitingSubscription};
pub use requests::{DistributeRequest, ReservationEventRequest, SweepRequest};
pub use responses::{DistributeResponse, ErrorResponse, HealthResponse, ReservationEventResponse, SeatMatchView, SweepResponse};
