use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event descriptor as handed in by the surrounding platform.
///
/// The queue service does not own event data; it only needs the identifier
/// to scope queries and the timezone to anchor deadline computation.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub short_name: String,
    pub timezone: Tz,
}

/// Lifecycle status of a waiting subscription.
///
/// WAITING -> ACQUIRED when the matched reservation is paid,
/// WAITING -> EXPIRED when it times out. Each subscription transitions
/// out of WAITING at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Waiting,
    Acquired,
    Expired,
}

/// Status of a ticket as far as queue distribution is concerned.
///
/// WAITING tickets were released back from a cancelled or timed-out
/// reservation and are the ones eligible for redistribution. Matching moves
/// them to PENDING; reverting (nobody queued) moves them back to FREE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Free,
    Waiting,
    Pending,
}

/// A subscriber queued for one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingSubscription {
    pub id: i64,
    #[serde(rename = "eventId")]
    pub event_id: i64,
    pub status: SubscriptionStatus,
    /// Set once the subscription has been matched to a ticket. A subscription
    /// with a reservation id is no longer part of the waiting pool even while
    /// its status is still WAITING.
    #[serde(rename = "reservationId", default)]
    pub reservation_id: Option<Uuid>,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    /// Queue join time; FIFO order is (created_on, id).
    #[serde(rename = "createdOn")]
    pub created_on: DateTime<Utc>,
}

impl WaitingSubscription {
    /// True while the subscription sits in the waiting pool unmatched.
    pub fn is_queued(&self) -> bool {
        self.status == SubscriptionStatus::Waiting && self.reservation_id.is_none()
    }
}

/// A ticket currently eligible for redistribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTicket {
    pub id: i64,
    #[serde(rename = "eventId")]
    pub event_id: i64,
    /// Bound category, if any. Unbound tickets are charged against the
    /// event's fallback unbounded category.
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<i64>,
    pub status: TicketStatus,
    #[serde(rename = "reservationId", default)]
    pub reservation_id: Option<Uuid>,
}

/// Ticket category, read-only to this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCategory {
    pub id: i64,
    #[serde(rename = "eventId")]
    pub event_id: i64,
    /// Not tied to a fixed ticket allocation; eligible as a fallback for
    /// unbound tickets.
    pub unbounded: bool,
    pub expiration: DateTime<Utc>,
}

/// Single-seat reservation request produced by matching. Handed to the
/// downstream reservation creator, never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDraft {
    #[serde(rename = "categoryId")]
    pub category_id: i64,
    pub quantity: u16,
}

impl ReservationDraft {
    pub fn single_seat(category_id: i64) -> Self {
        Self {
            category_id,
            quantity: 1,
        }
    }
}

/// One matched pairing out of a distribution run.
///
/// The order of `SeatMatch` values returned by the allocator is the FIFO
/// join order of the matched subscriptions and must be preserved by
/// consumers creating the actual reservations.
#[derive(Debug, Clone)]
pub struct SeatMatch {
    pub subscription: WaitingSubscription,
    /// Pre-assigned identifier the downstream consumer must create the
    /// reservation under; lifecycle callbacks are keyed by it.
    pub reservation_id: Uuid,
    pub draft: ReservationDraft,
    pub deadline: DateTime<Tz>,
}
