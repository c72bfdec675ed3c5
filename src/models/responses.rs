use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::SeatMatch;

/// One matched pairing as returned over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatMatchView {
    #[serde(rename = "subscriptionId")]
    pub subscription_id: i64,
    #[serde(rename = "reservationId")]
    pub reservation_id: Uuid,
    #[serde(rename = "categoryId")]
    pub category_id: i64,
    pub quantity: u16,
    pub deadline: DateTime<FixedOffset>,
}

impl From<SeatMatch> for SeatMatchView {
    fn from(m: SeatMatch) -> Self {
        Self {
            subscription_id: m.subscription.id,
            reservation_id: m.reservation_id,
            category_id: m.draft.category_id,
            quantity: m.draft.quantity,
            deadline: m.deadline.fixed_offset(),
        }
    }
}

/// Response for the distribute endpoint. Matches are in FIFO subscriber
/// order and the consumer must create reservations in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributeResponse {
    #[serde(rename = "eventId")]
    pub event_id: i64,
    pub matches: Vec<SeatMatchView>,
    pub count: usize,
}

/// Response for lifecycle callbacks (confirmed / expired)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationEventResponse {
    pub success: bool,
    pub updated: u64,
}

/// Response for the expired-reservation sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    pub expired: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
