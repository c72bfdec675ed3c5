use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request to run seat distribution for one event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DistributeRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "event_id", rename = "eventId")]
    pub event_id: i64,
    #[validate(length(min = 1))]
    #[serde(alias = "event_name", rename = "eventName")]
    pub event_name: String,
    /// IANA timezone name of the event, e.g. "Europe/Zurich"
    #[validate(length(min = 1))]
    #[serde(alias = "time_zone", rename = "timezone")]
    pub timezone: String,
}

/// Reservation lifecycle callback (confirmed / expired)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationEventRequest {
    #[serde(alias = "reservation_id", rename = "reservationId")]
    pub reservation_id: Uuid,
}

/// Batch of timed-out reservation ids from the periodic sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRequest {
    #[serde(default)]
    #[serde(alias = "reservation_ids", rename = "reservationIds")]
    pub reservation_ids: Vec<Uuid>,
}
