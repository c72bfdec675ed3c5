use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CandidateTicket, SubscriptionStatus, TicketCategory, WaitingSubscription};

/// Errors surfaced by a queue storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(sqlx::Error),

    /// Failed to acquire the exclusive holds on tickets/subscriptions, or
    /// the serializable transaction got aborted. Retryable: re-running the
    /// invocation simply re-evaluates current counts.
    #[error("storage contention: {0}")]
    Contention(String),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// True for errors the caller may simply retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Contention(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // serialization_failure, deadlock_detected, lock_not_available
        let transient = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| matches!(code.as_ref(), "40001" | "40P01" | "55P03"))
            .unwrap_or(false);
        if transient {
            StoreError::Contention(err.to_string())
        } else {
            StoreError::Sqlx(err)
        }
    }
}

/// Storage backend for the waiting queue.
///
/// `begin_allocation` opens the single atomic unit of work one distribution
/// run lives in; everything the allocator reads or consumes goes through the
/// returned [`AllocationTx`]. The status operations are independent
/// single-statement updates keyed by reservation id and need no transaction
/// of their own.
#[async_trait]
pub trait QueueStore: Send + Sync {
    type Tx: AllocationTx;

    async fn begin_allocation(&self) -> Result<Self::Tx, StoreError>;

    /// Move the subscription matched under `reservation_id` out of WAITING.
    /// Returns the number of rows updated; 0 means the identifier is unknown
    /// or the subscription already left WAITING, which callers treat as a
    /// no-op.
    async fn update_subscription_status(
        &self,
        reservation_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<u64, StoreError>;

    /// Expire every still-WAITING subscription matched under any of the given
    /// reservation ids, in one atomic batch. Idempotent per identifier.
    async fn bulk_mark_expired(&self, reservation_ids: &[Uuid]) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Transaction-scoped view of the queue used by one distribution run.
///
/// All reads see a consistent snapshot and all row selections hold exclusive
/// locks until `commit`/`rollback`, so two concurrent runs can never consume
/// the same ticket or subscription. Dropping an uncommitted transaction
/// rolls it back.
#[async_trait]
pub trait AllocationTx: Send {
    /// Subscriptions in WAITING status not yet matched to a reservation.
    async fn count_waiting_subscriptions(&mut self, event_id: i64) -> Result<i64, StoreError>;

    /// Tickets in WAITING status (released back from prior reservations).
    async fn count_waiting_tickets(&mut self, event_id: i64) -> Result<i64, StoreError>;

    /// Nobody is queued: hand all WAITING tickets back to general sale.
    /// Returns the number of tickets reverted.
    async fn revert_waiting_tickets_to_free(&mut self, event_id: i64) -> Result<u64, StoreError>;

    /// Select up to `limit` WAITING tickets under exclusive row locks.
    /// Selection order is oldest row first (ascending id).
    async fn select_waiting_tickets_for_update(
        &mut self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<CandidateTicket>, StoreError>;

    /// Load up to `limit` unmatched WAITING subscriptions in queue-join
    /// order (created_on, then id), under exclusive row locks.
    async fn load_waiting_subscriptions_fifo(
        &mut self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<WaitingSubscription>, StoreError>;

    /// Unbounded categories of the event, latest expiration first.
    async fn unbounded_categories(&mut self, event_id: i64) -> Result<Vec<TicketCategory>, StoreError>;

    /// Consume one matched pairing: stamp the reservation id onto the
    /// subscription (removing it from the waiting pool) and move the ticket
    /// WAITING -> PENDING under the same id.
    async fn bind_reservation(
        &mut self,
        subscription_id: i64,
        ticket_id: i64,
        reservation_id: Uuid,
    ) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
