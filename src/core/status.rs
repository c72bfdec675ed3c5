use std::sync::Arc;
use uuid::Uuid;

use crate::models::SubscriptionStatus;
use crate::services::store::{QueueStore, StoreError};

/// Tracks the allocation lifecycle of matched subscriptions.
///
/// All operations are keyed by the reservation identifier stamped onto the
/// subscription at match time, because that is the handle downstream
/// reservation events carry. Unknown identifiers are logged no-ops: the
/// periodic sweep is expected to race manual cleanup.
pub struct StatusTracker<S> {
    store: Arc<S>,
}

impl<S> Clone for StatusTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: QueueStore> StatusTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The matched reservation's purchase completed.
    pub async fn mark_acquired(&self, reservation_id: Uuid) -> Result<u64, StoreError> {
        self.update(reservation_id, SubscriptionStatus::Acquired).await
    }

    /// The matched reservation timed out without completing.
    pub async fn mark_expired(&self, reservation_id: Uuid) -> Result<u64, StoreError> {
        self.update(reservation_id, SubscriptionStatus::Expired).await
    }

    /// Expire every subscription matched to any of the given reservations in
    /// one atomic batch. Empty input and duplicate or unknown identifiers
    /// are fine; the operation is idempotent per identifier.
    pub async fn bulk_expire(&self, reservation_ids: &[Uuid]) -> Result<u64, StoreError> {
        if reservation_ids.is_empty() {
            return Ok(0);
        }

        let expired = self.store.bulk_mark_expired(reservation_ids).await?;
        tracing::debug!(
            "expired {} of {} swept reservations",
            expired,
            reservation_ids.len()
        );
        Ok(expired)
    }

    async fn update(
        &self,
        reservation_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<u64, StoreError> {
        let updated = self.store.update_subscription_status(reservation_id, status).await?;
        if updated == 0 {
            tracing::debug!(
                "no waiting subscription matched to reservation {}, nothing to update",
                reservation_id
            );
        }
        Ok(updated)
    }
}
