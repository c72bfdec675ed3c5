use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::{CandidateTicket, SubscriptionStatus, TicketCategory, TicketStatus, WaitingSubscription};
use crate::services::store::{AllocationTx, QueueStore, StoreError};

/// Plain in-process queue state
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub subscriptions: Vec<WaitingSubscription>,
    pub tickets: Vec<CandidateTicket>,
    pub categories: Vec<TicketCategory>,
}

/// In-memory implementation of the queue store.
///
/// A single `tokio::sync::Mutex` serializes allocation transactions, which
/// models the exclusive row holds of the Postgres backend: a second
/// `begin_allocation` blocks until the first run commits or rolls back.
/// Transactions mutate a working copy and write it back on commit, so a
/// dropped transaction leaves the shared state untouched.
///
/// Used by the test suite and the concurrency exclusion harness; not meant
/// for production traffic.
pub struct MemoryQueueStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryQueueStore {
    pub fn new(state: MemoryState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Copy of the current committed state, for assertions
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    type Tx = MemoryAllocationTx;

    async fn begin_allocation(&self) -> Result<MemoryAllocationTx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryAllocationTx { guard, working })
    }

    async fn update_subscription_status(
        &self,
        reservation_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let mut updated = 0;
        for subscription in state
            .subscriptions
            .iter_mut()
            .filter(|s| s.reservation_id == Some(reservation_id) && s.status == SubscriptionStatus::Waiting)
        {
            subscription.status = status;
            updated += 1;
        }
        Ok(updated)
    }

    async fn bulk_mark_expired(&self, reservation_ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let mut updated = 0;
        for subscription in state.subscriptions.iter_mut().filter(|s| {
            s.status == SubscriptionStatus::Waiting
                && s.reservation_id.map(|id| reservation_ids.contains(&id)).unwrap_or(false)
        }) {
            subscription.status = SubscriptionStatus::Expired;
            updated += 1;
        }
        Ok(updated)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Allocation transaction over a working copy of the shared state
pub struct MemoryAllocationTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl AllocationTx for MemoryAllocationTx {
    async fn count_waiting_subscriptions(&mut self, event_id: i64) -> Result<i64, StoreError> {
        Ok(self
            .working
            .subscriptions
            .iter()
            .filter(|s| s.event_id == event_id && s.is_queued())
            .count() as i64)
    }

    async fn count_waiting_tickets(&mut self, event_id: i64) -> Result<i64, StoreError> {
        Ok(self
            .working
            .tickets
            .iter()
            .filter(|t| t.event_id == event_id && t.status == TicketStatus::Waiting)
            .count() as i64)
    }

    async fn revert_waiting_tickets_to_free(&mut self, event_id: i64) -> Result<u64, StoreError> {
        let mut reverted = 0;
        for ticket in self
            .working
            .tickets
            .iter_mut()
            .filter(|t| t.event_id == event_id && t.status == TicketStatus::Waiting)
        {
            ticket.status = TicketStatus::Free;
            reverted += 1;
        }
        Ok(reverted)
    }

    async fn select_waiting_tickets_for_update(
        &mut self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<CandidateTicket>, StoreError> {
        let mut rows: Vec<CandidateTicket> = self
            .working
            .tickets
            .iter()
            .filter(|t| t.event_id == event_id && t.status == TicketStatus::Waiting)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.id);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn load_waiting_subscriptions_fifo(
        &mut self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<WaitingSubscription>, StoreError> {
        let mut rows: Vec<WaitingSubscription> = self
            .working
            .subscriptions
            .iter()
            .filter(|s| s.event_id == event_id && s.is_queued())
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.created_on, s.id));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn unbounded_categories(&mut self, event_id: i64) -> Result<Vec<TicketCategory>, StoreError> {
        let mut rows: Vec<TicketCategory> = self
            .working
            .categories
            .iter()
            .filter(|c| c.event_id == event_id && c.unbounded)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.expiration.cmp(&a.expiration));
        Ok(rows)
    }

    async fn bind_reservation(
        &mut self,
        subscription_id: i64,
        ticket_id: i64,
        reservation_id: Uuid,
    ) -> Result<(), StoreError> {
        if let Some(subscription) = self
            .working
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription_id)
        {
            subscription.reservation_id = Some(reservation_id);
        }
        if let Some(ticket) = self.working.tickets.iter_mut().find(|t| t.id == ticket_id) {
            ticket.status = TicketStatus::Pending;
            ticket.reservation_id = Some(reservation_id);
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let MemoryAllocationTx { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
