use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{settings_keys, ConfigProvider, DEFAULT_RESERVATION_TIMEOUT_HOURS};
use crate::core::category::{pick_unbounded_fallback, resolve_category, NoUnboundedCategory};
use crate::core::expiration::{reservation_deadline, WorkingDays};
use crate::models::{Event, ReservationDraft, SeatMatch};
use crate::services::store::{AllocationTx, QueueStore, StoreError};

/// Failure of one distribution run. The run is all-or-nothing: on any error
/// the transaction is rolled back and no pairing is produced.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Fatal event misconfiguration; alert an operator instead of retrying.
    #[error(transparent)]
    NoUnboundedCategory(#[from] NoUnboundedCategory),

    /// Ticket selection and subscription load disagreed on batch size.
    #[error("selected {tickets} tickets but loaded {subscriptions} subscriptions")]
    BatchSizeMismatch { tickets: usize, subscriptions: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AllocationError {
    /// True when the caller may simply retry the invocation later.
    pub fn is_transient(&self) -> bool {
        matches!(self, AllocationError::Store(e) if e.is_transient())
    }
}

/// The matching engine.
///
/// One `distribute_seats` call reads the live waiting/ticket counts for an
/// event inside a single exclusive transaction and either reverts orphaned
/// tickets, matches subscribers to tickets FIFO, or does nothing.
pub struct SeatAllocator<S, C> {
    store: Arc<S>,
    config: Arc<C>,
    working_days: WorkingDays,
}

impl<S, C> Clone for SeatAllocator<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            working_days: self.working_days.clone(),
        }
    }
}

impl<S, C> SeatAllocator<S, C>
where
    S: QueueStore,
    C: ConfigProvider,
{
    pub fn new(store: Arc<S>, config: Arc<C>, working_days: WorkingDays) -> Self {
        Self {
            store,
            config,
            working_days,
        }
    }

    /// Distribute released tickets to waiting subscribers for one event.
    ///
    /// Returns the matched pairings in FIFO subscriber order; consumers must
    /// create the actual reservations in that order.
    pub async fn distribute_seats(&self, event: &Event) -> Result<Vec<SeatMatch>, AllocationError> {
        let now = Utc::now().with_timezone(&event.timezone);
        self.distribute_seats_at(event, now).await
    }

    /// Same as [`distribute_seats`](Self::distribute_seats) with an explicit
    /// clock, so deadline computation stays deterministic under test.
    pub async fn distribute_seats_at(
        &self,
        event: &Event,
        now: DateTime<Tz>,
    ) -> Result<Vec<SeatMatch>, AllocationError> {
        let mut tx = self.store.begin_allocation().await?;

        let waiting = tx.count_waiting_subscriptions(event.id).await?;
        let free = tx.count_waiting_tickets(event.id).await?;

        if waiting == 0 && free > 0 {
            // Nobody queued: the released tickets go back to general sale.
            let reverted = tx.revert_waiting_tickets_to_free(event.id).await?;
            tx.commit().await?;
            tracing::info!(
                "no subscribers queued for event {}, reverted {} tickets to free",
                event.short_name,
                reverted
            );
            return Ok(Vec::new());
        }

        if waiting == 0 || free == 0 {
            tx.rollback().await?;
            return Ok(Vec::new());
        }

        let seats = waiting.min(free);
        tracing::debug!("processing {} subscribers from waiting queue", seats);

        let tickets = tx.select_waiting_tickets_for_update(event.id, seats).await?;
        let subscriptions = tx.load_waiting_subscriptions_fifo(event.id, seats).await?;

        if tickets.len() != subscriptions.len() {
            let mismatch = AllocationError::BatchSizeMismatch {
                tickets: tickets.len(),
                subscriptions: subscriptions.len(),
            };
            tx.rollback().await?;
            return Err(mismatch);
        }

        let categories = tx.unbounded_categories(event.id).await?;
        let fallback = pick_unbounded_fallback(&categories);

        let timeout_hours = self.config.int_setting(
            event.id,
            settings_keys::RESERVATION_TIMEOUT_HOURS,
            DEFAULT_RESERVATION_TIMEOUT_HOURS,
        );
        // One shared deadline per run, not per pairing
        let deadline = reservation_deadline(now, timeout_hours, &self.working_days);

        let mut matches = Vec::with_capacity(subscriptions.len());
        for (subscription, ticket) in subscriptions.into_iter().zip(tickets.into_iter()) {
            let category_id = match resolve_category(&ticket, fallback) {
                Ok(category_id) => category_id,
                Err(err) => {
                    tx.rollback().await?;
                    return Err(err.into());
                }
            };

            let reservation_id = Uuid::new_v4();
            tx.bind_reservation(subscription.id, ticket.id, reservation_id)
                .await?;

            matches.push(SeatMatch {
                subscription,
                reservation_id,
                draft: ReservationDraft::single_seat(category_id),
                deadline: deadline.clone(),
            });
        }

        tx.commit().await?;

        tracing::info!(
            "matched {} subscribers to released tickets for event {}",
            matches.len(),
            event.short_name
        );

        Ok(matches)
    }
}
