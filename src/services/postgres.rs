use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{CandidateTicket, SubscriptionStatus, TicketCategory, WaitingSubscription};
use crate::services::store::{AllocationTx, QueueStore, StoreError};

/// PostgreSQL implementation of the queue store.
///
/// Each distribution run gets a serializable transaction; ticket and
/// subscription rows are selected `FOR UPDATE` inside it, so concurrent runs
/// against the same event either wait or fail with a retryable contention
/// error instead of double-allocating.
pub struct PgQueueStore {
    pool: PgPool,
}

impl PgQueueStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL with URL: {}", url);

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }
}

#[async_trait]
impl QueueStore for PgQueueStore {
    type Tx = PgAllocationTx;

    async fn begin_allocation(&self) -> Result<PgAllocationTx, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        Ok(PgAllocationTx { tx })
    }

    async fn update_subscription_status(
        &self,
        reservation_id: Uuid,
        status: SubscriptionStatus,
    ) -> Result<u64, StoreError> {
        let query = r#"
            UPDATE waiting_subscription
            SET status = $2
            WHERE reservation_id = $1 AND status = 'WAITING'
        "#;

        let result = sqlx::query(query)
            .bind(reservation_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn bulk_mark_expired(&self, reservation_ids: &[Uuid]) -> Result<u64, StoreError> {
        let query = r#"
            UPDATE waiting_subscription
            SET status = 'EXPIRED'
            WHERE reservation_id = ANY($1) AND status = 'WAITING'
        "#;

        let result = sqlx::query(query)
            .bind(reservation_ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// One allocation unit of work on top of a Postgres transaction
pub struct PgAllocationTx {
    tx: Transaction<'static, Postgres>,
}

fn ticket_from_row(row: &PgRow) -> CandidateTicket {
    CandidateTicket {
        id: row.get("id"),
        event_id: row.get("event_id"),
        category_id: row.get("category_id"),
        status: row.get("status"),
        reservation_id: row.get("reservation_id"),
    }
}

fn subscription_from_row(row: &PgRow) -> WaitingSubscription {
    WaitingSubscription {
        id: row.get("id"),
        event_id: row.get("event_id"),
        status: row.get("status"),
        reservation_id: row.get("reservation_id"),
        email_address: row.get("email_address"),
        display_name: row.get("display_name"),
        created_on: row.get("created_on"),
    }
}

#[async_trait]
impl AllocationTx for PgAllocationTx {
    async fn count_waiting_subscriptions(&mut self, event_id: i64) -> Result<i64, StoreError> {
        let query = r#"
            SELECT COUNT(*) AS waiting
            FROM waiting_subscription
            WHERE event_id = $1 AND status = 'WAITING' AND reservation_id IS NULL
        "#;

        let row = sqlx::query(query)
            .bind(event_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(row.get("waiting"))
    }

    async fn count_waiting_tickets(&mut self, event_id: i64) -> Result<i64, StoreError> {
        let query = r#"
            SELECT COUNT(*) AS waiting
            FROM ticket
            WHERE event_id = $1 AND status = 'WAITING'
        "#;

        let row = sqlx::query(query)
            .bind(event_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(row.get("waiting"))
    }

    async fn revert_waiting_tickets_to_free(&mut self, event_id: i64) -> Result<u64, StoreError> {
        let query = r#"
            UPDATE ticket
            SET status = 'FREE'
            WHERE event_id = $1 AND status = 'WAITING'
        "#;

        let result = sqlx::query(query)
            .bind(event_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn select_waiting_tickets_for_update(
        &mut self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<CandidateTicket>, StoreError> {
        let query = r#"
            SELECT id, event_id, category_id, status, reservation_id
            FROM ticket
            WHERE event_id = $1 AND status = 'WAITING'
            ORDER BY id
            LIMIT $2
            FOR UPDATE
        "#;

        let rows = sqlx::query(query)
            .bind(event_id)
            .bind(limit)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows.iter().map(ticket_from_row).collect())
    }

    async fn load_waiting_subscriptions_fifo(
        &mut self,
        event_id: i64,
        limit: i64,
    ) -> Result<Vec<WaitingSubscription>, StoreError> {
        let query = r#"
            SELECT id, event_id, status, reservation_id, email_address, display_name, created_on
            FROM waiting_subscription
            WHERE event_id = $1 AND status = 'WAITING' AND reservation_id IS NULL
            ORDER BY created_on, id
            LIMIT $2
            FOR UPDATE
        "#;

        let rows = sqlx::query(query)
            .bind(event_id)
            .bind(limit)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows.iter().map(subscription_from_row).collect())
    }

    async fn unbounded_categories(&mut self, event_id: i64) -> Result<Vec<TicketCategory>, StoreError> {
        let query = r#"
            SELECT id, event_id, unbounded, expiration
            FROM ticket_category
            WHERE event_id = $1 AND unbounded
            ORDER BY expiration DESC
        "#;

        let rows = sqlx::query(query)
            .bind(event_id)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows
            .iter()
            .map(|row| TicketCategory {
                id: row.get("id"),
                event_id: row.get("event_id"),
                unbounded: row.get("unbounded"),
                expiration: row.get("expiration"),
            })
            .collect())
    }

    async fn bind_reservation(
        &mut self,
        subscription_id: i64,
        ticket_id: i64,
        reservation_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE waiting_subscription SET reservation_id = $2 WHERE id = $1")
            .bind(subscription_id)
            .bind(reservation_id)
            .execute(&mut *self.tx)
            .await?;

        sqlx::query("UPDATE ticket SET status = 'PENDING', reservation_id = $2 WHERE id = $1")
            .bind(ticket_id)
            .bind(reservation_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(Into::into)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(Into::into)
    }
}
