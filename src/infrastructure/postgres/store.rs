use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::outbox::OutboxMessage;
use crate::ports::{
    CourierView, DeliveryQueries, OrderView, OutboxStore, StorageError, UnitOfWork, UnitOfWorkFactory,
};
use super::rows::{location, BUSY_CONDITION};
use super::unit_of_work::PgUnitOfWork;

// ============================================================================
// Postgres Store - pool-level access
// ============================================================================

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StorageError> {
        Ok(Box::new(PgUnitOfWork::begin(&self.pool).await?))
    }
}

#[async_trait]
impl OutboxStore for PgStore {
    async fn fetch_unprocessed(&self, limit: usize) -> Result<Vec<OutboxMessage>, StorageError> {
        let rows: Vec<(Uuid, String, String, DateTime<Utc>, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT id, type, payload, occurred_at_utc, processed_at_utc
             FROM outbox_messages
             WHERE processed_at_utc IS NULL
             ORDER BY occurred_at_utc, id
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, event_type, payload, occurred_at_utc, processed_at_utc)| OutboxMessage {
                id,
                event_type,
                payload,
                occurred_at_utc,
                processed_at_utc,
            })
            .collect())
    }

    async fn mark_processed(&self, processed: &[(Uuid, DateTime<Utc>)]) -> Result<u64, StorageError> {
        if processed.is_empty() {
            return Ok(0);
        }

        let (ids, stamps): (Vec<Uuid>, Vec<DateTime<Utc>>) = processed.iter().copied().unzip();
        let result = sqlx::query(
            "UPDATE outbox_messages o
             SET processed_at_utc = p.processed_at
             FROM UNNEST($1::uuid[], $2::timestamptz[]) AS p(id, processed_at)
             WHERE o.id = p.id AND o.processed_at_utc IS NULL",
        )
        .bind(&ids[..])
        .bind(&stamps[..])
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

impl PgStore {
    async fn courier_views(&self, busy_only: bool) -> Result<Vec<CourierView>, StorageError> {
        let rows: Vec<(Uuid, String, i32, i32)> = sqlx::query_as(&format!(
            "SELECT c.id, c.name, c.location_x, c.location_y
             FROM couriers c
             WHERE NOT $1 OR {BUSY_CONDITION}
             ORDER BY c.created_at, c.id"
        ))
        .bind(busy_only)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, name, x, y)| Ok(CourierView { id, name, location: location("courier", x, y)? }))
            .collect()
    }
}

#[async_trait]
impl DeliveryQueries for PgStore {
    async fn all_couriers(&self) -> Result<Vec<CourierView>, StorageError> {
        self.courier_views(false).await
    }

    async fn busy_couriers(&self) -> Result<Vec<CourierView>, StorageError> {
        self.courier_views(true).await
    }

    async fn created_and_assigned_orders(&self) -> Result<Vec<OrderView>, StorageError> {
        let rows: Vec<(Uuid, i32, i32)> = sqlx::query_as(
            "SELECT id, location_x, location_y
             FROM orders
             WHERE status IN ('Created', 'Assigned')
             ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, x, y)| Ok(OrderView { id, location: location("order", x, y)? }))
            .collect()
    }
}
