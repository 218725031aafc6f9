use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::outbox::OutboxMessage;
use super::errors::StorageError;

/// Relay-side access to the outbox table
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Up to `limit` pending rows, oldest `occurred_at_utc` first
    async fn fetch_unprocessed(&self, limit: usize) -> Result<Vec<OutboxMessage>, StorageError>;

    /// Stamp rows as processed in one batch. Rows already processed keep their
    /// original timestamp. Returns the number of rows newly stamped.
    async fn mark_processed(&self, processed: &[(Uuid, DateTime<Utc>)]) -> Result<u64, StorageError>;
}
