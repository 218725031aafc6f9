use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::ports::{OutboxStore, StorageError};
use crate::utils::CancellationToken;
use super::core::{deserialize_event, DomainEvent};

// ============================================================================
// Outbox Relay - pending rows to the event publisher
// ============================================================================
//
// One pass:
// 1. Fetch up to `batch_size` pending rows, oldest first
// 2. Deserialize and publish each one in order
// 3. Stamp every successfully published row in one batch
//
// Rows that fail to publish or cannot be decoded stay pending and are retried
// on the next pass. Delivery is at-least-once; consumers dedupe on event id.
//
// ============================================================================

/// In-process handler for decoded outbox events
#[async_trait]
pub trait DomainEventPublisher<E: DomainEvent>: Send + Sync {
    async fn publish(&self, event: &E, cancel: &CancellationToken) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayReport {
    pub fetched: usize,
    pub published: usize,
    pub failed: usize,
    pub undecodable: usize,
}

impl RelayReport {
    pub fn is_idle(&self) -> bool {
        self.fetched == 0
    }
}

pub struct OutboxRelay<E: DomainEvent> {
    store: Arc<dyn OutboxStore>,
    publisher: Arc<dyn DomainEventPublisher<E>>,
    batch_size: usize,
}

impl<E: DomainEvent> OutboxRelay<E> {
    pub fn new(
        store: Arc<dyn OutboxStore>,
        publisher: Arc<dyn DomainEventPublisher<E>>,
        batch_size: usize,
    ) -> Self {
        Self { store, publisher, batch_size }
    }

    pub async fn process(&self, cancel: &CancellationToken) -> Result<RelayReport, StorageError> {
        let mut report = RelayReport::default();
        if cancel.is_cancelled() {
            return Ok(report);
        }

        let messages = self.store.fetch_unprocessed(self.batch_size).await?;
        report.fetched = messages.len();
        if messages.is_empty() {
            return Ok(report);
        }

        tracing::info!(message_count = messages.len(), "📬 Fetched pending outbox messages");

        let mut processed = Vec::with_capacity(messages.len());
        for message in &messages {
            if cancel.is_cancelled() {
                tracing::info!("Outbox pass cancelled, stamping what was already published");
                break;
            }

            let event: E = match deserialize_event(&message.payload) {
                Ok(event) => event,
                Err(e) => {
                    report.undecodable += 1;
                    tracing::error!(
                        message_id = %message.id,
                        event_type = %message.event_type,
                        error = %e,
                        "Outbox payload could not be decoded, leaving it pending"
                    );
                    continue;
                }
            };

            match self.publisher.publish(&event, cancel).await {
                Ok(()) => {
                    report.published += 1;
                    processed.push((message.id, Utc::now()));
                    tracing::debug!(
                        message_id = %message.id,
                        event_type = %message.event_type,
                        "✅ Published outbox message"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        message_id = %message.id,
                        event_type = %message.event_type,
                        error = %e,
                        "Failed to publish outbox message, will retry next pass"
                    );
                }
            }
        }

        if !processed.is_empty() {
            let stamped = self.store.mark_processed(&processed).await?;
            tracing::info!(stamped, published = report.published, "Outbox messages marked processed");
        }

        Ok(report)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
