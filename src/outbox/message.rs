use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::core::{serialize_event, DomainEvent};

// ============================================================================
// Outbox Message - one serialized domain event awaiting publication
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxMessage {
    /// Equal to the event's own id, so re-recording the same event is a no-op
    pub id: Uuid,
    pub event_type: String,
    pub payload: String,
    pub occurred_at_utc: DateTime<Utc>,
    pub processed_at_utc: Option<DateTime<Utc>>,
}

impl OutboxMessage {
    pub fn from_event<E: DomainEvent>(event: &E, now: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: event.event_id(),
            event_type: event.event_type().to_string(),
            payload: serialize_event(event)?,
            occurred_at_utc: now,
            processed_at_utc: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.processed_at_utc.is_none()
    }
}
