use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::outbox::core::DomainEvent;

// ============================================================================
// Order Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Completed(OrderCompleted),
}

/// Raised when the courier reaches the order's destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCompleted {
    pub event_id: Uuid,
    pub order_id: Uuid,
    pub status_name: String,
    pub occurred_at: DateTime<Utc>,
}

impl OrderCompleted {
    pub fn new(order_id: Uuid, status_name: &str) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            order_id,
            status_name: status_name.to_string(),
            occurred_at: Utc::now(),
        }
    }
}

impl DomainEvent for OrderEvent {
    fn event_id(&self) -> Uuid {
        match self {
            OrderEvent::Completed(e) => e.event_id,
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Completed(_) => "OrderCompleted",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::Completed(e) => e.occurred_at,
        }
    }
}
