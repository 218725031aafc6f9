use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::errors::DomainError;
use crate::domain::shared_kernel::Location;
use crate::outbox::core::AggregateRoot;
use super::events::{OrderCompleted, OrderEvent};
use super::value_objects::OrderStatus;

// ============================================================================
// Order Aggregate
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: Uuid,
    location: Location,
    volume: i32,
    status: OrderStatus,
    courier_id: Option<Uuid>,

    version: i64,
    events: Vec<OrderEvent>,
}

impl Order {
    /// New order in `Created` status; `id` is supplied by the caller
    pub fn create(id: Uuid, location: Location, volume: i32) -> Result<Self, DomainError> {
        if id.is_nil() {
            return Err(DomainError::MissingValue("order_id"));
        }
        if volume <= 0 {
            return Err(DomainError::MissingValue("volume"));
        }

        Ok(Self {
            id,
            location,
            volume,
            status: OrderStatus::Created,
            courier_id: None,
            version: 0,
            events: Vec::new(),
        })
    }

    /// Rebuild from persisted state; restored orders carry no pending events
    pub(crate) fn restore(
        id: Uuid,
        location: Location,
        volume: i32,
        status: OrderStatus,
        courier_id: Option<Uuid>,
        version: i64,
    ) -> Self {
        Self {
            id,
            location,
            volume,
            status,
            courier_id,
            version,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn courier_id(&self) -> Option<Uuid> {
        self.courier_id
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    pub fn assign(&mut self, courier: &Courier) -> Result<(), DomainError> {
        if self.status != OrderStatus::Created {
            return Err(DomainError::AlreadyAssigned);
        }

        self.courier_id = Some(courier.id());
        self.status = OrderStatus::Assigned;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Assigned || self.courier_id.is_none() {
            return Err(DomainError::NotAssigned);
        }

        self.status = OrderStatus::Completed;
        self.events.push(OrderEvent::Completed(OrderCompleted::new(
            self.id,
            self.status.as_str(),
        )));
        Ok(())
    }
}

impl AggregateRoot for Order {
    type Event = OrderEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn domain_events(&self) -> &[OrderEvent] {
        &self.events
    }

    fn clear_domain_events(&mut self) {
        self.events.clear();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
