use uuid::Uuid;

use super::event::DomainEvent;

// ============================================================================
// Aggregate Root - per-aggregate domain event queue
// ============================================================================
//
// Aggregates append immutable events to their own buffer while they mutate.
// Nothing is published from inside the aggregate: the unit of work drains the
// buffer into outbox rows in the same transaction as the state change.
//
// ============================================================================

pub trait AggregateRoot: Send + Sync {
    type Event: DomainEvent;

    fn aggregate_id(&self) -> Uuid;

    /// Events raised since the last drain, oldest first
    fn domain_events(&self) -> &[Self::Event];

    fn clear_domain_events(&mut self);
}
