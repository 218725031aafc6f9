// ============================================================================
// Outbox Core - aggregate and event abstractions
// ============================================================================
//
// No delivery-specific types live here; the Order aggregate implements these
// traits from the domain layer.
//
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::AggregateRoot;
pub use event::{deserialize_event, serialize_event, DomainEvent};
