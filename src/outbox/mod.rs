// ============================================================================
// Transactional Outbox
// ============================================================================
//
// Write side: aggregates queue events, the recorder turns them into rows that
// commit with the state change. Read side: the relay publishes pending rows
// and stamps them processed.
//
// ============================================================================

pub mod core;
pub mod message;
pub mod recorder;
pub mod relay;

pub use message::OutboxMessage;
pub use recorder::OutboxRecorder;
pub use relay::{DomainEventPublisher, OutboxRelay, RelayReport};
