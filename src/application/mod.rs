// ============================================================================
// Application Layer - use cases over the ports
// ============================================================================
//
// Each handler opens one unit of work, loads aggregates, applies domain
// operations and saves. Handlers hold no mutable state, so any of them can be
// rerun after a storage conflict.
//
// ============================================================================

pub mod commands;
pub mod errors;
pub mod event_dispatcher;
pub mod queries;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::*;
pub use errors::CommandError;
pub use event_dispatcher::OrderEventDispatcher;
pub use queries::{DeliveryQueryService, FleetSnapshot};
