// ============================================================================
// Ports - contracts the core depends on
// ============================================================================
//
// Implemented by adapters in src/infrastructure and src/messaging. The core
// never names a concrete storage or transport technology.
//
// ============================================================================

pub mod errors;
pub mod repositories;
pub mod unit_of_work;
pub mod outbox_store;
pub mod message_bus;
pub mod geo;
pub mod queries;

pub use errors::StorageError;
pub use repositories::{CourierRepository, OrderRepository};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
pub use outbox_store::OutboxStore;
pub use message_bus::MessageBusProducer;
pub use geo::GeoClient;
pub use queries::{CourierView, DeliveryQueries, OrderView};
