// ============================================================================
// Infrastructure - storage and geo adapters
// ============================================================================

pub mod geo;
pub mod memory;
pub mod postgres;
pub(crate) mod staging;

pub use geo::RandomGeoClient;
pub use memory::MemoryStore;
pub use postgres::PgStore;
