// ============================================================================
// In-Memory Adapter - local runs and tests
// ============================================================================

mod store;
mod unit_of_work;

pub use store::MemoryStore;
pub use unit_of_work::MemoryUnitOfWork;
