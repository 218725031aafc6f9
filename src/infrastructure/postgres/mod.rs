// ============================================================================
// Postgres Adapter (sqlx)
// ============================================================================

mod rows;
mod schema;
mod store;
mod unit_of_work;
#[cfg(test)]
mod testing;

pub use schema::{create_pool, init_schema};
pub use store::PgStore;
pub use unit_of_work::PgUnitOfWork;
