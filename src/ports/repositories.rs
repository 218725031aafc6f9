use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::order::Order;
use super::errors::StorageError;

// ============================================================================
// Aggregate Repositories
// ============================================================================
//
// Obtained from a UnitOfWork; every read runs inside its transaction.
// `add` and `update` stage the aggregate, the write happens on save_changes.
// Lists come back ordered by insertion time, then id.
//
// ============================================================================

#[async_trait]
pub trait CourierRepository: Send {
    async fn add(&mut self, courier: Courier) -> Result<(), StorageError>;

    async fn update(&mut self, courier: Courier) -> Result<(), StorageError>;

    async fn get(&mut self, id: Uuid) -> Result<Option<Courier>, StorageError>;

    /// Couriers whose storage places are all empty
    async fn get_all_free(&mut self) -> Result<Vec<Courier>, StorageError>;

    /// Couriers with at least one occupied storage place
    async fn get_all_busy(&mut self) -> Result<Vec<Courier>, StorageError>;
}

#[async_trait]
pub trait OrderRepository: Send {
    async fn add(&mut self, order: Order) -> Result<(), StorageError>;

    async fn update(&mut self, order: Order) -> Result<(), StorageError>;

    async fn get(&mut self, id: Uuid) -> Result<Option<Order>, StorageError>;

    /// Oldest order still waiting for a courier
    async fn get_first_in_created_status(&mut self) -> Result<Option<Order>, StorageError>;

    async fn get_all_in_assigned_status(&mut self) -> Result<Vec<Order>, StorageError>;
}
