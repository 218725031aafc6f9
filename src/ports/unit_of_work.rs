use async_trait::async_trait;

use crate::utils::CancellationToken;
use super::errors::StorageError;
use super::repositories::{CourierRepository, OrderRepository};

/// One storage transaction spanning a use case's read-modify-write.
///
/// `save_changes` drains the domain events of every staged aggregate into
/// outbox rows and commits them together with the aggregates. Dropping a unit
/// of work without saving rolls everything back.
#[async_trait]
pub trait UnitOfWork: Send {
    fn couriers(&mut self) -> &mut dyn CourierRepository;

    fn orders(&mut self) -> &mut dyn OrderRepository;

    /// Returns `Ok(false)` when cancellation was requested before the commit
    /// started; nothing is persisted in that case.
    async fn save_changes(&mut self, cancel: &CancellationToken) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StorageError>;
}
