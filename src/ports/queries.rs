use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::shared_kernel::Location;
use super::errors::StorageError;

// ============================================================================
// Read Models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourierView {
    pub id: Uuid,
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub location: Location,
}

/// Read-only projections, served outside any unit of work
#[async_trait]
pub trait DeliveryQueries: Send + Sync {
    async fn all_couriers(&self) -> Result<Vec<CourierView>, StorageError>;

    async fn busy_couriers(&self) -> Result<Vec<CourierView>, StorageError>;

    async fn created_and_assigned_orders(&self) -> Result<Vec<OrderView>, StorageError>;
}
