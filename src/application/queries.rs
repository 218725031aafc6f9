use serde::Serialize;
use std::sync::Arc;

use crate::ports::{CourierView, DeliveryQueries, OrderView, StorageError};

/// Counts published as gauges on every snapshot
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetSnapshot {
    pub couriers: usize,
    pub busy_couriers: usize,
    pub open_orders: usize,
}

pub struct DeliveryQueryService {
    queries: Arc<dyn DeliveryQueries>,
}

impl DeliveryQueryService {
    pub fn new(queries: Arc<dyn DeliveryQueries>) -> Self {
        Self { queries }
    }

    pub async fn all_couriers(&self) -> Result<Vec<CourierView>, StorageError> {
        self.queries.all_couriers().await
    }

    pub async fn busy_couriers(&self) -> Result<Vec<CourierView>, StorageError> {
        self.queries.busy_couriers().await
    }

    /// Orders still waiting for a courier or on their way
    pub async fn open_orders(&self) -> Result<Vec<OrderView>, StorageError> {
        self.queries.created_and_assigned_orders().await
    }

    pub async fn snapshot(&self) -> Result<FleetSnapshot, StorageError> {
        Ok(FleetSnapshot {
            couriers: self.all_couriers().await?.len(),
            busy_couriers: self.busy_couriers().await?.len(),
            open_orders: self.open_orders().await?.len(),
        })
    }
}
