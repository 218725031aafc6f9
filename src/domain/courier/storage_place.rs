use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

// ============================================================================
// Storage Place - single-slot capacity unit owned by a courier
// ============================================================================

pub const DEFAULT_BAG_NAME: &str = "Bag";
pub const DEFAULT_BAG_VOLUME: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoragePlace {
    id: Uuid,
    name: String,
    total_volume: i32,
    order_id: Option<Uuid>,
}

impl StoragePlace {
    pub fn create(name: &str, volume: i32) -> Result<Self, DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidValue("name"));
        }
        if volume <= 0 {
            return Err(DomainError::InvalidValue("volume"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            total_volume: volume,
            order_id: None,
        })
    }

    /// The bag every courier starts with
    pub fn bag() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_BAG_NAME.to_string(),
            total_volume: DEFAULT_BAG_VOLUME,
            order_id: None,
        }
    }

    /// Rebuild from persisted state without re-running creation rules
    pub(crate) fn restore(id: Uuid, name: String, total_volume: i32, order_id: Option<Uuid>) -> Self {
        Self { id, name, total_volume, order_id }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_volume(&self) -> i32 {
        self.total_volume
    }

    pub fn order_id(&self) -> Option<Uuid> {
        self.order_id
    }

    pub fn is_occupied(&self) -> bool {
        self.order_id.is_some()
    }

    pub fn can_store(&self, volume: i32) -> Result<bool, DomainError> {
        if volume <= 0 {
            return Err(DomainError::InvalidValue("volume"));
        }

        Ok(!self.is_occupied() && volume <= self.total_volume)
    }

    pub fn store(&mut self, order_id: Uuid, volume: i32) -> Result<(), DomainError> {
        if !self.can_store(volume)? {
            return Err(DomainError::OccupiedOrTooSmall);
        }

        self.order_id = Some(order_id);
        Ok(())
    }

    pub fn clear(&mut self, order_id: Uuid) -> Result<(), DomainError> {
        match self.order_id {
            None => Err(DomainError::Empty),
            Some(held) if held != order_id => Err(DomainError::HoldsDifferentOrder {
                held,
                requested: order_id,
            }),
            Some(_) => {
                self.order_id = None;
                Ok(())
            }
        }
    }
}
