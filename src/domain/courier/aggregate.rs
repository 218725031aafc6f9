use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::shared_kernel::Location;
use super::storage_place::StoragePlace;

// ============================================================================
// Courier Aggregate
// ============================================================================
//
// Owns its storage places exclusively. A courier is free when every place is
// empty and busy as soon as one holds an order.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Courier {
    id: Uuid,
    name: String,
    speed: i32,
    location: Location,
    storage_places: Vec<StoragePlace>,

    // Optimistic concurrency marker, maintained by persistence
    version: i64,
}

impl Courier {
    pub fn create(name: &str, speed: i32, location: Location) -> Result<Self, DomainError> {
        if name.is_empty() {
            return Err(DomainError::MissingValue("name"));
        }
        if speed <= 0 {
            return Err(DomainError::InvalidValue("speed"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            speed,
            location,
            storage_places: vec![StoragePlace::bag()],
            version: 0,
        })
    }

    /// Rebuild from persisted state
    pub(crate) fn restore(
        id: Uuid,
        name: String,
        speed: i32,
        location: Location,
        storage_places: Vec<StoragePlace>,
        version: i64,
    ) -> Self {
        Self { id, name, speed, location, storage_places, version }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn storage_places(&self) -> &[StoragePlace] {
        &self.storage_places
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    pub fn is_busy(&self) -> bool {
        self.storage_places.iter().any(StoragePlace::is_occupied)
    }

    pub fn is_free(&self) -> bool {
        !self.is_busy()
    }

    /// Order held by the first occupied storage place, in place order
    pub fn first_carried_order(&self) -> Option<Uuid> {
        self.storage_places.iter().find_map(StoragePlace::order_id)
    }

    pub fn add_storage_place(&mut self, name: &str, volume: i32) -> Result<(), DomainError> {
        let place = StoragePlace::create(name, volume)?;
        self.storage_places.push(place);
        Ok(())
    }

    pub fn can_take_order(&self, order: &Order) -> Result<bool, DomainError> {
        for place in &self.storage_places {
            if place.can_store(order.volume())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Stores the order in the first place that fits (first-fit, list order)
    pub fn take_order(&mut self, order: &Order) -> Result<(), DomainError> {
        let volume = order.volume();
        let mut target = None;
        for (index, place) in self.storage_places.iter().enumerate() {
            if place.can_store(volume)? {
                target = Some(index);
                break;
            }
        }

        let index = target.ok_or(DomainError::AllStoragePlacesFull)?;
        self.storage_places[index].store(order.id(), volume)
    }

    pub fn complete_order(&mut self, order: &Order) -> Result<(), DomainError> {
        let place = self
            .storage_places
            .iter_mut()
            .find(|place| place.order_id() == Some(order.id()))
            .ok_or(DomainError::StoragePlaceDoesNotStoreThisOrder(order.id()))?;

        place.clear(order.id())
    }

    /// Ticks needed to reach `target`; used only for ranking couriers.
    ///
    /// Any non-zero distance within one tick's range scores exactly 1.
    pub fn calculate_time_to_location(&self, target: &Location) -> f64 {
        let distance = self.location.distance_to(target);
        if distance == 0 {
            0.0
        } else if distance <= self.speed {
            1.0
        } else {
            distance as f64 / self.speed as f64
        }
    }

    /// Advance at most `speed` Manhattan units, spending the X budget first.
    pub fn move_towards(&mut self, target: &Location) -> Result<(), DomainError> {
        let mut budget = self.speed;

        let step_x = (target.x() - self.location.x()).clamp(-budget, budget);
        budget -= step_x.abs();
        let step_y = (target.y() - self.location.y()).clamp(-budget, budget);

        self.location = Location::create(self.location.x() + step_x, self.location.y() + step_y)?;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
