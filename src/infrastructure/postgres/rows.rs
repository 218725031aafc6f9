use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::courier::{Courier, StoragePlace};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::shared_kernel::Location;
use crate::ports::StorageError;

// ============================================================================
// Row Mapping
// ============================================================================
//
// Rows are re-validated on the way in; a value the domain would reject is a
// corrupt row, never a panic.
//
// ============================================================================

/// Matches couriers (aliased `c`) holding at least one order
pub(crate) const BUSY_CONDITION: &str =
    "EXISTS (SELECT 1 FROM storage_places sp WHERE sp.courier_id = c.id AND sp.order_id IS NOT NULL)";

/// id, name, speed, location_x, location_y, version
pub(crate) type CourierRow = (Uuid, String, i32, i32, i32, i64);

/// id, courier_id, name, total_volume, order_id
pub(crate) type StoragePlaceRow = (Uuid, Uuid, String, i32, Option<Uuid>);

/// id, location_x, location_y, volume, status, courier_id, version
pub(crate) type OrderRow = (Uuid, i32, i32, i32, String, Option<Uuid>, i64);

pub(crate) fn location(entity: &'static str, x: i32, y: i32) -> Result<Location, StorageError> {
    Location::create(x, y).map_err(|e| StorageError::Corrupt {
        entity,
        reason: format!("location ({x}, {y}): {e}"),
    })
}

/// Place rows must arrive ordered by position within each courier
pub(crate) fn couriers_from_rows(
    couriers: Vec<CourierRow>,
    places: Vec<StoragePlaceRow>,
) -> Result<Vec<Courier>, StorageError> {
    let mut by_courier: HashMap<Uuid, Vec<StoragePlace>> = HashMap::new();
    for (id, courier_id, name, total_volume, order_id) in places {
        by_courier
            .entry(courier_id)
            .or_default()
            .push(StoragePlace::restore(id, name, total_volume, order_id));
    }

    couriers
        .into_iter()
        .map(|(id, name, speed, x, y, version)| {
            let storage_places = by_courier.remove(&id).unwrap_or_default();
            if storage_places.is_empty() {
                return Err(StorageError::Corrupt {
                    entity: "courier",
                    reason: format!("courier {id} has no storage places"),
                });
            }
            Ok(Courier::restore(id, name, speed, location("courier", x, y)?, storage_places, version))
        })
        .collect()
}

pub(crate) fn order_from_row(row: OrderRow) -> Result<Order, StorageError> {
    let (id, x, y, volume, status, courier_id, version) = row;
    let status = OrderStatus::parse(&status).ok_or_else(|| StorageError::Corrupt {
        entity: "order",
        reason: format!("unknown status '{status}'"),
    })?;

    Ok(Order::restore(id, location("order", x, y)?, volume, status, courier_id, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places_are_grouped_in_row_order() {
        let courier_id = Uuid::new_v4();
        let (bag, trunk) = (Uuid::new_v4(), Uuid::new_v4());
        let order_id = Uuid::new_v4();

        let couriers = couriers_from_rows(
            vec![(courier_id, "Ivan".into(), 2, 3, 4, 7)],
            vec![
                (bag, courier_id, "Bag".into(), 10, None),
                (trunk, courier_id, "Trunk".into(), 30, Some(order_id)),
            ],
        )
        .unwrap();

        let courier = &couriers[0];
        assert_eq!(courier.version(), 7);
        assert_eq!(courier.location(), Location::create(3, 4).unwrap());
        assert_eq!(courier.storage_places()[0].id(), bag);
        assert_eq!(courier.storage_places()[1].order_id(), Some(order_id));
        assert!(courier.is_busy());
    }

    #[test]
    fn test_out_of_grid_location_is_corrupt() {
        let courier_id = Uuid::new_v4();
        let result = couriers_from_rows(
            vec![(courier_id, "Ivan".into(), 2, 0, 4, 1)],
            vec![(Uuid::new_v4(), courier_id, "Bag".into(), 10, None)],
        );

        assert!(matches!(result, Err(StorageError::Corrupt { entity: "courier", .. })));
    }

    #[test]
    fn test_courier_without_places_is_corrupt() {
        let result = couriers_from_rows(vec![(Uuid::new_v4(), "Ivan".into(), 2, 1, 1, 1)], vec![]);
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_order_row_maps_status() {
        let id = Uuid::new_v4();
        let courier_id = Uuid::new_v4();
        let order = order_from_row((id, 5, 6, 2, "Assigned".into(), Some(courier_id), 3)).unwrap();

        assert_eq!(order.status(), OrderStatus::Assigned);
        assert_eq!(order.courier_id(), Some(courier_id));
        assert_eq!(order.version(), 3);
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let result = order_from_row((Uuid::new_v4(), 5, 6, 2, "Lost".into(), None, 1));
        assert!(matches!(result, Err(StorageError::Corrupt { entity: "order", .. })));
    }
}
