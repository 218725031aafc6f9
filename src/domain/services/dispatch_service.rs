use crate::domain::courier::Courier;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderStatus};

// ============================================================================
// Dispatch Service - nearest available courier
// ============================================================================
//
// Stateless. Mutates the chosen courier (storage) and the order (assignment);
// the caller persists both in one unit of work.
//
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchService;

impl DispatchService {
    pub fn new() -> Self {
        Self
    }

    /// Assign `order` to the capable courier with the lowest time score.
    ///
    /// Ties go to the courier that comes first in `couriers`. Returns the index
    /// of the selected courier.
    pub fn dispatch(&self, order: &mut Order, couriers: &mut [Courier]) -> Result<usize, DomainError> {
        if order.status() != OrderStatus::Created {
            return Err(DomainError::AlreadyAssigned);
        }

        let mut selected: Option<(usize, f64)> = None;
        for (index, courier) in couriers.iter().enumerate() {
            if !courier.can_take_order(order)? {
                continue;
            }

            let score = courier.calculate_time_to_location(&order.location());
            // strict comparison keeps the earliest courier on ties
            if selected.map_or(true, |(_, best)| score < best) {
                selected = Some((index, score));
            }
        }

        let (index, score) = selected.ok_or(DomainError::NoAvailableCourier)?;
        let courier = &mut couriers[index];

        courier.take_order(order)?;
        order.assign(courier)?;

        tracing::debug!(
            order_id = %order.id(),
            courier_id = %courier.id(),
            score,
            "Order dispatched to courier"
        );

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared_kernel::Location;
    use uuid::Uuid;

    fn loc(x: i32, y: i32) -> Location {
        Location::create(x, y).unwrap()
    }

    fn courier_at(name: &str, x: i32, y: i32, speed: i32) -> Courier {
        Courier::create(name, speed, loc(x, y)).unwrap()
    }

    fn order_to(x: i32, y: i32, volume: i32) -> Order {
        Order::create(Uuid::new_v4(), loc(x, y), volume).unwrap()
    }

    #[test]
    fn test_selects_strictly_closer_courier() {
        let mut order = order_to(9, 9, 1);
        let mut couriers = vec![courier_at("far", 2, 2, 4), courier_at("near", 4, 4, 4)];

        let index = DispatchService::new().dispatch(&mut order, &mut couriers).unwrap();

        assert_eq!(index, 1);
        assert_eq!(order.status(), OrderStatus::Assigned);
        assert_eq!(order.courier_id(), Some(couriers[1].id()));
        assert!(couriers[1].is_busy());
        assert!(couriers[0].is_free());
    }

    #[test]
    fn test_tie_goes_to_first_in_input_order() {
        // both within one tick: score 1.0 each even though distances differ
        let mut order = order_to(5, 5, 1);
        let mut couriers = vec![courier_at("a", 5, 2, 4), courier_at("b", 5, 4, 4)];

        let index = DispatchService::new().dispatch(&mut order, &mut couriers).unwrap();

        assert_eq!(index, 0);
        assert!(couriers[0].is_busy());
        assert!(couriers[1].is_free());
    }

    #[test]
    fn test_skips_couriers_without_capacity() {
        let mut order = order_to(5, 5, 15);
        let mut couriers = vec![courier_at("small", 5, 5, 1), courier_at("large", 1, 1, 1)];
        couriers[1].add_storage_place("Trunk", 20).unwrap();

        let index = DispatchService::new().dispatch(&mut order, &mut couriers).unwrap();

        assert_eq!(index, 1);
        assert_eq!(couriers[1].storage_places()[1].order_id(), Some(order.id()));
    }

    #[test]
    fn test_empty_courier_list_has_no_available_courier() {
        let mut order = order_to(5, 5, 1);

        assert_eq!(
            DispatchService::new().dispatch(&mut order, &mut []),
            Err(DomainError::NoAvailableCourier)
        );
        assert_eq!(order.status(), OrderStatus::Created);
    }

    #[test]
    fn test_insufficient_capacity_everywhere() {
        let mut order = order_to(5, 5, 11);
        let mut couriers = vec![courier_at("a", 1, 1, 2), courier_at("b", 2, 2, 2)];

        assert_eq!(
            DispatchService::new().dispatch(&mut order, &mut couriers),
            Err(DomainError::NoAvailableCourier)
        );
        assert!(couriers.iter().all(Courier::is_free));
    }

    #[test]
    fn test_busy_couriers_are_skipped() {
        let mut first = order_to(3, 3, 1);
        let mut second = order_to(3, 3, 1);
        let mut couriers = vec![courier_at("only", 3, 3, 1)];

        DispatchService::new().dispatch(&mut first, &mut couriers).unwrap();

        assert_eq!(
            DispatchService::new().dispatch(&mut second, &mut couriers),
            Err(DomainError::NoAvailableCourier)
        );
    }

    #[test]
    fn test_already_assigned_order_is_rejected() {
        let mut order = order_to(5, 5, 1);
        let mut couriers = vec![courier_at("a", 1, 1, 2)];
        order.assign(&couriers[0]).unwrap();

        assert_eq!(
            DispatchService::new().dispatch(&mut order, &mut couriers),
            Err(DomainError::AlreadyAssigned)
        );
        assert!(couriers[0].is_free());
    }
}
