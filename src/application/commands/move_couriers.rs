use std::sync::Arc;
use uuid::Uuid;

use crate::application::errors::CommandError;
use crate::domain::order::OrderStatus;
use crate::ports::UnitOfWorkFactory;
use crate::utils::CancellationToken;

// ============================================================================
// Movement Cycle
// ============================================================================
//
// Every busy courier takes one step towards the order in its first occupied
// storage place. Arrival completes the order and frees the place. All moves
// of one tick commit together.
//
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MovementReport {
    pub moved: usize,
    pub completed: Vec<Uuid>,
    pub cancelled: bool,
}

pub struct MoveCouriersHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl MoveCouriersHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    pub async fn handle(&self, cancel: &CancellationToken) -> Result<MovementReport, CommandError> {
        let mut report = MovementReport::default();
        if cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(report);
        }

        let mut uow = self.uow_factory.begin().await?;
        let couriers = uow.couriers().get_all_busy().await?;

        for mut courier in couriers {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let Some(order_id) = courier.first_carried_order() else {
                continue;
            };
            let Some(mut order) = uow.orders().get(order_id).await? else {
                tracing::warn!(
                    courier_id = %courier.id(),
                    order_id = %order_id,
                    "Courier carries an order that does not exist, skipping"
                );
                continue;
            };
            if order.status() != OrderStatus::Assigned {
                tracing::warn!(
                    courier_id = %courier.id(),
                    order_id = %order_id,
                    status = order.status().as_str(),
                    "Courier carries an order that is not assigned, skipping"
                );
                continue;
            }

            let target = order.location();
            courier.move_towards(&target)?;

            if courier.location() == target {
                order.complete()?;
                courier.complete_order(&order)?;
                uow.orders().update(order).await?;
                report.completed.push(order_id);
            }

            tracing::debug!(
                courier_id = %courier.id(),
                location = %courier.location(),
                target = %target,
                "Courier moved"
            );
            uow.couriers().update(courier).await?;
            report.moved += 1;
        }

        if report.moved == 0 {
            return Ok(report);
        }

        if report.cancelled || !uow.save_changes(cancel).await? {
            // nothing was committed
            return Ok(MovementReport { cancelled: true, ..Default::default() });
        }

        for order_id in &report.completed {
            tracing::info!(order_id = %order_id, "🏁 Order delivered");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::AssignOrdersHandler;
    use crate::application::testing::{seed_courier, seed_order};
    use crate::domain::courier::Courier;
    use crate::domain::order::{Order, OrderEvent};
    use crate::domain::shared_kernel::Location;
    use crate::outbox::core::deserialize_event;
    use crate::infrastructure::MemoryStore;
    use crate::utils::CancellationSource;

    async fn dispatched(store: &MemoryStore, courier_at: (i32, i32), speed: i32, order_at: (i32, i32)) -> (Uuid, Uuid) {
        let courier_id = seed_courier(store, courier_at, speed).await;
        let order_id = seed_order(store, order_at, 1).await;
        let outcome = AssignOrdersHandler::new(Arc::new(store.clone()))
            .handle(&CancellationToken::none())
            .await
            .unwrap();
        assert!(outcome.is_assigned());
        (courier_id, order_id)
    }

    #[tokio::test]
    async fn test_moves_towards_order_then_completes() {
        let store = MemoryStore::new();
        let (courier_id, order_id) = dispatched(&store, (6, 6), 4, (3, 1)).await;
        let handler = MoveCouriersHandler::new(Arc::new(store.clone()));

        let first = handler.handle(&CancellationToken::none()).await.unwrap();
        assert_eq!(first.moved, 1);
        assert!(first.completed.is_empty());

        let mut uow = store.begin().await.unwrap();
        assert_eq!(
            uow.couriers().get(courier_id).await.unwrap().unwrap().location(),
            Location::create(3, 5).unwrap()
        );
        drop(uow);

        let second = handler.handle(&CancellationToken::none()).await.unwrap();
        assert_eq!(second.completed, vec![order_id]);

        let mut uow = store.begin().await.unwrap();
        let courier = uow.couriers().get(courier_id).await.unwrap().unwrap();
        assert_eq!(courier.location(), Location::create(3, 1).unwrap());
        assert!(courier.is_free());
        assert_eq!(uow.orders().get(order_id).await.unwrap().unwrap().status(), OrderStatus::Completed);

        let outbox = store.outbox_snapshot().await;
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].event_type, "OrderCompleted");
    }

    #[tokio::test]
    async fn test_rerun_after_completion_is_noop() {
        let store = MemoryStore::new();
        dispatched(&store, (2, 2), 3, (3, 3)).await;
        let handler = MoveCouriersHandler::new(Arc::new(store.clone()));

        assert_eq!(handler.handle(&CancellationToken::none()).await.unwrap().completed.len(), 1);

        let again = handler.handle(&CancellationToken::none()).await.unwrap();
        assert_eq!(again, MovementReport::default());
        assert_eq!(store.outbox_snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_no_busy_couriers_is_empty_report() {
        let store = MemoryStore::new();
        seed_courier(&store, (1, 1), 2).await;

        let report = MoveCouriersHandler::new(Arc::new(store)).handle(&CancellationToken::none()).await.unwrap();
        assert_eq!(report, MovementReport::default());
    }

    #[tokio::test]
    async fn test_cancelled_cycle_leaves_positions() {
        let store = MemoryStore::new();
        let (courier_id, _) = dispatched(&store, (1, 1), 2, (9, 9)).await;
        let source = CancellationSource::new();
        source.cancel();

        let report = MoveCouriersHandler::new(Arc::new(store.clone())).handle(&source.token()).await.unwrap();

        assert!(report.cancelled);
        let mut uow = store.begin().await.unwrap();
        assert_eq!(
            uow.couriers().get(courier_id).await.unwrap().unwrap().location(),
            Location::create(1, 1).unwrap()
        );
    }

    #[tokio::test]
    async fn test_couriers_arriving_together_record_one_row_each() {
        let store = MemoryStore::new();
        let (_, first) = dispatched(&store, (1, 1), 3, (2, 2)).await;
        let (_, second) = dispatched(&store, (8, 8), 3, (9, 9)).await;

        let report = MoveCouriersHandler::new(Arc::new(store.clone()))
            .handle(&CancellationToken::none())
            .await
            .unwrap();
        assert_eq!(report.moved, 2);
        assert_eq!(report.completed.len(), 2);

        let outbox = store.outbox_snapshot().await;
        assert_eq!(outbox.len(), 2);
        assert!(outbox.iter().all(|m| m.event_type == "OrderCompleted" && m.is_pending()));
        // both rows come from the same commit
        assert_eq!(outbox[0].occurred_at_utc, outbox[1].occurred_at_utc);

        let mut recorded: Vec<Uuid> = outbox
            .iter()
            .map(|m| match deserialize_event::<OrderEvent>(&m.payload).unwrap() {
                OrderEvent::Completed(e) => e.order_id,
            })
            .collect();
        let mut expected = vec![first, second];
        recorded.sort();
        expected.sort();
        assert_eq!(recorded, expected);
    }

    #[tokio::test]
    async fn test_carried_order_not_assigned_is_skipped() {
        let store = MemoryStore::new();
        let (healthy_courier, healthy_order) = dispatched(&store, (1, 1), 3, (2, 2)).await;

        // courier holds an order that never left Created
        let stray = Order::create(Uuid::new_v4(), Location::create(5, 5).unwrap(), 1).unwrap();
        let mut stuck = Courier::create("stuck", 2, Location::create(9, 9).unwrap()).unwrap();
        stuck.take_order(&stray).unwrap();
        let stuck_id = stuck.id();
        let mut uow = store.begin().await.unwrap();
        uow.orders().add(stray).await.unwrap();
        uow.couriers().add(stuck).await.unwrap();
        assert!(uow.save_changes(&CancellationToken::none()).await.unwrap());

        let report = MoveCouriersHandler::new(Arc::new(store.clone()))
            .handle(&CancellationToken::none())
            .await
            .unwrap();

        assert_eq!(report.moved, 1);
        assert_eq!(report.completed, vec![healthy_order]);

        let mut uow = store.begin().await.unwrap();
        assert!(uow.couriers().get(healthy_courier).await.unwrap().unwrap().is_free());
        assert_eq!(
            uow.couriers().get(stuck_id).await.unwrap().unwrap().location(),
            Location::create(9, 9).unwrap()
        );
    }
}
