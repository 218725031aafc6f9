use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::order::OrderEvent;
use crate::outbox::DomainEventPublisher;
use crate::ports::MessageBusProducer;
use crate::utils::CancellationToken;

/// Routes decoded order events from the outbox relay to the message bus
pub struct OrderEventDispatcher {
    producer: Arc<dyn MessageBusProducer>,
}

impl OrderEventDispatcher {
    pub fn new(producer: Arc<dyn MessageBusProducer>) -> Self {
        Self { producer }
    }
}

#[async_trait]
impl DomainEventPublisher<OrderEvent> for OrderEventDispatcher {
    async fn publish(&self, event: &OrderEvent, cancel: &CancellationToken) -> anyhow::Result<()> {
        match event {
            OrderEvent::Completed(completed) => self.producer.publish(completed, cancel).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::{AssignOrdersHandler, MoveCouriersHandler};
    use crate::application::testing::{seed_courier, seed_order, RecordingProducer};
    use crate::infrastructure::MemoryStore;
    use crate::outbox::OutboxRelay;

    async fn delivered_order(store: &MemoryStore) -> uuid::Uuid {
        seed_courier(store, (4, 4), 2).await;
        let order_id = seed_order(store, (4, 5), 1).await;
        let cancel = CancellationToken::none();
        AssignOrdersHandler::new(Arc::new(store.clone())).handle(&cancel).await.unwrap();
        MoveCouriersHandler::new(Arc::new(store.clone())).handle(&cancel).await.unwrap();
        order_id
    }

    #[tokio::test]
    async fn test_completed_order_reaches_the_bus_once() {
        let store = MemoryStore::new();
        let order_id = delivered_order(&store).await;
        let producer = Arc::new(RecordingProducer::default());
        let relay = OutboxRelay::<OrderEvent>::new(
            Arc::new(store.clone()),
            Arc::new(OrderEventDispatcher::new(producer.clone())),
            20,
        );

        let report = relay.process(&CancellationToken::none()).await.unwrap();
        assert_eq!(report.published, 1);
        assert_eq!(producer.published_orders(), vec![order_id]);

        let outbox = store.outbox_snapshot().await;
        assert!(outbox[0].processed_at_utc.is_some());

        // a second pass has nothing left to send
        assert!(relay.process(&CancellationToken::none()).await.unwrap().is_idle());
        assert_eq!(producer.published_orders().len(), 1);
    }

    #[tokio::test]
    async fn test_bus_outage_is_retried_next_pass() {
        let store = MemoryStore::new();
        let order_id = delivered_order(&store).await;
        let producer = Arc::new(RecordingProducer::failing(1));
        let relay = OutboxRelay::<OrderEvent>::new(
            Arc::new(store.clone()),
            Arc::new(OrderEventDispatcher::new(producer.clone())),
            20,
        );

        let first = relay.process(&CancellationToken::none()).await.unwrap();
        assert_eq!(first.failed, 1);
        assert!(store.outbox_snapshot().await[0].is_pending());

        let second = relay.process(&CancellationToken::none()).await.unwrap();
        assert_eq!(second.published, 1);
        assert_eq!(producer.published_orders(), vec![order_id]);
    }
}
