use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::order::{Order, OrderCompleted};
use crate::domain::shared_kernel::Location;
use crate::infrastructure::MemoryStore;
use crate::ports::{MessageBusProducer, UnitOfWorkFactory};
use crate::utils::CancellationToken;

// Fixtures shared by the application tests

pub(crate) async fn seed_courier(store: &MemoryStore, at: (i32, i32), speed: i32) -> Uuid {
    let courier = Courier::create("courier", speed, Location::create(at.0, at.1).unwrap()).unwrap();
    let id = courier.id();
    let mut uow = store.begin().await.unwrap();
    uow.couriers().add(courier).await.unwrap();
    assert!(uow.save_changes(&CancellationToken::none()).await.unwrap());
    id
}

pub(crate) async fn seed_order(store: &MemoryStore, at: (i32, i32), volume: i32) -> Uuid {
    let order = Order::create(Uuid::new_v4(), Location::create(at.0, at.1).unwrap(), volume).unwrap();
    let id = order.id();
    let mut uow = store.begin().await.unwrap();
    uow.orders().add(order).await.unwrap();
    assert!(uow.save_changes(&CancellationToken::none()).await.unwrap());
    id
}

/// Keeps every published event; optionally fails the first `fail_times` calls
#[derive(Default)]
pub(crate) struct RecordingProducer {
    pub published: Mutex<Vec<OrderCompleted>>,
    pub fail_times: Mutex<usize>,
}

impl RecordingProducer {
    pub fn failing(times: usize) -> Self {
        Self { fail_times: Mutex::new(times), ..Default::default() }
    }

    pub fn published_orders(&self) -> Vec<Uuid> {
        self.published.lock().unwrap().iter().map(|e| e.order_id).collect()
    }
}

#[async_trait]
impl MessageBusProducer for RecordingProducer {
    async fn publish(&self, event: &OrderCompleted, _cancel: &CancellationToken) -> anyhow::Result<()> {
        {
            let mut remaining = self.fail_times.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                anyhow::bail!("broker unavailable");
            }
        }
        self.published.lock().unwrap().push(event.clone());
        Ok(())
    }
}
