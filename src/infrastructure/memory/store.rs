use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::order::{Order, OrderStatus};
use crate::outbox::OutboxMessage;
use crate::ports::{
    CourierView, DeliveryQueries, OrderView, OutboxStore, StorageError, UnitOfWork, UnitOfWorkFactory,
};
use super::unit_of_work::MemoryUnitOfWork;

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Same contract as the Postgres adapter: version-checked updates, insertion
// ordering and all-or-nothing commits. Cloning shares the underlying state.
//
// ============================================================================

#[derive(Debug, Clone)]
pub(super) struct Row<T> {
    pub seq: u64,
    pub value: T,
}

#[derive(Debug, Default)]
pub(super) struct State {
    pub couriers: HashMap<Uuid, Row<Courier>>,
    pub orders: HashMap<Uuid, Row<Order>>,
    pub outbox: Vec<OutboxMessage>,
    next_seq: u64,
}

impl State {
    pub fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Rows matching `filter`, in insertion order
    pub fn couriers_where(&self, filter: impl Fn(&Courier) -> bool) -> Vec<Courier> {
        sorted(self.couriers.values().filter(|row| filter(&row.value)))
            .map(|row| row.value.clone())
            .collect()
    }

    pub fn orders_where(&self, filter: impl Fn(&Order) -> bool) -> Vec<Order> {
        sorted(self.orders.values().filter(|row| filter(&row.value)))
            .map(|row| row.value.clone())
            .collect()
    }
}

fn sorted<'a, T: 'a + HasId>(rows: impl Iterator<Item = &'a Row<T>>) -> impl Iterator<Item = &'a Row<T>> {
    let mut rows: Vec<_> = rows.collect();
    rows.sort_by_key(|row| (row.seq, row.value.row_id()));
    rows.into_iter()
}

pub(super) trait HasId {
    fn row_id(&self) -> Uuid;
}

impl HasId for Courier {
    fn row_id(&self) -> Uuid {
        self.id()
    }
}

impl HasId for Order {
    fn row_id(&self) -> Uuid {
        self.id()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn state(&self) -> &Arc<Mutex<State>> {
        &self.state
    }

    #[cfg(test)]
    pub(crate) async fn outbox_snapshot(&self) -> Vec<OutboxMessage> {
        self.state.lock().await.outbox.clone()
    }
}

#[async_trait]
impl UnitOfWorkFactory for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StorageError> {
        Ok(Box::new(MemoryUnitOfWork::new(self.clone())))
    }
}

#[async_trait]
impl OutboxStore for MemoryStore {
    async fn fetch_unprocessed(&self, limit: usize) -> Result<Vec<OutboxMessage>, StorageError> {
        let state = self.state.lock().await;
        let mut pending: Vec<_> = state.outbox.iter().filter(|m| m.is_pending()).cloned().collect();
        pending.sort_by_key(|m| (m.occurred_at_utc, m.id));
        pending.truncate(limit);
        Ok(pending)
    }

    async fn mark_processed(&self, processed: &[(Uuid, DateTime<Utc>)]) -> Result<u64, StorageError> {
        let mut state = self.state.lock().await;
        let mut stamped = 0;
        for (id, at) in processed {
            if let Some(row) = state.outbox.iter_mut().find(|m| m.id == *id && m.is_pending()) {
                row.processed_at_utc = Some(*at);
                stamped += 1;
            }
        }
        Ok(stamped)
    }
}

fn courier_view(courier: &Courier) -> CourierView {
    CourierView {
        id: courier.id(),
        name: courier.name().to_string(),
        location: courier.location(),
    }
}

#[async_trait]
impl DeliveryQueries for MemoryStore {
    async fn all_couriers(&self) -> Result<Vec<CourierView>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.couriers_where(|_| true).iter().map(courier_view).collect())
    }

    async fn busy_couriers(&self) -> Result<Vec<CourierView>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.couriers_where(Courier::is_busy).iter().map(courier_view).collect())
    }

    async fn created_and_assigned_orders(&self) -> Result<Vec<OrderView>, StorageError> {
        let state = self.state.lock().await;
        Ok(state
            .orders_where(|o| matches!(o.status(), OrderStatus::Created | OrderStatus::Assigned))
            .iter()
            .map(|o| OrderView { id: o.id(), location: o.location() })
            .collect())
    }
}
