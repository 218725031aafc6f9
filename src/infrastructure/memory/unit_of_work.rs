use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::order::{Order, OrderStatus};
use crate::infrastructure::staging::{stage, Staged};
use crate::outbox::OutboxRecorder;
use crate::ports::{CourierRepository, OrderRepository, StorageError, UnitOfWork};
use crate::utils::CancellationToken;
use super::store::{MemoryStore, Row, State};

/// Buffers staged aggregates until `save_changes` applies them under one lock
pub struct MemoryUnitOfWork {
    store: MemoryStore,
    couriers: Vec<(Courier, Staged)>,
    orders: Vec<(Order, Staged)>,
    completed: bool,
}

impl MemoryUnitOfWork {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            couriers: Vec::new(),
            orders: Vec::new(),
            completed: false,
        }
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.completed {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

fn check_courier(state: &State, courier: &Courier, kind: Staged) -> Result<(), StorageError> {
    let stored = state.couriers.get(&courier.id());
    match (kind, stored) {
        (Staged::Added, Some(_)) => Err(StorageError::Duplicate { entity: "courier", id: courier.id() }),
        (Staged::Added, None) => Ok(()),
        (Staged::Updated, Some(row)) if row.value.version() == courier.version() => Ok(()),
        (Staged::Updated, _) => Err(StorageError::Conflict { entity: "courier", id: courier.id() }),
    }
}

fn check_order(state: &State, order: &Order, kind: Staged) -> Result<(), StorageError> {
    let stored = state.orders.get(&order.id());
    match (kind, stored) {
        (Staged::Added, Some(_)) => Err(StorageError::Duplicate { entity: "order", id: order.id() }),
        (Staged::Added, None) => Ok(()),
        (Staged::Updated, Some(row)) if row.value.version() == order.version() => Ok(()),
        (Staged::Updated, _) => Err(StorageError::Conflict { entity: "order", id: order.id() }),
    }
}

#[async_trait]
impl CourierRepository for MemoryUnitOfWork {
    async fn add(&mut self, courier: Courier) -> Result<(), StorageError> {
        self.ensure_open()?;
        stage(&mut self.couriers, courier, Staged::Added, Courier::id);
        Ok(())
    }

    async fn update(&mut self, courier: Courier) -> Result<(), StorageError> {
        self.ensure_open()?;
        stage(&mut self.couriers, courier, Staged::Updated, Courier::id);
        Ok(())
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<Courier>, StorageError> {
        self.ensure_open()?;
        let state = self.store.state().lock().await;
        Ok(state.couriers.get(&id).map(|row| row.value.clone()))
    }

    async fn get_all_free(&mut self) -> Result<Vec<Courier>, StorageError> {
        self.ensure_open()?;
        let state = self.store.state().lock().await;
        Ok(state.couriers_where(Courier::is_free))
    }

    async fn get_all_busy(&mut self) -> Result<Vec<Courier>, StorageError> {
        self.ensure_open()?;
        let state = self.store.state().lock().await;
        Ok(state.couriers_where(Courier::is_busy))
    }
}

#[async_trait]
impl OrderRepository for MemoryUnitOfWork {
    async fn add(&mut self, order: Order) -> Result<(), StorageError> {
        self.ensure_open()?;
        stage(&mut self.orders, order, Staged::Added, Order::id);
        Ok(())
    }

    async fn update(&mut self, order: Order) -> Result<(), StorageError> {
        self.ensure_open()?;
        stage(&mut self.orders, order, Staged::Updated, Order::id);
        Ok(())
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<Order>, StorageError> {
        self.ensure_open()?;
        let state = self.store.state().lock().await;
        Ok(state.orders.get(&id).map(|row| row.value.clone()))
    }

    async fn get_first_in_created_status(&mut self) -> Result<Option<Order>, StorageError> {
        self.ensure_open()?;
        let state = self.store.state().lock().await;
        Ok(state.orders_where(|o| o.status() == OrderStatus::Created).into_iter().next())
    }

    async fn get_all_in_assigned_status(&mut self) -> Result<Vec<Order>, StorageError> {
        self.ensure_open()?;
        let state = self.store.state().lock().await;
        Ok(state.orders_where(|o| o.status() == OrderStatus::Assigned))
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn couriers(&mut self) -> &mut dyn CourierRepository {
        self
    }

    fn orders(&mut self) -> &mut dyn OrderRepository {
        self
    }

    async fn save_changes(&mut self, cancel: &CancellationToken) -> Result<bool, StorageError> {
        self.ensure_open()?;
        self.completed = true;

        if cancel.is_cancelled() {
            tracing::debug!("Cancellation requested before commit, discarding unit of work");
            return Ok(false);
        }

        let messages = OutboxRecorder::record_all(self.orders.iter_mut().map(|(order, _)| order), Utc::now())?;

        let mut state = self.store.state().lock().await;

        // validate everything before touching state so a failure applies nothing
        for (courier, kind) in &self.couriers {
            check_courier(&state, courier, *kind)?;
        }
        for (order, kind) in &self.orders {
            check_order(&state, order, *kind)?;
        }

        for (mut courier, kind) in self.couriers.drain(..) {
            courier.set_version(courier.version() + 1);
            let seq = match kind {
                Staged::Added => state.next_seq(),
                Staged::Updated => state.couriers[&courier.id()].seq,
            };
            state.couriers.insert(courier.id(), Row { seq, value: courier });
        }
        for (mut order, kind) in self.orders.drain(..) {
            order.set_version(order.version() + 1);
            let seq = match kind {
                Staged::Added => state.next_seq(),
                Staged::Updated => state.orders[&order.id()].seq,
            };
            state.orders.insert(order.id(), Row { seq, value: order });
        }

        let recorded = messages.len();
        for message in messages {
            if !state.outbox.iter().any(|existing| existing.id == message.id) {
                state.outbox.push(message);
            }
        }

        tracing::debug!(outbox_messages = recorded, "Unit of work committed");
        Ok(true)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
