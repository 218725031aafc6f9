use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgConnection, PgPool};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::order::{Order, OrderStatus};
use crate::infrastructure::staging::{stage, Staged};
use crate::outbox::{OutboxMessage, OutboxRecorder};
use crate::ports::{CourierRepository, OrderRepository, StorageError, UnitOfWork};
use crate::utils::CancellationToken;
use super::rows::{
    couriers_from_rows, order_from_row, CourierRow, OrderRow, StoragePlaceRow, BUSY_CONDITION,
};

// ============================================================================
// Postgres Unit of Work
// ============================================================================
//
// Reads run on the open transaction. Staged aggregates are written in
// save_changes together with their outbox rows, then committed. Dropping the
// unit of work without saving rolls the transaction back.
//
// ============================================================================

const UNIQUE_VIOLATION: &str = "23505";

const COURIER_COLUMNS: &str = "c.id, c.name, c.speed, c.location_x, c.location_y, c.version";
const ORDER_COLUMNS: &str = "id, location_x, location_y, volume, status, courier_id, version";

pub struct PgUnitOfWork {
    tx: Option<Transaction<'static, Postgres>>,
    couriers: Vec<(Courier, Staged)>,
    orders: Vec<(Order, Staged)>,
}

impl PgUnitOfWork {
    pub async fn begin(pool: &PgPool) -> Result<Self, StorageError> {
        Ok(Self {
            tx: Some(pool.begin().await?),
            couriers: Vec::new(),
            orders: Vec::new(),
        })
    }

    fn conn(&mut self) -> Result<&mut PgConnection, StorageError> {
        self.tx.as_deref_mut().ok_or(StorageError::Closed)
    }
}

fn insert_error(entity: &'static str, id: Uuid) -> impl FnOnce(sqlx::Error) -> StorageError {
    move |e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StorageError::Duplicate { entity, id }
        }
        _ => StorageError::Database(e),
    }
}

/// Courier selection; every variant keeps insertion order
#[derive(Debug, Clone, Copy)]
enum CourierFilter {
    ById(Uuid),
    Free,
    Busy,
}

async fn load_couriers(conn: &mut PgConnection, filter: CourierFilter) -> Result<Vec<Courier>, StorageError> {
    let (condition, id) = match filter {
        CourierFilter::ById(id) => ("c.id = $1".to_string(), Some(id)),
        CourierFilter::Free => (format!("$1::uuid IS NULL AND NOT {BUSY_CONDITION}"), None),
        CourierFilter::Busy => (format!("$1::uuid IS NULL AND {BUSY_CONDITION}"), None),
    };
    let sql = format!(
        "SELECT {COURIER_COLUMNS} FROM couriers c WHERE {condition} ORDER BY c.created_at, c.id"
    );
    let couriers: Vec<CourierRow> = sqlx::query_as(&sql).bind(id).fetch_all(&mut *conn).await?;
    if couriers.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = couriers.iter().map(|row| row.0).collect();
    let places: Vec<StoragePlaceRow> = sqlx::query_as(
        "SELECT id, courier_id, name, total_volume, order_id
         FROM storage_places
         WHERE courier_id = ANY($1)
         ORDER BY courier_id, position",
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;

    couriers_from_rows(couriers, places)
}

/// NULL parameters disable their filter; a NULL limit returns every row
async fn load_orders(
    conn: &mut PgConnection,
    id: Option<Uuid>,
    status: Option<OrderStatus>,
    limit: Option<i64>,
) -> Result<Vec<Order>, StorageError> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders
         WHERE ($1::uuid IS NULL OR id = $1) AND ($2::text IS NULL OR status = $2)
         ORDER BY created_at, id
         LIMIT $3"
    );
    let rows: Vec<OrderRow> = sqlx::query_as(&sql)
        .bind(id)
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;
    rows.into_iter().map(order_from_row).collect()
}

async fn write_courier(conn: &mut PgConnection, courier: &Courier, kind: Staged) -> Result<(), StorageError> {
    let location = courier.location();
    match kind {
        Staged::Added => {
            sqlx::query(
                "INSERT INTO couriers (id, name, speed, location_x, location_y, version)
                 VALUES ($1, $2, $3, $4, $5, 1)",
            )
            .bind(courier.id())
            .bind(courier.name())
            .bind(courier.speed())
            .bind(location.x())
            .bind(location.y())
            .execute(&mut *conn)
            .await
            .map_err(insert_error("courier", courier.id()))?;
        }
        Staged::Updated => {
            let result = sqlx::query(
                "UPDATE couriers
                 SET name = $2, speed = $3, location_x = $4, location_y = $5, version = version + 1
                 WHERE id = $1 AND version = $6",
            )
            .bind(courier.id())
            .bind(courier.name())
            .bind(courier.speed())
            .bind(location.x())
            .bind(location.y())
            .bind(courier.version())
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StorageError::Conflict { entity: "courier", id: courier.id() });
            }
        }
    }

    for (position, place) in courier.storage_places().iter().enumerate() {
        sqlx::query(
            "INSERT INTO storage_places (id, courier_id, position, name, total_volume, order_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE
             SET position = EXCLUDED.position,
                 name = EXCLUDED.name,
                 total_volume = EXCLUDED.total_volume,
                 order_id = EXCLUDED.order_id",
        )
        .bind(place.id())
        .bind(courier.id())
        .bind(position as i32)
        .bind(place.name())
        .bind(place.total_volume())
        .bind(place.order_id())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn write_order(conn: &mut PgConnection, order: &Order, kind: Staged) -> Result<(), StorageError> {
    let location = order.location();
    match kind {
        Staged::Added => {
            sqlx::query(
                "INSERT INTO orders (id, location_x, location_y, volume, status, courier_id, version)
                 VALUES ($1, $2, $3, $4, $5, $6, 1)",
            )
            .bind(order.id())
            .bind(location.x())
            .bind(location.y())
            .bind(order.volume())
            .bind(order.status().as_str())
            .bind(order.courier_id())
            .execute(&mut *conn)
            .await
            .map_err(insert_error("order", order.id()))?;
        }
        Staged::Updated => {
            let result = sqlx::query(
                "UPDATE orders
                 SET status = $2, courier_id = $3, version = version + 1
                 WHERE id = $1 AND version = $4",
            )
            .bind(order.id())
            .bind(order.status().as_str())
            .bind(order.courier_id())
            .bind(order.version())
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() == 0 {
                return Err(StorageError::Conflict { entity: "order", id: order.id() });
            }
        }
    }
    Ok(())
}

async fn write_outbox(conn: &mut PgConnection, message: &OutboxMessage) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO outbox_messages (id, type, payload, occurred_at_utc, processed_at_utc)
         VALUES ($1, $2, $3, $4, NULL)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(message.id)
    .bind(&message.event_type)
    .bind(&message.payload)
    .bind(message.occurred_at_utc)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl CourierRepository for PgUnitOfWork {
    async fn add(&mut self, courier: Courier) -> Result<(), StorageError> {
        self.conn()?;
        stage(&mut self.couriers, courier, Staged::Added, Courier::id);
        Ok(())
    }

    async fn update(&mut self, courier: Courier) -> Result<(), StorageError> {
        self.conn()?;
        stage(&mut self.couriers, courier, Staged::Updated, Courier::id);
        Ok(())
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<Courier>, StorageError> {
        let mut found = load_couriers(self.conn()?, CourierFilter::ById(id)).await?;
        Ok(found.pop())
    }

    async fn get_all_free(&mut self) -> Result<Vec<Courier>, StorageError> {
        load_couriers(self.conn()?, CourierFilter::Free).await
    }

    async fn get_all_busy(&mut self) -> Result<Vec<Courier>, StorageError> {
        load_couriers(self.conn()?, CourierFilter::Busy).await
    }
}

#[async_trait]
impl OrderRepository for PgUnitOfWork {
    async fn add(&mut self, order: Order) -> Result<(), StorageError> {
        self.conn()?;
        stage(&mut self.orders, order, Staged::Added, Order::id);
        Ok(())
    }

    async fn update(&mut self, order: Order) -> Result<(), StorageError> {
        self.conn()?;
        stage(&mut self.orders, order, Staged::Updated, Order::id);
        Ok(())
    }

    async fn get(&mut self, id: Uuid) -> Result<Option<Order>, StorageError> {
        let mut found = load_orders(self.conn()?, Some(id), None, Some(1)).await?;
        Ok(found.pop())
    }

    async fn get_first_in_created_status(&mut self) -> Result<Option<Order>, StorageError> {
        let mut found = load_orders(self.conn()?, None, Some(OrderStatus::Created), Some(1)).await?;
        Ok(found.pop())
    }

    async fn get_all_in_assigned_status(&mut self) -> Result<Vec<Order>, StorageError> {
        load_orders(self.conn()?, None, Some(OrderStatus::Assigned), None).await
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn couriers(&mut self) -> &mut dyn CourierRepository {
        self
    }

    fn orders(&mut self) -> &mut dyn OrderRepository {
        self
    }

    async fn save_changes(&mut self, cancel: &CancellationToken) -> Result<bool, StorageError> {
        let mut tx = self.tx.take().ok_or(StorageError::Closed)?;

        if cancel.is_cancelled() {
            tx.rollback().await?;
            tracing::debug!("Cancellation requested before commit, transaction rolled back");
            return Ok(false);
        }

        let messages = OutboxRecorder::record_all(self.orders.iter_mut().map(|(order, _)| order), Utc::now())?;

        for (courier, kind) in &self.couriers {
            write_courier(&mut *tx, courier, *kind).await?;
        }
        for (order, kind) in &self.orders {
            write_order(&mut *tx, order, *kind).await?;
        }
        for message in &messages {
            write_outbox(&mut *tx, message).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            couriers = self.couriers.len(),
            orders = self.orders.len(),
            outbox_messages = messages.len(),
            "Unit of work committed"
        );
        self.couriers.clear();
        self.orders.clear();
        Ok(true)
    }
}

// ============================================================================
// Integration Tests (PostgreSQL)
// ============================================================================
