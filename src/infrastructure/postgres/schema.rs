use sqlx::postgres::{PgPool, PgPoolOptions};

// ============================================================================
// Schema Bootstrap
// ============================================================================

pub(crate) const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS couriers (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    speed INTEGER NOT NULL CHECK (speed > 0),
    location_x INTEGER NOT NULL,
    location_y INTEGER NOT NULL,
    version BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
);

CREATE TABLE IF NOT EXISTS storage_places (
    id UUID PRIMARY KEY,
    courier_id UUID NOT NULL REFERENCES couriers(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    total_volume INTEGER NOT NULL CHECK (total_volume > 0),
    order_id UUID
);

CREATE INDEX IF NOT EXISTS idx_storage_places_courier ON storage_places(courier_id, position);

CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    location_x INTEGER NOT NULL,
    location_y INTEGER NOT NULL,
    volume INTEGER NOT NULL CHECK (volume > 0),
    status TEXT NOT NULL CHECK (status IN ('Created', 'Assigned', 'Completed')),
    courier_id UUID,
    version BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
);

CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status, created_at);

CREATE TABLE IF NOT EXISTS outbox_messages (
    id UUID PRIMARY KEY,
    type TEXT NOT NULL,
    payload TEXT NOT NULL,
    occurred_at_utc TIMESTAMPTZ NOT NULL,
    processed_at_utc TIMESTAMPTZ
);

CREATE INDEX IF NOT EXISTS idx_outbox_pending
    ON outbox_messages(occurred_at_utc)
    WHERE processed_at_utc IS NULL;
";

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .connect(database_url)
        .await
}

/// Idempotent; safe to run on every start-up
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("✅ Database schema ready");
    Ok(())
}
