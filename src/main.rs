use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod application;
mod config;
mod domain;
mod infrastructure;
mod messaging;
mod metrics;
mod outbox;
mod ports;
mod utils;

use actors::{Coordinator, DispatchJob, Jobs, MovementJob, OutboxJob, Schedule};
use application::{
    AssignOrdersHandler, CreateCourier, CreateCourierHandler, CreateOrder, CreateOrderHandler,
    DeliveryQueryService, MoveCouriersHandler, OrderEventDispatcher,
};
use config::{AppConfig, StorageBackend};
use domain::order::OrderEvent;
use domain::shared_kernel::{RandomSource, ThreadRandom};
use infrastructure::{MemoryStore, PgStore, RandomGeoClient};
use messaging::{RedpandaClient, RedpandaConfig};
use outbox::OutboxRelay;
use ports::{DeliveryQueries, OutboxStore, UnitOfWorkFactory};
use utils::{retry_with_backoff, CancellationSource, CancellationToken, RetryConfig};

const DEMO_STREETS: &[&str] = &["Tverskaya", "Arbat", "Nevsky", "Lenina", "Mira", "Sadovaya"];

/// One storage adapter seen through every port it implements
struct Storage {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    outbox: Arc<dyn OutboxStore>,
    queries: Arc<dyn DeliveryQueries>,
}

impl Storage {
    fn from_adapter<S>(adapter: S) -> Self
    where
        S: UnitOfWorkFactory + OutboxStore + DeliveryQueries + 'static,
    {
        let adapter = Arc::new(adapter);
        Self {
            uow_factory: adapter.clone(),
            outbox: adapter.clone(),
            queries: adapter,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging with environment-based filtering
    // Example: RUST_LOG=delivery_dispatch=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,delivery_dispatch=debug"))
        )
        .init();

    tracing::info!("🚀 Starting delivery dispatch service");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    // === 1. Storage ===
    let storage = connect_storage(&config).await?;

    // === 2. Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Message bus (circuit breaker inside) ===
    let message_bus = Arc::new(RedpandaClient::new(RedpandaConfig {
        brokers: config.message_broker_host.clone(),
        topic: config.order_status_changed_topic.clone(),
        send_timeout: Duration::from_secs(5),
    })?);

    // === 4. Demo data ===
    let source = CancellationSource::new();
    let cancel = source.token();
    seed(&config, &storage, &cancel).await?;

    // === 5. Jobs and coordinator ===
    let dispatcher = Arc::new(OrderEventDispatcher::new(message_bus.clone()));
    let relay = OutboxRelay::<OrderEvent>::new(storage.outbox.clone(), dispatcher, config.outbox_batch_size);

    let jobs = Jobs {
        dispatch: DispatchJob::new(AssignOrdersHandler::new(storage.uow_factory.clone()), metrics.clone()),
        movement: MovementJob::new(MoveCouriersHandler::new(storage.uow_factory.clone()), metrics.clone()),
        outbox: OutboxJob::new(relay, metrics.clone()),
    };
    let schedule = Schedule {
        dispatch_interval: config.dispatch_interval,
        movement_interval: config.movement_interval,
        outbox_interval: config.outbox_interval,
    };

    let coordinator = Coordinator::start(
        schedule,
        jobs,
        DeliveryQueryService::new(storage.queries.clone()),
        Some(message_bus),
        metrics.clone(),
        cancel,
    );

    // === 6. Metrics HTTP server in its own thread and runtime ===
    let metrics_registry = Arc::new(metrics.registry().clone());
    let health_monitor = coordinator.health_monitor();
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to build metrics runtime: {}", e);
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, health_monitor, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 7. Run until Ctrl+C ===
    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;
    tracing::info!("🛑 Shutdown requested");

    source.cancel();
    coordinator.shutdown().await;

    tracing::info!("👋 Delivery dispatch service stopped");
    Ok(())
}

async fn connect_storage(config: &AppConfig) -> anyhow::Result<Storage> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; state is lost on exit");
            Ok(Storage::from_adapter(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let max_connections = config.database_max_connections;

            tracing::info!("Connecting to PostgreSQL...");
            let pool = retry_with_backoff("database_connect", RetryConfig::aggressive(), |_| {
                infrastructure::postgres::create_pool(url, max_connections)
            })
            .await
            .into_result()
            .context("Failed to connect to PostgreSQL")?;

            infrastructure::postgres::init_schema(&pool)
                .await
                .context("Failed to initialize database schema")?;

            Ok(Storage::from_adapter(PgStore::new(pool)))
        }
    }
}

async fn seed(config: &AppConfig, storage: &Storage, cancel: &CancellationToken) -> anyhow::Result<()> {
    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);

    let couriers = CreateCourierHandler::new(storage.uow_factory.clone(), random.clone());
    for n in 1..=config.seed_couriers {
        let command = CreateCourier {
            name: format!("Courier {}", n),
            speed: random.next_in_range(1, 3),
        };
        let courier_id = couriers.handle(command, cancel).await?;
        tracing::info!(courier_id = %courier_id, "Seeded courier");
    }

    let orders = CreateOrderHandler::new(
        storage.uow_factory.clone(),
        Arc::new(RandomGeoClient::new(random.clone())),
    );
    for _ in 0..config.seed_orders {
        let street = DEMO_STREETS[random.next_in_range(0, DEMO_STREETS.len() as i32 - 1) as usize];
        let command = CreateOrder {
            basket_id: uuid::Uuid::new_v4(),
            street: street.to_string(),
            volume: random.next_in_range(1, 10),
        };
        let order_id = orders.handle(command, cancel).await?;
        tracing::info!(order_id = %order_id, street, "Seeded order");
    }

    Ok(())
}
