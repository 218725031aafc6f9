use anyhow::{bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Configuration - environment variables, `.env` loaded by main
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("unknown storage backend '{}' (expected postgres or memory)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    /// Required for the postgres backend only
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub message_broker_host: String,
    pub order_status_changed_topic: String,
    pub dispatch_interval: Duration,
    pub movement_interval: Duration,
    pub outbox_interval: Duration,
    pub outbox_batch_size: usize,
    pub metrics_port: u16,
    pub seed_couriers: usize,
    pub seed_orders: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse().context("STORAGE_BACKEND")?,
            None => StorageBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND=postgres");
        }

        Ok(Self {
            storage_backend,
            database_url,
            database_max_connections: positive_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            message_broker_host: lookup("MESSAGE_BROKER_HOST")
                .unwrap_or_else(|| "127.0.0.1:9092".to_string()),
            order_status_changed_topic: lookup("ORDER_STATUS_CHANGED_TOPIC")
                .unwrap_or_else(|| "order.status.changed".to_string()),
            dispatch_interval: millis_or(&lookup, "DISPATCH_INTERVAL_MS", 1000)?,
            movement_interval: millis_or(&lookup, "MOVEMENT_INTERVAL_MS", 2000)?,
            outbox_interval: millis_or(&lookup, "OUTBOX_INTERVAL_MS", 5000)?,
            outbox_batch_size: positive_or(&lookup, "OUTBOX_BATCH_SIZE", 20)?,
            metrics_port: parse_or(&lookup, "METRICS_PORT", 9090)?,
            seed_couriers: parse_or(&lookup, "SEED_COURIERS", 0)?,
            seed_orders: parse_or(&lookup, "SEED_ORDERS", 0)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

/// Like `parse_or`, but zero is rejected
fn positive_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: T = parse_or(lookup, key, default)?;
    if value == T::default() {
        bail!("{} must be greater than zero", key);
    }
    Ok(value)
}

fn millis_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    positive_or(lookup, key, default).map(Duration::from_millis)
}
