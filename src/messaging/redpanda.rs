use async_trait::async_trait;
use anyhow::{Context, Result};
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::order::OrderCompleted;
use crate::ports::MessageBusProducer;
use crate::utils::{CancellationToken, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};

// ============================================================================
// Redpanda Producer - order status integration events
// ============================================================================

/// Wire format consumed by downstream services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusChangedIntegrationEvent {
    pub event_id: Uuid,
    pub order_id: Uuid,
    pub order_status: String,
}

impl From<&OrderCompleted> for OrderStatusChangedIntegrationEvent {
    fn from(event: &OrderCompleted) -> Self {
        Self {
            event_id: event.event_id,
            order_id: event.order_id,
            order_status: event.status_name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedpandaConfig {
    pub brokers: String,
    pub topic: String,
    pub send_timeout: Duration,
}

pub struct RedpandaClient {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
    circuit_breaker: CircuitBreaker,
}

impl RedpandaClient {
    pub fn new(config: RedpandaConfig) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", config.send_timeout.as_millis().to_string())
            .set("enable.idempotence", "true")
            .create()
            .with_context(|| format!("Failed to create Redpanda producer for {}", config.brokers))?;

        let cb_config = CircuitBreakerConfig {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 3,
        };

        Ok(Self {
            producer,
            topic: config.topic,
            send_timeout: config.send_timeout,
            circuit_breaker: CircuitBreaker::new("message_bus", cb_config),
        })
    }

    pub async fn publish_raw(&self, key: &str, payload: &str) -> Result<()> {
        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(&self.topic).key(key).payload(payload);

                self.producer
                    .send(record, rdkafka::util::Timeout::After(self.send_timeout))
                    .await
                    .map_err(|(e, _)| anyhow::anyhow!("Kafka send error: {}", e))?;

                Ok::<(), anyhow::Error>(())
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(topic = %self.topic, key = %key, "Published to Redpanda");
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(topic = %self.topic, "Circuit breaker open - Redpanda unavailable");
                Err(anyhow::anyhow!("Circuit breaker open for Redpanda"))
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::error!(error = %e, topic = %self.topic, "Failed to publish to Redpanda");
                Err(e)
            }
        }
    }

    pub async fn get_circuit_breaker_state(&self) -> CircuitState {
        self.circuit_breaker.get_state().await
    }
}

#[async_trait]
impl MessageBusProducer for RedpandaClient {
    async fn publish(&self, event: &OrderCompleted, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            anyhow::bail!("publish cancelled before send");
        }

        let payload = serde_json::to_string(&OrderStatusChangedIntegrationEvent::from(event))
            .context("Failed to serialize integration event")?;
        self.publish_raw(&event.order_id.to_string(), &payload).await
    }
}
