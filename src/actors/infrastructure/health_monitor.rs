use kameo::Actor;
use kameo::message::{Context, Message};
use kameo::actor::ActorRef;
use kameo::error::Infallible;
use kameo::reply::{Reply, ReplyError};
use std::sync::Arc;
use std::collections::HashMap;
use std::time::Duration;
use chrono::Utc;
use crate::messaging::RedpandaClient;
use crate::metrics::Metrics;
use crate::utils::{CancellationToken, CircuitState};
use crate::actors::core::{HealthStatus, ComponentHealth};

// ============================================================================
// Health Monitor Actor - Aggregates component health
// ============================================================================
//
// Job actors push their status after every cycle; the message bus breaker is
// polled on a fixed interval. The aggregate is served on /health and exported
// as the `system_health_status` gauge.
//
// ============================================================================

const BREAKER_CHECK_INTERVAL: Duration = Duration::from_secs(10);

// ============================================================================
// Messages
// ============================================================================

pub struct UpdateHealth {
    pub component: String,
    pub status: HealthStatus,
    pub details: Option<String>,
}

pub struct GetSystemHealth;

#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub check_time: chrono::DateTime<Utc>,
}

impl Reply for SystemHealth {
    type Ok = Self;
    type Error = Infallible;
    type Value = Self;

    fn to_result(self) -> Result<Self, Infallible> {
        Ok(self)
    }

    fn into_any_err(self) -> Option<Box<dyn ReplyError>> {
        None
    }

    fn into_value(self) -> Self::Value {
        self
    }
}

// ============================================================================
// Health Monitor Actor
// ============================================================================

pub struct HealthMonitorActor {
    components: HashMap<String, ComponentHealth>,
    message_bus: Option<Arc<RedpandaClient>>,
    metrics: Arc<Metrics>,
    cancel: CancellationToken,
}

impl HealthMonitorActor {
    /// `message_bus` is `None` when publishing is disabled; no breaker is polled then
    pub fn new(
        message_bus: Option<Arc<RedpandaClient>>,
        metrics: Arc<Metrics>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            components: HashMap::new(),
            message_bus,
            metrics,
            cancel,
        }
    }

    fn compute_overall_status(&self) -> HealthStatus {
        let mut has_degraded = false;
        let mut unhealthy_components = Vec::new();

        for (name, health) in &self.components {
            match &health.status {
                HealthStatus::Unhealthy(msg) => {
                    unhealthy_components.push(format!("{}: {}", name, msg));
                }
                HealthStatus::Degraded(_) => {
                    has_degraded = true;
                }
                HealthStatus::Healthy => {}
            }
        }

        if !unhealthy_components.is_empty() {
            unhealthy_components.sort();
            HealthStatus::Unhealthy(unhealthy_components.join(", "))
        } else if has_degraded {
            HealthStatus::Degraded("Some components degraded".to_string())
        } else {
            HealthStatus::Healthy
        }
    }
}

fn breaker_health(state: CircuitState) -> HealthStatus {
    match state {
        CircuitState::Closed => HealthStatus::Healthy,
        CircuitState::HalfOpen => HealthStatus::Degraded("Circuit breaker half-open".to_string()),
        CircuitState::Open => HealthStatus::Unhealthy("Circuit breaker open".to_string()),
    }
}

impl Actor for HealthMonitorActor {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(
        state: Self::Args,
        actor_ref: ActorRef<Self>
    ) -> Result<Self, Self::Error> {
        tracing::info!("HealthMonitorActor started");

        if let Some(message_bus) = state.message_bus.clone() {
            let metrics = state.metrics.clone();
            let cancel = state.cancel.clone();

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(BREAKER_CHECK_INTERVAL);
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = interval.tick() => {}
                    }

                    let breaker = message_bus.get_circuit_breaker_state().await;
                    metrics.circuit_breaker_state.set(breaker.as_gauge());

                    // Fire and forget - use tell
                    let _ = actor_ref.tell(UpdateHealth {
                        component: "message_bus".to_string(),
                        status: breaker_health(breaker),
                        details: None,
                    }).send().await;
                }
                tracing::debug!("Breaker health checks stopped");
            });
        }

        Ok(state)
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<UpdateHealth> for HealthMonitorActor {
    type Reply = ();

    async fn handle(&mut self, msg: UpdateHealth, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        tracing::debug!(
            component = %msg.component,
            status = ?msg.status,
            "Updated component health"
        );

        let mut health = ComponentHealth::new(msg.component.clone(), msg.status);
        health.details = msg.details;
        self.components.insert(msg.component, health);

        self.metrics.system_health_status.set(self.compute_overall_status().as_gauge());
    }
}

impl Message<GetSystemHealth> for HealthMonitorActor {
    type Reply = SystemHealth;

    async fn handle(&mut self, _msg: GetSystemHealth, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        SystemHealth {
            overall_status: self.compute_overall_status(),
            components: self.components.clone(),
            check_time: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kameo::prelude::*;

    fn monitor() -> (HealthMonitorActor, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let actor = HealthMonitorActor::new(None, metrics.clone(), CancellationToken::none());
        (actor, metrics)
    }

    fn update(component: &str, status: HealthStatus) -> UpdateHealth {
        UpdateHealth { component: component.to_string(), status, details: None }
    }

    #[tokio::test]
    async fn test_empty_monitor_is_healthy() {
        let (actor, _) = monitor();
        let monitor = HealthMonitorActor::spawn(actor);

        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert_eq!(health.overall_status, HealthStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[tokio::test]
    async fn test_worst_component_wins() {
        let (actor, metrics) = monitor();
        let monitor = HealthMonitorActor::spawn(actor);

        monitor.tell(update("dispatch", HealthStatus::Healthy)).send().await.unwrap();
        monitor.tell(update("outbox", HealthStatus::Degraded("slow".into()))).send().await.unwrap();

        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert!(matches!(health.overall_status, HealthStatus::Degraded(_)));
        assert_eq!(metrics.system_health_status.get(), 1);

        monitor.tell(update("movement", HealthStatus::Unhealthy("db down".into()))).send().await.unwrap();

        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert_eq!(
            health.overall_status,
            HealthStatus::Unhealthy("movement: db down".to_string())
        );
        assert_eq!(health.components.len(), 3);
        assert_eq!(metrics.system_health_status.get(), 0);
    }

    #[tokio::test]
    async fn test_recovered_component_replaces_previous_status() {
        let (actor, metrics) = monitor();
        let monitor = HealthMonitorActor::spawn(actor);

        monitor.tell(update("dispatch", HealthStatus::Unhealthy("x".into()))).send().await.unwrap();
        monitor.tell(update("dispatch", HealthStatus::Healthy)).send().await.unwrap();

        let health = monitor.ask(GetSystemHealth).await.unwrap();
        assert_eq!(health.overall_status, HealthStatus::Healthy);
        assert_eq!(metrics.system_health_status.get(), 2);
    }

    #[test]
    fn test_breaker_state_mapping() {
        assert_eq!(breaker_health(CircuitState::Closed), HealthStatus::Healthy);
        assert!(matches!(breaker_health(CircuitState::HalfOpen), HealthStatus::Degraded(_)));
        assert!(matches!(breaker_health(CircuitState::Open), HealthStatus::Unhealthy(_)));
    }
}
