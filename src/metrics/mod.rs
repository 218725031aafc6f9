// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// - Scheduled cycles by job and outcome, with durations
// - Delivery throughput (orders assigned and completed)
// - Outbox relay throughput and publish failures
// - Message bus circuit breaker state
// - Fleet gauges refreshed from read-side snapshots
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Scheduler
    pub cycles_total: IntCounterVec,
    pub cycle_duration: HistogramVec,

    // Delivery
    pub orders_assigned: IntCounter,
    pub orders_completed: IntCounter,

    // Outbox relay
    pub outbox_published: IntCounter,
    pub outbox_publish_failures: IntCounterVec,

    // Health
    pub circuit_breaker_state: IntGauge,
    pub system_health_status: IntGauge,

    // Fleet
    pub couriers_total: IntGauge,
    pub couriers_busy: IntGauge,
    pub orders_open: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cycles_total = IntCounterVec::new(
            Opts::new("dispatch_cycles_total", "Scheduled cycles by job and outcome"),
            &["job", "outcome"],
        )?;
        registry.register(Box::new(cycles_total.clone()))?;

        let cycle_duration = HistogramVec::new(
            HistogramOpts::new("dispatch_cycle_duration_seconds", "Scheduled cycle duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["job"],
        )?;
        registry.register(Box::new(cycle_duration.clone()))?;

        let orders_assigned = IntCounter::new("orders_assigned_total", "Orders matched with a courier")?;
        registry.register(Box::new(orders_assigned.clone()))?;

        let orders_completed = IntCounter::new("orders_completed_total", "Orders delivered")?;
        registry.register(Box::new(orders_completed.clone()))?;

        let outbox_published = IntCounter::new(
            "outbox_messages_published_total",
            "Outbox messages published to the message bus",
        )?;
        registry.register(Box::new(outbox_published.clone()))?;

        let outbox_publish_failures = IntCounterVec::new(
            Opts::new("outbox_publish_failures_total", "Outbox messages left pending after a pass"),
            &["reason"],
        )?;
        registry.register(Box::new(outbox_publish_failures.clone()))?;

        let circuit_breaker_state = IntGauge::new(
            "circuit_breaker_state",
            "Message bus circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        let system_health_status = IntGauge::new(
            "system_health_status",
            "Aggregated health (0=Unhealthy, 1=Degraded, 2=Healthy)",
        )?;
        registry.register(Box::new(system_health_status.clone()))?;

        let couriers_total = IntGauge::new("couriers_total", "Registered couriers")?;
        registry.register(Box::new(couriers_total.clone()))?;

        let couriers_busy = IntGauge::new("couriers_busy", "Couriers carrying at least one order")?;
        registry.register(Box::new(couriers_busy.clone()))?;

        let orders_open = IntGauge::new("orders_open", "Orders in Created or Assigned status")?;
        registry.register(Box::new(orders_open.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            cycle_duration,
            orders_assigned,
            orders_completed,
            outbox_published,
            outbox_publish_failures,
            circuit_breaker_state,
            system_health_status,
            couriers_total,
            couriers_busy,
            orders_open,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_cycle(&self, job: &str, outcome: &str, duration_secs: f64) {
        self.cycles_total.with_label_values(&[job, outcome]).inc();
        self.cycle_duration.with_label_values(&[job]).observe(duration_secs);
    }

    pub fn record_publish_failures(&self, reason: &str, count: usize) {
        if count > 0 {
            self.outbox_publish_failures.with_label_values(&[reason]).inc_by(count as u64);
        }
    }

    pub fn update_fleet(&self, couriers: usize, busy: usize, open_orders: usize) {
        self.couriers_total.set(couriers as i64);
        self.couriers_busy.set(busy as i64);
        self.orders_open.set(open_orders as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() > 0);
    }

    #[test]
    fn test_record_cycle() {
        let metrics = Metrics::new().unwrap();
        metrics.record_cycle("dispatch", "worked", 0.02);
        metrics.record_cycle("dispatch", "idle", 0.01);

        let gathered = metrics.registry.gather();
        let cycles = gathered.iter().find(|m| m.name() == "dispatch_cycles_total").unwrap();
        assert_eq!(cycles.metric.len(), 2);
    }

    #[test]
    fn test_zero_failures_are_not_recorded() {
        let metrics = Metrics::new().unwrap();
        metrics.record_publish_failures("publish", 0);
        metrics.record_publish_failures("decode", 2);

        let gathered = metrics.registry.gather();
        let failures = gathered.iter().find(|m| m.name() == "outbox_publish_failures_total").unwrap();
        assert_eq!(failures.metric.len(), 1);
        assert_eq!(failures.metric[0].counter.value, Some(2.0));
    }

    #[test]
    fn test_fleet_gauges() {
        let metrics = Metrics::new().unwrap();
        metrics.update_fleet(4, 1, 3);

        let gathered = metrics.registry.gather();
        let busy = gathered.iter().find(|m| m.name() == "couriers_busy").unwrap();
        assert_eq!(busy.metric[0].gauge.value, Some(1.0));
    }
}
