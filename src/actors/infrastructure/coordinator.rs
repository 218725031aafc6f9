use futures_util::future::join_all;
use kameo::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use crate::actors::jobs::{DispatchJob, Job, MovementJob, OutboxJob};
use crate::application::DeliveryQueryService;
use crate::messaging::RedpandaClient;
use crate::metrics::Metrics;
use crate::utils::CancellationToken;
use super::health_monitor::{GetSystemHealth, HealthMonitorActor};
use super::job_actor::{JobActor, RunCycle};

// ============================================================================
// Coordinator - owns the schedule
// ============================================================================
//
// Actor Hierarchy:
//   Coordinator
//   ├── HealthMonitorActor
//   ├── JobActor<DispatchJob>   (every DISPATCH_INTERVAL_MS)
//   ├── JobActor<MovementJob>   (every MOVEMENT_INTERVAL_MS)
//   └── JobActor<OutboxJob>     (every OUTBOX_INTERVAL_MS)
//
// Each job has its own ticker task. A ticker asks for one cycle and waits for
// the reply before the next tick, so a job never overlaps itself while the
// three jobs run independently of each other.
//
// ============================================================================

const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Schedule {
    pub dispatch_interval: Duration,
    pub movement_interval: Duration,
    pub outbox_interval: Duration,
}

pub struct Jobs {
    pub dispatch: DispatchJob,
    pub movement: MovementJob,
    pub outbox: OutboxJob,
}

pub struct Coordinator {
    health_monitor: ActorRef<HealthMonitorActor>,
    dispatch: ActorRef<JobActor<DispatchJob>>,
    movement: ActorRef<JobActor<MovementJob>>,
    outbox: ActorRef<JobActor<OutboxJob>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Coordinator {
    pub fn start(
        schedule: Schedule,
        jobs: Jobs,
        queries: DeliveryQueryService,
        message_bus: Option<Arc<RedpandaClient>>,
        metrics: Arc<Metrics>,
        cancel: CancellationToken,
    ) -> Self {
        tracing::info!(?schedule, "Starting supervised actors");

        let health_monitor = HealthMonitorActor::spawn(HealthMonitorActor::new(
            message_bus,
            metrics.clone(),
            cancel.clone(),
        ));

        let dispatch = JobActor::spawn(JobActor::new(
            jobs.dispatch,
            metrics.clone(),
            health_monitor.clone(),
            cancel.clone(),
        ));
        let movement = JobActor::spawn(JobActor::new(
            jobs.movement,
            metrics.clone(),
            health_monitor.clone(),
            cancel.clone(),
        ));
        let outbox = JobActor::spawn(JobActor::new(
            jobs.outbox,
            metrics.clone(),
            health_monitor.clone(),
            cancel.clone(),
        ));

        let tasks = vec![
            spawn_ticker(dispatch.clone(), schedule.dispatch_interval, cancel.clone()),
            spawn_ticker(movement.clone(), schedule.movement_interval, cancel.clone()),
            spawn_ticker(outbox.clone(), schedule.outbox_interval, cancel.clone()),
            spawn_snapshots(health_monitor.clone(), queries, metrics, cancel),
        ];

        tracing::info!("✅ All supervised actors started successfully");

        Self {
            health_monitor,
            dispatch,
            movement,
            outbox,
            tasks,
        }
    }

    pub fn health_monitor(&self) -> ActorRef<HealthMonitorActor> {
        self.health_monitor.clone()
    }

    /// Wait for the tickers to observe cancellation, then stop the actors.
    ///
    /// A cycle in flight completes its current write before its ticker exits.
    pub async fn shutdown(self) {
        tracing::info!("Waiting for in-flight cycles");

        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Scheduler task ended abnormally");
            }
        }

        let _ = self.dispatch.stop_gracefully().await;
        let _ = self.movement.stop_gracefully().await;
        let _ = self.outbox.stop_gracefully().await;
        let _ = self.health_monitor.stop_gracefully().await;

        tracing::info!("Coordinator stopped");
    }
}

fn spawn_ticker<J: Job>(
    actor: ActorRef<JobActor<J>>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            match actor.ask(RunCycle).await {
                Ok(report) => tracing::trace!(
                    job = report.job,
                    outcome = report.outcome.as_str(),
                    duration_ms = report.duration.as_millis() as u64,
                    "Cycle finished"
                ),
                Err(_) => {
                    tracing::error!(job = J::NAME, "Job actor unreachable, stopping ticker");
                    break;
                }
            }
        }

        tracing::info!(job = J::NAME, "Ticker stopped");
    })
}

/// Periodic health log line plus fleet gauges
fn spawn_snapshots(
    health_monitor: ActorRef<HealthMonitorActor>,
    queries: DeliveryQueryService,
    metrics: Arc<Metrics>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SNAPSHOT_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            match queries.snapshot().await {
                Ok(snapshot) => {
                    metrics.update_fleet(snapshot.couriers, snapshot.busy_couriers, snapshot.open_orders);
                    tracing::info!(
                        couriers = snapshot.couriers,
                        busy = snapshot.busy_couriers,
                        open_orders = snapshot.open_orders,
                        "Fleet snapshot"
                    );
                }
                Err(e) => tracing::warn!(error = %e, "Fleet snapshot failed"),
            }

            if let Ok(health) = health_monitor.ask(GetSystemHealth).await {
                tracing::info!(
                    status = health.overall_status.label(),
                    components = health.components.len(),
                    "System health check"
                );
            }
        }
    })
}
