use kameo::Actor;
use kameo::message::{Context, Message};
use kameo::actor::ActorRef;
use kameo::error::Infallible;
use kameo::reply::{Reply, ReplyError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use crate::actors::core::HealthStatus;
use crate::actors::jobs::{CycleOutcome, Job};
use crate::metrics::Metrics;
use crate::utils::{retry_on_transient, CancellationToken, RetryConfig};
use super::health_monitor::{HealthMonitorActor, UpdateHealth};

// ============================================================================
// Job Actor - runs one scheduled job, one cycle at a time
// ============================================================================
//
// The mailbox serializes cycles, so a slow cycle delays the next tick instead
// of overlapping with it. Transient storage failures (version conflicts,
// serialization aborts) are retried within the cycle; anything else fails the
// cycle and is reported to the health monitor.
//
// ============================================================================

/// Consecutive failed cycles before the job reports itself unhealthy
const UNHEALTHY_AFTER: u32 = 3;

pub struct RunCycle;

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub job: &'static str,
    pub outcome: CycleOutcome,
    pub duration: Duration,
    pub error: Option<String>,
}

impl Reply for CycleReport {
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

pub struct JobActor<J: Job> {
    job: J,
    metrics: Arc<Metrics>,
    health: ActorRef<HealthMonitorActor>,
    cancel: CancellationToken,
    consecutive_failures: u32,
}

impl<J: Job> JobActor<J> {
    pub fn new(
        job: J,
        metrics: Arc<Metrics>,
        health: ActorRef<HealthMonitorActor>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            job,
            metrics,
            health,
            cancel,
            consecutive_failures: 0,
        }
    }

    fn health_after(&mut self, error: Option<&str>) -> HealthStatus {
        match error {
            None => {
                self.consecutive_failures = 0;
                HealthStatus::Healthy
            }
            Some(reason) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= UNHEALTHY_AFTER {
                    HealthStatus::Unhealthy(format!(
                        "{} consecutive failures, last: {}",
                        self.consecutive_failures, reason
                    ))
                } else {
                    HealthStatus::Degraded(reason.to_string())
                }
            }
        }
    }
}

impl<J: Job> Actor for JobActor<J> {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(
        state: Self::Args,
        _actor_ref: ActorRef<Self>
    ) -> Result<Self, Self::Error> {
        tracing::info!(job = J::NAME, "JobActor started");

        let _ = state.health.tell(UpdateHealth {
            component: J::NAME.to_string(),
            status: HealthStatus::Healthy,
            details: Some("started".to_string()),
        }).send().await;

        Ok(state)
    }
}

impl<J: Job> Message<RunCycle> for JobActor<J> {
    type Reply = CycleReport;

    async fn handle(&mut self, _msg: RunCycle, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let started = Instant::now();

        let job = &self.job;
        let cancel = &self.cancel;
        let result = retry_on_transient(J::NAME, RetryConfig::conservative(), |_| job.run(cancel))
            .await
            .into_result();

        let duration = started.elapsed();
        let (outcome, error) = match result {
            Ok(outcome) => (outcome, None),
            Err(e) => {
                tracing::error!(job = J::NAME, error = %e, "Cycle failed");
                (CycleOutcome::Failed, Some(e.to_string()))
            }
        };

        self.metrics.record_cycle(J::NAME, outcome.as_str(), duration.as_secs_f64());

        match outcome {
            CycleOutcome::Worked => tracing::debug!(job = J::NAME, ?duration, "Cycle committed work"),
            CycleOutcome::Idle => tracing::trace!(job = J::NAME, "Cycle idle"),
            CycleOutcome::Cancelled => tracing::info!(job = J::NAME, "Cycle cancelled"),
            CycleOutcome::Failed => {}
        }

        let status = self.health_after(error.as_deref());
        let _ = self.health.tell(UpdateHealth {
            component: J::NAME.to_string(),
            status,
            details: error.clone(),
        }).send().await;

        CycleReport {
            job: J::NAME,
            outcome,
            duration,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::infrastructure::health_monitor::GetSystemHealth;
    use crate::application::CommandError;
    use crate::ports::StorageError;
    use async_trait::async_trait;
    use kameo::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    /// Scripted job: fails with the given error for the first `failures` runs
    struct ScriptedJob {
        runs: Arc<AtomicU32>,
        failures: u32,
        transient: bool,
    }

    #[async_trait]
    impl Job for ScriptedJob {
        const NAME: &'static str = "scripted";

        async fn run(&self, _cancel: &CancellationToken) -> Result<CycleOutcome, CommandError> {
            let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            if run <= self.failures {
                let error = if self.transient {
                    StorageError::Conflict { entity: "courier", id: Uuid::nil() }
                } else {
                    StorageError::Closed
                };
                return Err(error.into());
            }
            Ok(CycleOutcome::Worked)
        }
    }

    async fn spawn_job(
        failures: u32,
        transient: bool,
    ) -> (ActorRef<JobActor<ScriptedJob>>, ActorRef<HealthMonitorActor>, Arc<AtomicU32>, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let health = HealthMonitorActor::spawn(HealthMonitorActor::new(
            None,
            metrics.clone(),
            CancellationToken::none(),
        ));
        let runs = Arc::new(AtomicU32::new(0));
        let job = ScriptedJob { runs: runs.clone(), failures, transient };
        let actor = JobActor::spawn(JobActor::new(job, metrics.clone(), health.clone(), CancellationToken::none()));
        (actor, health, runs, metrics)
    }

    #[tokio::test]
    async fn test_successful_cycle_is_recorded() {
        let (actor, _health, runs, metrics) = spawn_job(0, false).await;

        let report = actor.ask(RunCycle).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::Worked);
        assert!(report.error.is_none());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.cycles_total.with_label_values(&["scripted", "worked"]).get(), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_within_cycle() {
        let (actor, _health, runs, _metrics) = spawn_job(1, true).await;

        let report = actor.ask(RunCycle).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::Worked);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_degrades_then_unhealthy() {
        let (actor, health, runs, metrics) = spawn_job(u32::MAX, false).await;

        let report = actor.ask(RunCycle).await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::Failed);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let status = health.ask(GetSystemHealth).await.unwrap();
        assert!(matches!(status.overall_status, HealthStatus::Degraded(_)));

        actor.ask(RunCycle).await.unwrap();
        actor.ask(RunCycle).await.unwrap();

        let status = health.ask(GetSystemHealth).await.unwrap();
        assert!(matches!(status.overall_status, HealthStatus::Unhealthy(_)));
        assert_eq!(metrics.cycles_total.with_label_values(&["scripted", "failed"]).get(), 3);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let (actor, health, _runs, _metrics) = spawn_job(2, false).await;

        actor.ask(RunCycle).await.unwrap();
        actor.ask(RunCycle).await.unwrap();
        let report = actor.ask(RunCycle).await.unwrap();
        assert_eq!(report.outcome, CycleOutcome::Worked);

        let status = health.ask(GetSystemHealth).await.unwrap();
        assert_eq!(status.overall_status, HealthStatus::Healthy);
    }
}
