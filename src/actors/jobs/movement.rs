use async_trait::async_trait;
use std::sync::Arc;

use crate::application::{CommandError, MoveCouriersHandler};
use crate::metrics::Metrics;
use crate::utils::CancellationToken;
use super::{CycleOutcome, Job};

pub struct MovementJob {
    handler: MoveCouriersHandler,
    metrics: Arc<Metrics>,
}

impl MovementJob {
    pub fn new(handler: MoveCouriersHandler, metrics: Arc<Metrics>) -> Self {
        Self { handler, metrics }
    }
}

#[async_trait]
impl Job for MovementJob {
    const NAME: &'static str = "movement";

    async fn run(&self, cancel: &CancellationToken) -> Result<CycleOutcome, CommandError> {
        let report = self.handler.handle(cancel).await?;

        if report.cancelled {
            return Ok(CycleOutcome::Cancelled);
        }
        if report.moved == 0 {
            return Ok(CycleOutcome::Idle);
        }

        self.metrics.orders_completed.inc_by(report.completed.len() as u64);
        Ok(CycleOutcome::Worked)
    }
}
