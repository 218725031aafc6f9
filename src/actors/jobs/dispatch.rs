use async_trait::async_trait;
use std::sync::Arc;

use crate::application::{AssignOrdersHandler, CommandError, DispatchOutcome};
use crate::metrics::Metrics;
use crate::utils::CancellationToken;
use super::{CycleOutcome, Job};

pub struct DispatchJob {
    handler: AssignOrdersHandler,
    metrics: Arc<Metrics>,
}

impl DispatchJob {
    pub fn new(handler: AssignOrdersHandler, metrics: Arc<Metrics>) -> Self {
        Self { handler, metrics }
    }
}

#[async_trait]
impl Job for DispatchJob {
    const NAME: &'static str = "dispatch";

    async fn run(&self, cancel: &CancellationToken) -> Result<CycleOutcome, CommandError> {
        let outcome = match self.handler.handle(cancel).await? {
            DispatchOutcome::Assigned { .. } => {
                self.metrics.orders_assigned.inc();
                CycleOutcome::Worked
            }
            DispatchOutcome::Cancelled => CycleOutcome::Cancelled,
            DispatchOutcome::NoCreatedOrder
            | DispatchOutcome::NoFreeCourier
            | DispatchOutcome::NoAvailableCourier { .. } => CycleOutcome::Idle,
        };
        Ok(outcome)
    }
}
