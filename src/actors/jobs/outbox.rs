use async_trait::async_trait;
use std::sync::Arc;

use crate::application::CommandError;
use crate::domain::order::OrderEvent;
use crate::metrics::Metrics;
use crate::outbox::OutboxRelay;
use crate::utils::CancellationToken;
use super::{CycleOutcome, Job};

pub struct OutboxJob {
    relay: OutboxRelay<OrderEvent>,
    metrics: Arc<Metrics>,
}

impl OutboxJob {
    pub fn new(relay: OutboxRelay<OrderEvent>, metrics: Arc<Metrics>) -> Self {
        Self { relay, metrics }
    }
}

#[async_trait]
impl Job for OutboxJob {
    const NAME: &'static str = "outbox";

    async fn run(&self, cancel: &CancellationToken) -> Result<CycleOutcome, CommandError> {
        if cancel.is_cancelled() {
            return Ok(CycleOutcome::Cancelled);
        }

        let report = self.relay.process(cancel).await?;

        self.metrics.outbox_published.inc_by(report.published as u64);
        self.metrics.record_publish_failures("publish", report.failed);
        self.metrics.record_publish_failures("decode", report.undecodable);

        Ok(if report.is_idle() { CycleOutcome::Idle } else { CycleOutcome::Worked })
    }
}
