use async_trait::async_trait;

use crate::domain::order::OrderCompleted;
use crate::utils::CancellationToken;

/// Outbound integration events
#[async_trait]
pub trait MessageBusProducer: Send + Sync {
    async fn publish(&self, event: &OrderCompleted, cancel: &CancellationToken) -> anyhow::Result<()>;
}
