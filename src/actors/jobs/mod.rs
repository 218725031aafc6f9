use async_trait::async_trait;

use crate::application::CommandError;
use crate::utils::CancellationToken;

// ============================================================================
// Scheduled Jobs
// ============================================================================
//
// A job is one periodic process. JobActor runs it; the coordinator's ticker
// decides when. Jobs translate their use case's result into a cycle outcome
// and record their own domain counters.
//
// ============================================================================

mod dispatch;
mod movement;
mod outbox;

pub use dispatch::DispatchJob;
pub use movement::MovementJob;
pub use outbox::OutboxJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// State changed and was committed
    Worked,
    /// Nothing eligible this tick
    Idle,
    Cancelled,
    Failed,
}

impl CycleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleOutcome::Worked => "worked",
            CycleOutcome::Idle => "idle",
            CycleOutcome::Cancelled => "cancelled",
            CycleOutcome::Failed => "failed",
        }
    }
}

#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Metric label and log field
    const NAME: &'static str;

    async fn run(&self, cancel: &CancellationToken) -> Result<CycleOutcome, CommandError>;
}
