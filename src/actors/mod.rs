// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based scheduling for the periodic delivery processes.
//
// Structure:
// - core/           - Health types shared by every actor
// - jobs/           - The scheduled jobs (dispatch, movement, outbox relay)
// - infrastructure/ - Concrete actors (JobActor, HealthMonitor) and the Coordinator
//
// Note: Domain logic lives in the application handlers, NOT in actors.
//       Actors only decide when a handler runs and report how it went.
//
// ============================================================================

mod core;
mod infrastructure;
pub mod jobs;

pub use infrastructure::{Coordinator, Jobs, Schedule};
pub use jobs::{DispatchJob, MovementJob, OutboxJob};

pub(crate) use core::HealthStatus;
pub(crate) use infrastructure::{GetSystemHealth, HealthMonitorActor};
