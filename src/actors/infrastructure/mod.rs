// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// - Job actors: one per scheduled process
// - Health monitoring
// - Coordination and shutdown
//
// ============================================================================

// Private module declarations
mod health_monitor;
mod job_actor;
mod coordinator;

// Re-export for public API
pub use health_monitor::{HealthMonitorActor, UpdateHealth, GetSystemHealth, SystemHealth};
pub use job_actor::{JobActor, RunCycle, CycleReport};
pub use coordinator::{Coordinator, Jobs, Schedule};
