// ============================================================================
// Shared Kernel - value types used by both aggregates
// ============================================================================

pub mod location;
pub mod random;

pub use location::*;
pub use random::{RandomSource, ThreadRandom};
