// ============================================================================
// Courier Domain
// ============================================================================
//
// - StoragePlace (single-slot capacity unit)
// - Courier aggregate (movement, order intake and release)
//
// ============================================================================

pub mod storage_place;
pub mod aggregate;

pub use storage_place::*;
pub use aggregate::*;
