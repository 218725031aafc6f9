// ============================================================================
// Domain Layer - Dispatch and Fulfillment Rules
// ============================================================================
//
// - shared_kernel: Location value type and the injected random source
// - courier: StoragePlace + Courier aggregate
// - order: Order aggregate, status lifecycle and events
// - services: DispatchService (nearest capable courier)
// - errors: DomainError taxonomy shared by all of the above
//
// Nothing here touches storage, the clock of a scheduler, or the network.
//
// ============================================================================

pub mod errors;
pub mod shared_kernel;
pub mod courier;
pub mod order;
pub mod services;

pub use errors::DomainError;
