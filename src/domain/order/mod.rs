// ============================================================================
// Order Domain
// ============================================================================
//
// - OrderStatus (Created -> Assigned -> Completed)
// - OrderEvent (OrderCompleted)
// - Order aggregate with its pending event queue
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod aggregate;

pub use value_objects::*;
pub use events::*;
pub use aggregate::*;
