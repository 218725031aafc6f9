use uuid::Uuid;

// ============================================================================
// Domain Business Rule Errors
// ============================================================================
//
// Returned as values from every aggregate and domain service operation.
// Use cases decide whether a failure aborts the transaction or just turns
// the current cycle into a no-op.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Value is required: {0}")]
    MissingValue(&'static str),

    #[error("Value is invalid: {0}")]
    InvalidValue(&'static str),

    #[error("Order is already assigned to a courier")]
    AlreadyAssigned,

    #[error("Order is not assigned to a courier")]
    NotAssigned,

    #[error("All storage places are full")]
    AllStoragePlacesFull,

    #[error("Storage place is occupied or too small for the order")]
    OccupiedOrTooSmall,

    #[error("Storage place is empty")]
    Empty,

    #[error("Storage place holds order {held}, not {requested}")]
    HoldsDifferentOrder { held: Uuid, requested: Uuid },

    #[error("No storage place holds order {0}")]
    StoragePlaceDoesNotStoreThisOrder(Uuid),

    #[error("No available courier for the order")]
    NoAvailableCourier,
}
