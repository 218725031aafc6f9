use uuid::Uuid;

use crate::utils::IsTransient;

// ============================================================================
// Storage Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The row changed since it was loaded; reload and retry
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: &'static str, id: Uuid },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: Uuid },

    /// A stored row no longer satisfies domain rules
    #[error("stored {entity} is corrupt: {reason}")]
    Corrupt { entity: &'static str, reason: String },

    #[error("unit of work already completed")]
    Closed,

    #[error("failed to serialize domain event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// Postgres SQLSTATE codes for serialization_failure and deadlock_detected
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

impl IsTransient for StorageError {
    fn is_transient(&self) -> bool {
        match self {
            StorageError::Conflict { .. } => true,
            StorageError::Database(sqlx::Error::Database(db)) => db
                .code()
                .as_deref()
                .map_or(false, |code| RETRYABLE_SQLSTATES.contains(&code)),
            StorageError::Database(sqlx::Error::Io(_))
            | StorageError::Database(sqlx::Error::PoolTimedOut) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_transient() {
        let error = StorageError::Conflict { entity: "courier", id: Uuid::new_v4() };
        assert!(error.is_transient());
    }

    #[test]
    fn test_corrupt_row_is_permanent() {
        let error = StorageError::Corrupt { entity: "order", reason: "bad status".into() };
        assert!(!error.is_transient());
        assert!(!StorageError::Closed.is_transient());
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        assert!(StorageError::Database(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!StorageError::Database(sqlx::Error::RowNotFound).is_transient());
    }
}
