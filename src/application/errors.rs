use crate::domain::DomainError;
use crate::ports::StorageError;
use crate::utils::IsTransient;

// ============================================================================
// Command Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("domain rule violated: {0}")]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("geo lookup failed: {0:#}")]
    Geo(anyhow::Error),

    #[error("operation cancelled")]
    Cancelled,
}

impl IsTransient for CommandError {
    fn is_transient(&self) -> bool {
        match self {
            CommandError::Storage(e) => e.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_only_storage_conflicts_are_transient() {
        let conflict = CommandError::from(StorageError::Conflict { entity: "order", id: Uuid::new_v4() });
        assert!(conflict.is_transient());

        assert!(!CommandError::from(DomainError::NotAssigned).is_transient());
        assert!(!CommandError::Cancelled.is_transient());
        assert!(!CommandError::Geo(anyhow::anyhow!("timeout")).is_transient());
    }
}
