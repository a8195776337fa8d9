use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use super::record::EntityKind;
use crate::models::ValidationError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or migrated. Fatal at startup.
    #[error("storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("{kind} {id} already exists")]
    DuplicateKey { kind: EntityKind, id: Uuid },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored {kind} row could not be decoded: {source}")]
    Corrupt {
        kind: EntityKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("store task is no longer running")]
    Closed,
}

impl StoreError {
    /// Uniqueness and relationship failures. The caller may resolve these by
    /// merging instead of inserting.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateKey { .. } | StoreError::ConstraintViolation(_)
        )
    }

    /// No valid state can be presented without the store.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_is_a_constraint_violation() {
        let err = StoreError::DuplicateKey {
            kind: EntityKind::Guest,
            id: Uuid::nil(),
        };
        assert!(err.is_constraint_violation());
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "guest 00000000-0000-0000-0000-000000000000 already exists"
        );
    }

    #[test]
    fn test_storage_unavailable_is_fatal() {
        let err = StoreError::StorageUnavailable {
            path: PathBuf::from("/nope/weddmate.db"),
            reason: "permission denied".into(),
        };
        assert!(err.is_fatal());
        assert!(!err.is_constraint_violation());
        assert!(err.to_string().contains("/nope/weddmate.db"));
    }
}
