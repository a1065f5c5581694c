//! Entity store errors

use thiserror::Error;

use crate::model::EntityKind;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The id does not name a document in this store
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    /// Info→Doc conversion found a foreign key with no target
    #[error("{kind}.{field} references missing id {id}")]
    ReferentialViolation {
        kind: EntityKind,
        field: &'static str,
        id: u64,
    },

    /// Info→Doc conversion found a field that cannot form a valid doc
    #[error("malformed {kind}: {reason}")]
    Malformed { kind: EntityKind, reason: String },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "AGRO_NOT_FOUND",
            StoreError::ReferentialViolation { .. } => "AGRO_REFERENTIAL_VIOLATION",
            StoreError::Malformed { .. } => "AGRO_MALFORMED_ENTITY",
        }
    }
}
