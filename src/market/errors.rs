//! Market error types
//!
//! Not-found and infeasible outcomes are distinct variants so callers can
//! tell "that id does not exist" apart from "nothing satisfies the request".
//! Broken index invariants are not represented here: they abort.

use thiserror::Error;

use crate::model::{Day, EntityId, EntityKind};
use crate::store::StoreError;

/// Result type for market operations
pub type MarketResult<T> = Result<T, MarketError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    /// An id argument names no entity
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    /// Info→Doc conversion rejected the entity
    #[error(transparent)]
    Referential(StoreError),

    /// Region, date, grade, quantity or availability constraints failed
    #[error("infeasible: {0}")]
    Infeasible(String),

    #[error("invalid date window [{begin}, {end}]")]
    InvalidWindow { begin: Day, end: Day },

    #[error("requested quantity must be positive")]
    InvalidQuantity,
}

impl MarketError {
    pub fn not_found(kind: EntityKind, id: impl EntityId) -> Self {
        MarketError::NotFound { kind, id: id.raw() }
    }

    pub fn infeasible(reason: impl Into<String>) -> Self {
        MarketError::Infeasible(reason.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            MarketError::NotFound { .. } => "AGRO_NOT_FOUND",
            MarketError::Referential(inner) => inner.code(),
            MarketError::Infeasible(_) => "AGRO_INFEASIBLE",
            MarketError::InvalidWindow { .. } => "AGRO_INVALID_WINDOW",
            MarketError::InvalidQuantity => "AGRO_INVALID_QUANTITY",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MarketError::NotFound { .. })
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self, MarketError::Infeasible(_))
    }
}

impl From<StoreError> for MarketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => MarketError::NotFound { kind, id },
            other => MarketError::Referential(other),
        }
    }
}
