//! API error types
//!
//! API errors are pass-through: they keep the code of the subsystem that
//! produced them (store, market, index) so a client sees the same code the
//! logs carry.
//!
//! Own codes:
//! - AGRO_INVALID_REQUEST (ERROR)
//! - AGRO_UNKNOWN_OPERATION (ERROR)
//! - AGRO_INTERNAL (ERROR)

use std::fmt;

use crate::index::IndexError;
use crate::market::MarketError;

/// API error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request failed; the market is unchanged
    Error,
    /// Market state is inconsistent
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// API-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Malformed JSON, missing fields or an oversized line
    AgroInvalidRequest,
    /// `op` names no operation
    AgroUnknownOperation,
    /// Response data could not be serialized
    AgroInternal,
}

impl ApiErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::AgroInvalidRequest => "AGRO_INVALID_REQUEST",
            ApiErrorCode::AgroUnknownOperation => "AGRO_UNKNOWN_OPERATION",
            ApiErrorCode::AgroInternal => "AGRO_INTERNAL",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// API error with the originating code preserved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    code: String,
    message: String,
    severity: Severity,
}

impl ApiError {
    fn own(code: ApiErrorCode, message: String) -> Self {
        Self {
            code: code.code().to_string(),
            message,
            severity: Severity::Error,
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::own(ApiErrorCode::AgroInvalidRequest, reason.into())
    }

    pub fn too_large(size: usize, limit: usize) -> Self {
        Self::own(
            ApiErrorCode::AgroInvalidRequest,
            format!("request of {} bytes exceeds limit of {}", size, limit),
        )
    }

    pub fn unknown_operation(op: impl Into<String>) -> Self {
        Self::own(
            ApiErrorCode::AgroUnknownOperation,
            format!("Unknown operation: {}", op.into()),
        )
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::own(ApiErrorCode::AgroInternal, reason.into())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Fatal)
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            severity: Severity::Error,
        }
    }
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self {
        Self {
            code: err.code().code().to_string(),
            message: format!("{}: {}", err.index(), err.message()),
            severity: Severity::Fatal,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, ProducerId};

    #[test]
    fn test_invalid_request_error() {
        let err = ApiError::invalid_request("missing field");
        assert_eq!(err.code(), "AGRO_INVALID_REQUEST");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unknown_operation_error() {
        let err = ApiError::unknown_operation("harvest");
        assert_eq!(err.code(), "AGRO_UNKNOWN_OPERATION");
        assert!(err.message().contains("harvest"));
    }

    #[test]
    fn test_market_error_passes_through() {
        let err: ApiError = MarketError::not_found(EntityKind::Producer, ProducerId(3)).into();
        assert_eq!(err.code(), "AGRO_NOT_FOUND");
        assert_eq!(err.message(), "producer 3 not found");
    }

    #[test]
    fn test_index_error_is_fatal() {
        let err: ApiError = IndexError::diverged("routes_by_dst_src", "stale").into();
        assert_eq!(err.code(), "AGRO_INDEX_DIVERGED");
        assert!(err.is_fatal());
    }
}
