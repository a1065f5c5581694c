//! Index error types
//!
//! Error codes:
//! - AGRO_INDEX_PATH_OCCUPIED (FATAL)
//! - AGRO_INDEX_PATH_MISSING (FATAL)
//! - AGRO_INDEX_DIVERGED (FATAL)
//!
//! Indices are derived state. Every one of these errors means the derived
//! state no longer mirrors the primary tables, which is a programming error.

use std::fmt;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// System must halt immediately
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Insert hit a key path that already holds a value
    AgroIndexPathOccupied,
    /// Replace hit a key path that holds nothing
    AgroIndexPathMissing,
    /// Index content disagrees with the primary tables
    AgroIndexDiverged,
}

impl IndexErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::AgroIndexPathOccupied => "AGRO_INDEX_PATH_OCCUPIED",
            IndexErrorCode::AgroIndexPathMissing => "AGRO_INDEX_PATH_MISSING",
            IndexErrorCode::AgroIndexDiverged => "AGRO_INDEX_DIVERGED",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error with the index name and offending key path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexError {
    code: IndexErrorCode,
    index: &'static str,
    message: String,
}

impl IndexError {
    pub fn path_occupied(index: &'static str, path: impl fmt::Debug) -> Self {
        Self {
            code: IndexErrorCode::AgroIndexPathOccupied,
            index,
            message: format!("path {:?} already holds a value", path),
        }
    }

    pub fn path_missing(index: &'static str, path: impl fmt::Debug) -> Self {
        Self {
            code: IndexErrorCode::AgroIndexPathMissing,
            index,
            message: format!("path {:?} holds no value", path),
        }
    }

    pub fn diverged(index: &'static str, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::AgroIndexDiverged,
            index,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Name of the index that failed
    pub fn index(&self) -> &'static str {
        self.index
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} in {}: {}",
            self.code.severity(),
            self.code.code(),
            self.index,
            self.message
        )
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
