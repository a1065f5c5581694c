//! Secondary index subsystem for agromart
//!
//! Indices are derived, in-memory-only state kept in lockstep with the
//! primary entity tables.
//!
//! # Design Principles
//!
//! - Derived state: indices mirror the tables, never the source of truth
//! - Sparse: absent key paths hold no intermediate levels
//! - Deterministic: BTreeMap iteration order at every level
//!
//! # Invariants
//!
//! - Inserts only ever target fresh key paths
//! - Every index error is FATAL

mod errors;
mod sparse;

pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use sparse::{SparseMap2, SparseMap3};
