//! Entity store subsystem for agromart
//!
//! A single generic table type, instantiated once per entity kind.

mod errors;
mod table;

pub use errors::{StoreError, StoreResult};
pub use table::EntityStore;
