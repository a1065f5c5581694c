//! agromart - an in-memory marketplace matching produce to delivery routes
//!
//! Producers list inventory, transporters offer routes between regions, and
//! retailers reserve a listing together with a route that brings it to them.
//!
//! - `model`: public Info records and internal Doc records
//! - `store`: the generic per-kind entity table
//! - `index`: sparse multi-level index maps
//! - `market`: the tables, indices, queries and reservations
//! - `api`: JSON request dispatch
//! - `cli`: the `agromart` binary

pub mod api;
pub mod cli;
pub mod index;
pub mod market;
pub mod model;
pub mod observability;
pub mod store;
