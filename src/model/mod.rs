//! Entity model for agromart
//!
//! Every entity kind has two representations:
//!
//! - **Info**: the public DTO. Scalars and foreign-key ids only.
//! - **Doc**: the internal record. Referenced docs are embedded as shared
//!   `Arc` handles so reads never need a second lookup.
//!
//! Docs are immutable once built. A change produces a new doc, and every
//! holder of the old one (owner collections, indices) is refreshed in the
//! same market operation.

mod catalog;
mod ids;
mod inventory;
mod parties;
mod route;
mod window;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use catalog::{ProduceDoc, ProduceInfo, RegionDoc, RegionInfo, TruckTypeDoc, TruckTypeInfo};
pub use ids::{
    EntityId, InventoryId, ProduceId, ProducerId, RegionId, ReservedInventoryId, ReservedRouteId,
    RetailerId, RouteId, TransporterId, TruckTypeId,
};
pub use inventory::{
    InventoryDoc, InventoryInfo, NewInventory, ReservedInventoryDoc, ReservedInventoryInfo,
};
pub use parties::{
    InventoryMap, ProducerDoc, ProducerInfo, RetailerDoc, RetailerInfo, RetailerReservations,
    TransporterDoc, TransporterInfo,
};
pub use route::{NewRoute, ReservedRouteDoc, ReservedRouteInfo, RouteDoc, RouteInfo};
pub use window::{Availability, DateWindow, Day};

/// The ten entity kinds held by the market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    TruckType,
    Region,
    Produce,
    Producer,
    Transporter,
    Retailer,
    Inventory,
    ReservedInventory,
    Route,
    ReservedRoute,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::TruckType => "truck_type",
            EntityKind::Region => "region",
            EntityKind::Produce => "produce",
            EntityKind::Producer => "producer",
            EntityKind::Transporter => "transporter",
            EntityKind::Retailer => "retailer",
            EntityKind::Inventory => "inventory",
            EntityKind::ReservedInventory => "reserved_inventory",
            EntityKind::Route => "route",
            EntityKind::ReservedRoute => "reserved_route",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
