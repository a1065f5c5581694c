//! Market participants: producers, transporters and retailers
//!
//! Participants own nested collections of their listings and reservations,
//! keyed by entity id.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::RegionDoc;
use super::ids::{
    InventoryId, ProducerId, RegionId, ReservedInventoryId, ReservedRouteId, RetailerId, RouteId,
    TransporterId,
};
use super::inventory::{InventoryDoc, ReservedInventoryDoc, ReservedInventoryInfo};
use super::route::{ReservedRouteDoc, ReservedRouteInfo, RouteDoc};

/// A producer's listings, keyed by listing id
pub type InventoryMap = BTreeMap<InventoryId, Arc<InventoryDoc>>;

/// Public view of a producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerInfo {
    pub id: ProducerId,
    pub name: String,
    pub region_id: RegionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerDoc {
    pub id: ProducerId,
    pub name: String,
    pub region: Arc<RegionDoc>,
    /// Shared with the inventory-by-region index entry for this producer
    pub inventory: Arc<InventoryMap>,
    pub reservations: BTreeMap<ReservedInventoryId, Arc<ReservedInventoryDoc>>,
}

impl ProducerDoc {
    pub fn to_info(&self) -> ProducerInfo {
        ProducerInfo {
            id: self.id,
            name: self.name.clone(),
            region_id: self.region.id,
        }
    }

    /// Copy of this producer holding `inventory` instead of its current listings
    pub fn with_inventory(&self, inventory: InventoryMap) -> Self {
        Self {
            inventory: Arc::new(inventory),
            ..self.clone()
        }
    }
}

/// Public view of a transporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransporterInfo {
    pub id: TransporterId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransporterDoc {
    pub id: TransporterId,
    pub name: String,
    pub routes: BTreeMap<RouteId, Arc<RouteDoc>>,
    pub reservations: BTreeMap<ReservedRouteId, Arc<ReservedRouteDoc>>,
}

impl TransporterDoc {
    pub fn to_info(&self) -> TransporterInfo {
        TransporterInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Public view of a retailer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerInfo {
    pub id: RetailerId,
    pub name: String,
    pub region_id: RegionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetailerDoc {
    pub id: RetailerId,
    pub name: String,
    pub region: Arc<RegionDoc>,
    pub inventory_reservations: BTreeMap<ReservedInventoryId, Arc<ReservedInventoryDoc>>,
    pub route_reservations: BTreeMap<ReservedRouteId, Arc<ReservedRouteDoc>>,
}

impl RetailerDoc {
    pub fn to_info(&self) -> RetailerInfo {
        RetailerInfo {
            id: self.id,
            name: self.name.clone(),
            region_id: self.region.id,
        }
    }
}

/// Both reservation collections of one retailer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerReservations {
    pub inventory: Vec<ReservedInventoryInfo>,
    pub routes: Vec<ReservedRouteInfo>,
}
