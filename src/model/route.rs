//! Delivery routes and route reservations

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::{RegionDoc, TruckTypeDoc};
use super::ids::{RegionId, ReservedRouteId, RetailerId, RouteId, TransporterId, TruckTypeId};
use super::window::{Availability, DateWindow, Day};

/// Public view of a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub id: RouteId,
    pub transporter_id: TransporterId,
    pub truck_type_id: TruckTypeId,
    pub start_region_id: RegionId,
    pub end_region_id: RegionId,
    pub start_date: Day,
    pub end_date: Day,
    pub cost: u64,
    pub available: bool,
}

/// Caller-supplied fields of a new route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoute {
    pub truck_type_id: TruckTypeId,
    pub start_region_id: RegionId,
    pub end_region_id: RegionId,
    pub start_date: Day,
    pub end_date: Day,
    pub cost: u64,
}

impl NewRoute {
    pub fn into_info(self, id: RouteId, transporter_id: TransporterId) -> RouteInfo {
        RouteInfo {
            id,
            transporter_id,
            truck_type_id: self.truck_type_id,
            start_region_id: self.start_region_id,
            end_region_id: self.end_region_id,
            start_date: self.start_date,
            end_date: self.end_date,
            cost: self.cost,
            available: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDoc {
    pub id: RouteId,
    pub transporter_id: TransporterId,
    pub truck_type: Arc<TruckTypeDoc>,
    pub start_region: Arc<RegionDoc>,
    pub end_region: Arc<RegionDoc>,
    pub window: DateWindow,
    pub cost: u64,
    pub availability: Availability,
}

impl RouteDoc {
    pub fn to_info(&self) -> RouteInfo {
        RouteInfo {
            id: self.id,
            transporter_id: self.transporter_id,
            truck_type_id: self.truck_type.id,
            start_region_id: self.start_region.id,
            end_region_id: self.end_region.id,
            start_date: self.window.start(),
            end_date: self.window.end(),
            cost: self.cost,
            available: self.availability.is_available(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    pub fn reserved(&self) -> Self {
        Self {
            availability: Availability::Reserved,
            ..self.clone()
        }
    }
}

/// Public view of a route reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedRouteInfo {
    pub id: ReservedRouteId,
    pub route_id: RouteId,
    pub retailer_id: RetailerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedRouteDoc {
    pub id: ReservedRouteId,
    pub retailer_id: RetailerId,
    /// Route as it was when the reservation was taken
    pub route: Arc<RouteDoc>,
}

impl ReservedRouteDoc {
    pub fn to_info(&self) -> ReservedRouteInfo {
        ReservedRouteInfo {
            id: self.id,
            route_id: self.route.id,
            retailer_id: self.retailer_id,
        }
    }
}
