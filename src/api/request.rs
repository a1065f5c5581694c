//! API request types
//!
//! A request is one JSON object per line with an `op` field naming the
//! operation, for example:
//!
//! ```json
//! {"op":"retailer_query_dates","retailer_id":0,"begin":12,"end":18}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    Day, EntityKind, InventoryId, NewInventory, NewRoute, ProduceId, ProducerId, ProducerInfo,
    RegionId, RetailerId, RouteId, TransporterId,
};

use super::errors::{ApiError, ApiResult};

/// Every supported request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    // Catalog and participants
    AddTruckType {
        name: String,
        capacity: u32,
    },
    AddRegion {
        name: String,
    },
    AddProduce {
        name: String,
    },
    AddProducer {
        name: String,
        region_id: RegionId,
    },
    AddTransporter {
        name: String,
    },
    AddRetailer {
        name: String,
        region_id: RegionId,
    },
    UpdateProducer {
        producer: ProducerInfo,
    },

    // Listings and routes
    ProducerAddInventory {
        producer_id: ProducerId,
        listing: NewInventory,
    },
    ProducerUpdateInventory {
        producer_id: ProducerId,
        inventory_id: InventoryId,
        listing: NewInventory,
    },
    ProducerRemInventory {
        producer_id: ProducerId,
        inventory_id: InventoryId,
    },
    TransporterAddRoute {
        transporter_id: TransporterId,
        route: NewRoute,
    },
    TransporterRemRoute {
        transporter_id: TransporterId,
        route_id: RouteId,
    },

    // Reads
    GetInfo {
        kind: EntityKind,
        id: u64,
    },
    ProducerAllInventoryInfo {
        producer_id: ProducerId,
    },
    ProducerReservations {
        producer_id: ProducerId,
    },
    TransporterAllRouteInfo {
        transporter_id: TransporterId,
    },
    TransporterAllReservationInfo {
        transporter_id: TransporterId,
    },
    RetailerAllReservationInfo {
        retailer_id: RetailerId,
    },
    RetailerQueryDates {
        retailer_id: RetailerId,
        begin: Day,
        end: Day,
    },
    RetailerQueryAll {
        retailer_id: RetailerId,
    },
    ProduceMarketInfo {
        produce_id: ProduceId,
    },

    // Reservations
    RetailerReserveCheapest {
        retailer_id: RetailerId,
        produce_id: ProduceId,
        grade: u8,
        quantity: u32,
        begin: Day,
        end: Day,
    },
    RetailerReserve {
        retailer_id: RetailerId,
        inventory_id: InventoryId,
        route_id: RouteId,
    },

    // Administration
    CheckIndices,
    Metrics,
}

/// Which counter a request's outcome is recorded under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Write,
    Query,
    Reservation,
    Admin,
}

impl Request {
    /// Wire names accepted in the `op` field
    pub const OPERATIONS: &'static [&'static str] = &[
        "add_truck_type",
        "add_region",
        "add_produce",
        "add_producer",
        "add_transporter",
        "add_retailer",
        "update_producer",
        "producer_add_inventory",
        "producer_update_inventory",
        "producer_rem_inventory",
        "transporter_add_route",
        "transporter_rem_route",
        "get_info",
        "producer_all_inventory_info",
        "producer_reservations",
        "transporter_all_route_info",
        "transporter_all_reservation_info",
        "retailer_all_reservation_info",
        "retailer_query_dates",
        "retailer_query_all",
        "produce_market_info",
        "retailer_reserve_cheapest",
        "retailer_reserve",
        "check_indices",
        "metrics",
    ];

    /// Parse one request line.
    ///
    /// Lines longer than `max_bytes` are rejected before any JSON parsing.
    pub fn parse(line: &str, max_bytes: usize) -> ApiResult<Self> {
        if line.len() > max_bytes {
            return Err(ApiError::too_large(line.len(), max_bytes));
        }

        let value: Value = serde_json::from_str(line)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e)))?;
        let op = value
            .get("op")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::invalid_request("Missing op"))?
            .to_string();
        if !Self::OPERATIONS.contains(&op.as_str()) {
            return Err(ApiError::unknown_operation(op));
        }

        serde_json::from_value(value)
            .map_err(|e| ApiError::invalid_request(format!("Invalid {} request: {}", op, e)))
    }

    pub fn class(&self) -> RequestClass {
        match self {
            Request::AddTruckType { .. }
            | Request::AddRegion { .. }
            | Request::AddProduce { .. }
            | Request::AddProducer { .. }
            | Request::AddTransporter { .. }
            | Request::AddRetailer { .. }
            | Request::UpdateProducer { .. }
            | Request::ProducerAddInventory { .. }
            | Request::ProducerUpdateInventory { .. }
            | Request::ProducerRemInventory { .. }
            | Request::TransporterAddRoute { .. }
            | Request::TransporterRemRoute { .. } => RequestClass::Write,

            Request::GetInfo { .. }
            | Request::ProducerAllInventoryInfo { .. }
            | Request::ProducerReservations { .. }
            | Request::TransporterAllRouteInfo { .. }
            | Request::TransporterAllReservationInfo { .. }
            | Request::RetailerAllReservationInfo { .. }
            | Request::RetailerQueryDates { .. }
            | Request::RetailerQueryAll { .. }
            | Request::ProduceMarketInfo { .. } => RequestClass::Query,

            Request::RetailerReserveCheapest { .. } | Request::RetailerReserve { .. } => {
                RequestClass::Reservation
            }

            Request::CheckIndices | Request::Metrics => RequestClass::Admin,
        }
    }
}
