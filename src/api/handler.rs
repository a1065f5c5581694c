//! Request dispatch
//!
//! Flow per line:
//! 1. Parse (size limit, JSON, `op`)
//! 2. Dispatch to the matching `Market` operation
//! 3. Record the outcome under the request's class
//! 4. Render the response
//!
//! The handler owns the market outright; requests run one at a time.

use serde::Serialize;
use serde_json::{json, Value};

use crate::market::{Market, MarketError};
use crate::model::{EntityId, EntityKind};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, MetricsSnapshot};
use crate::store::EntityStore;

use super::errors::{ApiError, ApiResult};
use super::request::{Request, RequestClass};
use super::response::Response;

pub struct MarketHandler {
    market: Market,
    metrics: MetricsRegistry,
    max_request_bytes: usize,
}

impl MarketHandler {
    /// Handler over an empty market
    pub fn new(max_request_bytes: usize) -> Self {
        Self::with_market(Market::new(), max_request_bytes)
    }

    pub fn with_market(market: Market, max_request_bytes: usize) -> Self {
        Self {
            market,
            metrics: MetricsRegistry::new(),
            max_request_bytes,
        }
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn into_market(self) -> Market {
        self.market
    }

    /// Handle one raw request line
    pub fn handle(&mut self, line: &str) -> Response {
        self.metrics.increment_requests();

        let request = match Request::parse(line, self.max_request_bytes) {
            Ok(r) => r,
            Err(e) => {
                self.metrics.increment_requests_rejected();
                log_event_with_fields(
                    Event::RequestRejected,
                    &[("code", e.code()), ("reason", e.message())],
                );
                return Response::error(&e);
            }
        };

        let class = request.class();
        let result = self.dispatch(request);

        let ok = result.is_ok();
        match class {
            RequestClass::Write => self.metrics.record_write(ok),
            RequestClass::Query => self.metrics.record_query(ok),
            RequestClass::Reservation => self.metrics.record_reservation(ok),
            RequestClass::Admin => {}
        }

        match result {
            Ok(data) => Response::success(data),
            Err(e) => Response::error(&e),
        }
    }

    /// Run a parsed request against the market
    pub fn dispatch(&mut self, request: Request) -> ApiResult<Value> {
        let market = &mut self.market;
        match request {
            Request::AddTruckType { name, capacity } => {
                created(market.add_truck_type(name, capacity)?)
            }
            Request::AddRegion { name } => created(market.add_region(name)?),
            Request::AddProduce { name } => created(market.add_produce(name)?),
            Request::AddProducer { name, region_id } => {
                created(market.add_producer(name, region_id)?)
            }
            Request::AddTransporter { name } => created(market.add_transporter(name)?),
            Request::AddRetailer { name, region_id } => {
                created(market.add_retailer(name, region_id)?)
            }
            Request::UpdateProducer { producer } => {
                market.update_producer(producer)?;
                Ok(Value::Null)
            }

            Request::ProducerAddInventory {
                producer_id,
                listing,
            } => created(market.producer_add_inventory(producer_id, listing)?),
            Request::ProducerUpdateInventory {
                producer_id,
                inventory_id,
                listing,
            } => {
                market.producer_update_inventory(producer_id, inventory_id, listing)?;
                Ok(Value::Null)
            }
            Request::ProducerRemInventory {
                producer_id,
                inventory_id,
            } => data(market.producer_rem_inventory(producer_id, inventory_id)?),
            Request::TransporterAddRoute {
                transporter_id,
                route,
            } => created(market.transporter_add_route(transporter_id, route)?),
            Request::TransporterRemRoute {
                transporter_id,
                route_id,
            } => data(market.transporter_rem_route(transporter_id, route_id)?),

            Request::GetInfo { kind, id } => get_info(market, kind, id),
            Request::ProducerAllInventoryInfo { producer_id } => {
                data(market.producer_all_inventory_info(producer_id)?)
            }
            Request::ProducerReservations { producer_id } => {
                data(market.producer_reservations(producer_id)?)
            }
            Request::TransporterAllRouteInfo { transporter_id } => {
                data(market.transporter_all_route_info(transporter_id)?)
            }
            Request::TransporterAllReservationInfo { transporter_id } => {
                data(market.transporter_all_reservation_info(transporter_id)?)
            }
            Request::RetailerAllReservationInfo { retailer_id } => {
                data(market.retailer_all_reservation_info(retailer_id)?)
            }
            Request::RetailerQueryDates {
                retailer_id,
                begin,
                end,
            } => data(market.retailer_query_dates(retailer_id, begin, end)?),
            Request::RetailerQueryAll { retailer_id } => {
                data(market.retailer_query_all(retailer_id)?)
            }
            Request::ProduceMarketInfo { produce_id } => {
                data(market.produce_market_info(produce_id)?)
            }

            Request::RetailerReserveCheapest {
                retailer_id,
                produce_id,
                grade,
                quantity,
                begin,
                end,
            } => data(market.retailer_reserve_cheapest(
                retailer_id,
                produce_id,
                grade,
                quantity,
                begin,
                end,
            )?),
            Request::RetailerReserve {
                retailer_id,
                inventory_id,
                route_id,
            } => data(market.retailer_reserve(retailer_id, inventory_id, route_id)?),

            Request::CheckIndices => {
                market.check_indices()?;
                Ok(json!({
                    "consistent": true,
                    "producers": market.inventory_by_region().len(),
                    "routes": market.routes_by_dst_src().len(),
                }))
            }
            Request::Metrics => Ok(self.metrics.to_json()),
        }
    }
}

fn data<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

fn created<Id: EntityId>(id: Id) -> ApiResult<Value> {
    Ok(json!({ "id": id.raw() }))
}

fn info_of<Id: EntityId, Doc, Info: Serialize>(
    store: &EntityStore<Id, Doc, Info>,
    id: u64,
) -> ApiResult<Value> {
    let info = store.get_info(Id::from_raw(id)).ok_or(MarketError::NotFound {
        kind: store.kind(),
        id,
    })?;
    data(info)
}

fn get_info(market: &Market, kind: EntityKind, id: u64) -> ApiResult<Value> {
    match kind {
        EntityKind::TruckType => info_of(market.truck_types(), id),
        EntityKind::Region => info_of(market.regions(), id),
        EntityKind::Produce => info_of(market.produce(), id),
        EntityKind::Producer => info_of(market.producers(), id),
        EntityKind::Transporter => info_of(market.transporters(), id),
        EntityKind::Retailer => info_of(market.retailers(), id),
        EntityKind::Inventory => info_of(market.inventory(), id),
        EntityKind::ReservedInventory => info_of(market.reserved_inventory(), id),
        EntityKind::Route => info_of(market.routes(), id),
        EntityKind::ReservedRoute => info_of(market.reserved_routes(), id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> MarketHandler {
        MarketHandler::new(64 * 1024)
    }

    #[test]
    fn test_add_region_returns_id() {
        let mut h = handler();
        let resp = h.handle(r#"{"op":"add_region","name":"coast"}"#);
        assert_eq!(resp.data(), Some(&json!({"id": 0})));
        let resp = h.handle(r#"{"op":"add_region","name":"plain"}"#);
        assert_eq!(resp.data(), Some(&json!({"id": 1})));
    }

    #[test]
    fn test_get_info_roundtrip() {
        let mut h = handler();
        h.handle(r#"{"op":"add_region","name":"coast"}"#);
        let resp = h.handle(r#"{"op":"get_info","kind":"region","id":0}"#);
        assert_eq!(resp.data(), Some(&json!({"id": 0, "name": "coast"})));
    }

    #[test]
    fn test_get_info_missing() {
        let mut h = handler();
        let resp = h.handle(r#"{"op":"get_info","kind":"route","id":3}"#);
        assert_eq!(resp.code(), Some("AGRO_NOT_FOUND"));
    }

    #[test]
    fn test_metrics_count_classes() {
        let mut h = handler();
        h.handle(r#"{"op":"add_region","name":"coast"}"#);
        h.handle(r#"{"op":"add_producer","name":"farm","region_id":7}"#);
        h.handle(r#"{"op":"retailer_query_all","retailer_id":0}"#);
        h.handle("not json");

        let m = h.metrics();
        assert_eq!(m.requests, 4);
        assert_eq!(m.requests_rejected, 1);
        assert_eq!(m.writes, 1);
        assert_eq!(m.writes_rejected, 1);
        assert_eq!(m.queries_rejected, 1);
    }

    #[test]
    fn test_check_indices_reports_counts() {
        let mut h = handler();
        h.handle(r#"{"op":"add_region","name":"coast"}"#);
        h.handle(r#"{"op":"add_producer","name":"farm","region_id":0}"#);
        let resp = h.handle(r#"{"op":"check_indices"}"#);
        assert_eq!(
            resp.data(),
            Some(&json!({"consistent": true, "producers": 1, "routes": 0}))
        );
    }
}
