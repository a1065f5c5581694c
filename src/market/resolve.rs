//! Info→Doc conversion
//!
//! Each function turns a public Info into an internal Doc, resolving every
//! foreign key against the store it points into and embedding the
//! referenced doc. A key with no target fails the conversion with
//! `ReferentialViolation`. Keys are checked here once and never again.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{
    Availability, DateWindow, Day, EntityId, EntityKind, InventoryDoc, InventoryInfo, ProduceDoc,
    ProduceInfo, ProducerDoc, ProducerInfo, RegionDoc, RegionInfo, ReservedInventoryDoc,
    ReservedInventoryInfo, ReservedRouteDoc, ReservedRouteInfo, RetailerDoc, RetailerInfo,
    RouteDoc, RouteInfo, TransporterDoc, TransporterInfo, TruckTypeDoc, TruckTypeInfo,
};
use crate::store::{EntityStore, StoreError, StoreResult};

use super::{Inventories, Produces, Producers, Regions, Retailers, Routes, Transporters, TruckTypes};

/// Fetch the doc a foreign key points at
fn follow<Id: EntityId, Doc, Info>(
    store: &EntityStore<Id, Doc, Info>,
    kind: EntityKind,
    field: &'static str,
    id: Id,
) -> StoreResult<Arc<Doc>> {
    store.get_doc(id).ok_or(StoreError::ReferentialViolation {
        kind,
        field,
        id: id.raw(),
    })
}

fn window(kind: EntityKind, start: Day, end: Day) -> StoreResult<DateWindow> {
    DateWindow::new(start, end).ok_or_else(|| StoreError::Malformed {
        kind,
        reason: format!("start_date {} is after end_date {}", start, end),
    })
}

pub fn truck_type(info: TruckTypeInfo) -> StoreResult<TruckTypeDoc> {
    Ok(TruckTypeDoc {
        id: info.id,
        name: info.name,
        capacity: info.capacity,
    })
}

pub fn region(info: RegionInfo) -> StoreResult<RegionDoc> {
    Ok(RegionDoc {
        id: info.id,
        name: info.name,
    })
}

pub fn produce(info: ProduceInfo) -> StoreResult<ProduceDoc> {
    Ok(ProduceDoc {
        id: info.id,
        name: info.name,
    })
}

pub fn transporter(info: TransporterInfo) -> StoreResult<TransporterDoc> {
    Ok(TransporterDoc {
        id: info.id,
        name: info.name,
        routes: BTreeMap::new(),
        reservations: BTreeMap::new(),
    })
}

/// Resolves a producer with empty owned collections
pub fn producer(regions: &Regions) -> impl FnOnce(ProducerInfo) -> StoreResult<ProducerDoc> + '_ {
    move |info| {
        Ok(ProducerDoc {
            id: info.id,
            name: info.name,
            region: follow(regions, EntityKind::Producer, "region_id", info.region_id)?,
            inventory: Arc::default(),
            reservations: BTreeMap::new(),
        })
    }
}

/// Resolves a retailer with empty reservation collections
pub fn retailer(regions: &Regions) -> impl FnOnce(RetailerInfo) -> StoreResult<RetailerDoc> + '_ {
    move |info| {
        Ok(RetailerDoc {
            id: info.id,
            name: info.name,
            region: follow(regions, EntityKind::Retailer, "region_id", info.region_id)?,
            inventory_reservations: BTreeMap::new(),
            route_reservations: BTreeMap::new(),
        })
    }
}

pub fn inventory<'a>(
    producers: &'a Producers,
    produce: &'a Produces,
) -> impl FnOnce(InventoryInfo) -> StoreResult<InventoryDoc> + 'a {
    move |info| {
        let kind = EntityKind::Inventory;
        follow(producers, kind, "producer_id", info.producer_id)?;
        let produce = follow(produce, kind, "produce_id", info.produce_id)?;

        if info.quantity == 0 {
            return Err(StoreError::Malformed {
                kind,
                reason: "quantity must be positive".to_string(),
            });
        }

        Ok(InventoryDoc {
            id: info.id,
            producer_id: info.producer_id,
            produce,
            grade: info.grade,
            quantity: info.quantity,
            ppu: info.ppu,
            window: window(kind, info.start_date, info.end_date)?,
            availability: Availability::from_flag(info.available),
        })
    }
}

pub fn route<'a>(
    transporters: &'a Transporters,
    truck_types: &'a TruckTypes,
    regions: &'a Regions,
) -> impl FnOnce(RouteInfo) -> StoreResult<RouteDoc> + 'a {
    move |info| {
        let kind = EntityKind::Route;
        follow(transporters, kind, "transporter_id", info.transporter_id)?;

        Ok(RouteDoc {
            id: info.id,
            transporter_id: info.transporter_id,
            truck_type: follow(truck_types, kind, "truck_type_id", info.truck_type_id)?,
            start_region: follow(regions, kind, "start_region_id", info.start_region_id)?,
            end_region: follow(regions, kind, "end_region_id", info.end_region_id)?,
            window: window(kind, info.start_date, info.end_date)?,
            cost: info.cost,
            availability: Availability::from_flag(info.available),
        })
    }
}

pub fn reserved_inventory<'a>(
    inventory: &'a Inventories,
    retailers: &'a Retailers,
) -> impl FnOnce(ReservedInventoryInfo) -> StoreResult<ReservedInventoryDoc> + 'a {
    move |info| {
        let kind = EntityKind::ReservedInventory;
        follow(retailers, kind, "retailer_id", info.retailer_id)?;

        Ok(ReservedInventoryDoc {
            id: info.id,
            retailer_id: info.retailer_id,
            inventory: follow(inventory, kind, "inventory_id", info.inventory_id)?,
            quantity: info.quantity,
        })
    }
}

pub fn reserved_route<'a>(
    routes: &'a Routes,
    retailers: &'a Retailers,
) -> impl FnOnce(ReservedRouteInfo) -> StoreResult<ReservedRouteDoc> + 'a {
    move |info| {
        let kind = EntityKind::ReservedRoute;
        follow(retailers, kind, "retailer_id", info.retailer_id)?;

        Ok(ReservedRouteDoc {
            id: info.id,
            retailer_id: info.retailer_id,
            route: follow(routes, kind, "route_id", info.route_id)?,
        })
    }
}
