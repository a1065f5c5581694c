//! Market engine
//!
//! `Market` owns one entity store per kind plus two derived indices:
//!
//! - `inventory_by_region`: region → producer → that producer's listings
//! - `routes_by_dst_src`: end region → start region → route id → route
//!
//! Every mutating operation validates first and then applies its writes in
//! an order that cannot fail halfway. Index writes that do fail mean the
//! derived state has diverged from the tables; those abort the process.

mod errors;
mod indexing;
mod query;
mod reserve;
mod resolve;
mod stock;

pub use errors::{MarketError, MarketResult};
pub use indexing::{InventoryIndex, RouteIndex, INVENTORY_BY_REGION, ROUTES_BY_DST_SRC};
pub use query::ProduceMarketInfo;
pub use reserve::ReservationPair;

use std::sync::Arc;

use crate::index::IndexError;
use crate::model::{
    EntityId, EntityKind, InventoryDoc, InventoryId, InventoryInfo, ProduceDoc, ProduceId,
    ProduceInfo, ProducerDoc, ProducerId, ProducerInfo, RegionDoc, RegionId, RegionInfo,
    ReservedInventoryDoc, ReservedInventoryId, ReservedInventoryInfo, ReservedRouteDoc,
    ReservedRouteId, ReservedRouteInfo, RetailerDoc, RetailerId, RetailerInfo, RouteDoc, RouteId,
    RouteInfo, TransporterDoc, TransporterId, TransporterInfo, TruckTypeDoc, TruckTypeId,
    TruckTypeInfo,
};
use crate::observability::{log_event_with_fields, Event};
use crate::store::{EntityStore, StoreResult};

use indexing::OrFatal;

pub type TruckTypes = EntityStore<TruckTypeId, TruckTypeDoc, TruckTypeInfo>;
pub type Regions = EntityStore<RegionId, RegionDoc, RegionInfo>;
pub type Produces = EntityStore<ProduceId, ProduceDoc, ProduceInfo>;
pub type Producers = EntityStore<ProducerId, ProducerDoc, ProducerInfo>;
pub type Transporters = EntityStore<TransporterId, TransporterDoc, TransporterInfo>;
pub type Retailers = EntityStore<RetailerId, RetailerDoc, RetailerInfo>;
pub type Inventories = EntityStore<InventoryId, InventoryDoc, InventoryInfo>;
pub type ReservedInventories =
    EntityStore<ReservedInventoryId, ReservedInventoryDoc, ReservedInventoryInfo>;
pub type Routes = EntityStore<RouteId, RouteDoc, RouteInfo>;
pub type ReservedRoutes = EntityStore<ReservedRouteId, ReservedRouteDoc, ReservedRouteInfo>;

/// The whole marketplace state
#[derive(Debug)]
pub struct Market {
    truck_types: TruckTypes,
    regions: Regions,
    produce: Produces,
    producers: Producers,
    transporters: Transporters,
    retailers: Retailers,
    inventory: Inventories,
    reserved_inventory: ReservedInventories,
    routes: Routes,
    reserved_routes: ReservedRoutes,
    inventory_by_region: InventoryIndex,
    routes_by_dst_src: RouteIndex,
}

impl Default for Market {
    fn default() -> Self {
        Self::new()
    }
}

impl Market {
    pub fn new() -> Self {
        Self {
            truck_types: EntityStore::new(EntityKind::TruckType, TruckTypeDoc::to_info),
            regions: EntityStore::new(EntityKind::Region, RegionDoc::to_info),
            produce: EntityStore::new(EntityKind::Produce, ProduceDoc::to_info),
            producers: EntityStore::new(EntityKind::Producer, ProducerDoc::to_info),
            transporters: EntityStore::new(EntityKind::Transporter, TransporterDoc::to_info),
            retailers: EntityStore::new(EntityKind::Retailer, RetailerDoc::to_info),
            inventory: EntityStore::new(EntityKind::Inventory, InventoryDoc::to_info),
            reserved_inventory: EntityStore::new(
                EntityKind::ReservedInventory,
                ReservedInventoryDoc::to_info,
            ),
            routes: EntityStore::new(EntityKind::Route, RouteDoc::to_info),
            reserved_routes: EntityStore::new(EntityKind::ReservedRoute, ReservedRouteDoc::to_info),
            inventory_by_region: InventoryIndex::new(INVENTORY_BY_REGION),
            routes_by_dst_src: RouteIndex::new(ROUTES_BY_DST_SRC),
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn truck_types(&self) -> &TruckTypes {
        &self.truck_types
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    pub fn produce(&self) -> &Produces {
        &self.produce
    }

    pub fn producers(&self) -> &Producers {
        &self.producers
    }

    pub fn transporters(&self) -> &Transporters {
        &self.transporters
    }

    pub fn retailers(&self) -> &Retailers {
        &self.retailers
    }

    pub fn inventory(&self) -> &Inventories {
        &self.inventory
    }

    pub fn reserved_inventory(&self) -> &ReservedInventories {
        &self.reserved_inventory
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn reserved_routes(&self) -> &ReservedRoutes {
        &self.reserved_routes
    }

    pub fn inventory_by_region(&self) -> &InventoryIndex {
        &self.inventory_by_region
    }

    pub fn routes_by_dst_src(&self) -> &RouteIndex {
        &self.routes_by_dst_src
    }

    // ========================================================================
    // Catalog and participants
    // ========================================================================

    pub fn add_truck_type(
        &mut self,
        name: impl Into<String>,
        capacity: u32,
    ) -> MarketResult<TruckTypeId> {
        let added = self.truck_types.add(
            |id| TruckTypeInfo {
                id,
                name: name.into(),
                capacity,
            },
            resolve::truck_type,
        );
        tracked(EntityKind::TruckType, added).map(|(id, _)| id)
    }

    pub fn add_region(&mut self, name: impl Into<String>) -> MarketResult<RegionId> {
        let added = self.regions.add(
            |id| RegionInfo {
                id,
                name: name.into(),
            },
            resolve::region,
        );
        tracked(EntityKind::Region, added).map(|(id, _)| id)
    }

    pub fn add_produce(&mut self, name: impl Into<String>) -> MarketResult<ProduceId> {
        let added = self.produce.add(
            |id| ProduceInfo {
                id,
                name: name.into(),
            },
            resolve::produce,
        );
        tracked(EntityKind::Produce, added).map(|(id, _)| id)
    }

    /// Register a producer in `region` with no listings.
    ///
    /// The producer gets an (empty) entry in the inventory index right away,
    /// so later listing changes only ever replace that entry.
    pub fn add_producer(
        &mut self,
        name: impl Into<String>,
        region: RegionId,
    ) -> MarketResult<ProducerId> {
        let added = self.producers.add(
            |id| ProducerInfo {
                id,
                name: name.into(),
                region_id: region,
            },
            resolve::producer(&self.regions),
        );
        let (id, doc) = tracked(EntityKind::Producer, added)?;

        self.inventory_by_region
            .insert(doc.region.id, id, Arc::clone(&doc.inventory))
            .or_fatal();
        Ok(id)
    }

    pub fn add_transporter(&mut self, name: impl Into<String>) -> MarketResult<TransporterId> {
        let added = self.transporters.add(
            |id| TransporterInfo {
                id,
                name: name.into(),
            },
            resolve::transporter,
        );
        tracked(EntityKind::Transporter, added).map(|(id, _)| id)
    }

    pub fn add_retailer(
        &mut self,
        name: impl Into<String>,
        region: RegionId,
    ) -> MarketResult<RetailerId> {
        let added = self.retailers.add(
            |id| RetailerInfo {
                id,
                name: name.into(),
                region_id: region,
            },
            resolve::retailer(&self.regions),
        );
        tracked(EntityKind::Retailer, added).map(|(id, _)| id)
    }

    /// Rename or relocate a producer, keeping its listings and reservations.
    ///
    /// A region change moves the producer's inventory index entry.
    pub fn update_producer(&mut self, info: ProducerInfo) -> MarketResult<()> {
        let current = self
            .producers
            .get_doc(info.id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Producer, info.id))?;
        let resolved = resolve::producer(&self.regions)(info)?;

        let doc = ProducerDoc {
            inventory: Arc::clone(&current.inventory),
            reservations: current.reservations.clone(),
            ..resolved
        };

        if doc.region.id == current.region.id {
            self.commit_producer(doc);
        } else {
            self.inventory_by_region
                .remove(current.region.id, current.id)
                .ok_or_else(|| {
                    IndexError::path_missing(INVENTORY_BY_REGION, (current.region.id, current.id))
                })
                .or_fatal();
            self.inventory_by_region
                .insert(doc.region.id, doc.id, Arc::clone(&doc.inventory))
                .or_fatal();
            self.producers.update(doc.id, doc).or_fatal();
        }

        log_event_with_fields(
            Event::EntityUpdated,
            &[
                ("kind", EntityKind::Producer.as_str()),
                ("id", &current.id.to_string()),
            ],
        );
        Ok(())
    }
}

/// Log the outcome of a store `add` and lift its error into the market's
fn tracked<Id: EntityId, Doc>(
    kind: EntityKind,
    added: StoreResult<(Id, Arc<Doc>)>,
) -> MarketResult<(Id, Arc<Doc>)> {
    match added {
        Ok((id, doc)) => {
            log_event_with_fields(
                Event::EntityAdded,
                &[("kind", kind.as_str()), ("id", &id.to_string())],
            );
            Ok((id, doc))
        }
        Err(err) => {
            log_event_with_fields(
                Event::EntityRejected,
                &[
                    ("kind", kind.as_str()),
                    ("code", err.code()),
                    ("reason", &err.to_string()),
                ],
            );
            Err(err.into())
        }
    }
}
