//! Listing and route maintenance for producers and transporters

use std::sync::Arc;

use crate::index::IndexError;
use crate::model::{
    EntityKind, InventoryDoc, InventoryId, InventoryInfo, NewInventory, NewRoute, ProducerId,
    RouteId, RouteInfo, TransporterId,
};
use crate::observability::{log_event_with_fields, Event};

use super::indexing::{OrFatal, ROUTES_BY_DST_SRC};
use super::{resolve, tracked, Market, MarketError, MarketResult};

impl Market {
    /// Add a listing owned by `producer_id`.
    ///
    /// Fails with `NotFound` before allocating an id when the producer does
    /// not exist. A listing that fails conversion consumes its id.
    pub fn producer_add_inventory(
        &mut self,
        producer_id: ProducerId,
        listing: NewInventory,
    ) -> MarketResult<InventoryId> {
        let producer = self
            .producers
            .get_doc(producer_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Producer, producer_id))?;

        let added = self.inventory.add(
            |id| listing.into_info(id, producer_id),
            resolve::inventory(&self.producers, &self.produce),
        );
        let (id, doc) = tracked(EntityKind::Inventory, added)?;

        let mut listings = (*producer.inventory).clone();
        listings.insert(id, doc);
        self.commit_producer(producer.with_inventory(listings));

        Ok(id)
    }

    /// Replace the terms of an available listing
    pub fn producer_update_inventory(
        &mut self,
        producer_id: ProducerId,
        inventory_id: InventoryId,
        listing: NewInventory,
    ) -> MarketResult<()> {
        let current = self.owned_listing(producer_id, inventory_id)?;
        if !current.is_available() {
            return Err(MarketError::infeasible(format!(
                "inventory {} is reserved",
                inventory_id
            )));
        }

        let doc = resolve::inventory(&self.producers, &self.produce)(
            listing.into_info(inventory_id, producer_id),
        )?;
        self.commit_inventory(doc);

        log_event_with_fields(
            Event::EntityUpdated,
            &[
                ("kind", EntityKind::Inventory.as_str()),
                ("id", &inventory_id.to_string()),
            ],
        );
        Ok(())
    }

    /// Withdraw an available listing, returning its last state
    pub fn producer_rem_inventory(
        &mut self,
        producer_id: ProducerId,
        inventory_id: InventoryId,
    ) -> MarketResult<InventoryInfo> {
        let item = self.owned_listing(producer_id, inventory_id)?;
        if !item.is_available() {
            return Err(MarketError::infeasible(format!(
                "inventory {} is reserved",
                inventory_id
            )));
        }
        let producer = self.producers.require(producer_id)?;

        let mut listings = (*producer.inventory).clone();
        listings.remove(&inventory_id);
        self.commit_producer(producer.with_inventory(listings));
        self.inventory.remove(inventory_id);

        log_event_with_fields(
            Event::EntityRemoved,
            &[
                ("kind", EntityKind::Inventory.as_str()),
                ("id", &inventory_id.to_string()),
            ],
        );
        Ok(item.to_info())
    }

    /// Add a route operated by `transporter_id`
    pub fn transporter_add_route(
        &mut self,
        transporter_id: TransporterId,
        route: NewRoute,
    ) -> MarketResult<RouteId> {
        let transporter = self
            .transporters
            .get_doc(transporter_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Transporter, transporter_id))?;

        let added = self.routes.add(
            |id| route.into_info(id, transporter_id),
            resolve::route(&self.transporters, &self.truck_types, &self.regions),
        );
        let (id, doc) = tracked(EntityKind::Route, added)?;

        let mut transporter = (*transporter).clone();
        transporter.routes.insert(id, Arc::clone(&doc));
        self.commit_transporter(transporter);
        self.routes_by_dst_src
            .insert(doc.end_region.id, doc.start_region.id, id, doc)
            .or_fatal();

        Ok(id)
    }

    /// Withdraw an available route, returning its last state
    pub fn transporter_rem_route(
        &mut self,
        transporter_id: TransporterId,
        route_id: RouteId,
    ) -> MarketResult<RouteInfo> {
        let transporter = self
            .transporters
            .get_doc(transporter_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Transporter, transporter_id))?;
        let route = transporter
            .routes
            .get(&route_id)
            .cloned()
            .ok_or_else(|| MarketError::not_found(EntityKind::Route, route_id))?;
        if !route.is_available() {
            return Err(MarketError::infeasible(format!(
                "route {} is reserved",
                route_id
            )));
        }

        let (end, start) = (route.end_region.id, route.start_region.id);
        self.routes_by_dst_src
            .remove(end, start, route_id)
            .ok_or_else(|| IndexError::path_missing(ROUTES_BY_DST_SRC, (end, start, route_id)))
            .or_fatal();

        let mut transporter = (*transporter).clone();
        transporter.routes.remove(&route_id);
        self.commit_transporter(transporter);
        self.routes.remove(route_id);

        log_event_with_fields(
            Event::EntityRemoved,
            &[
                ("kind", EntityKind::Route.as_str()),
                ("id", &route_id.to_string()),
            ],
        );
        Ok(route.to_info())
    }

    /// Listing `inventory_id` as held by its owner `producer_id`
    fn owned_listing(
        &self,
        producer_id: ProducerId,
        inventory_id: InventoryId,
    ) -> MarketResult<Arc<InventoryDoc>> {
        let producer = self
            .producers
            .get_doc(producer_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Producer, producer_id))?;
        producer
            .inventory
            .get(&inventory_id)
            .cloned()
            .ok_or_else(|| MarketError::not_found(EntityKind::Inventory, inventory_id))
    }
}
