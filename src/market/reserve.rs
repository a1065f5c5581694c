//! Reservation matching and commit
//!
//! A reservation holds one listing and one route for one retailer. The
//! listing is held in full: the requested quantity is recorded on the
//! reservation but never split off the listing.
//!
//! Commit order: both reservation docs are created first (the only steps
//! that can fail), then both items are marked reserved and every holder is
//! refreshed. A failure on the second create rolls back the first.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{
    DateWindow, Day, EntityKind, InventoryDoc, InventoryId, ProduceId, ReservedInventoryId,
    ReservedInventoryInfo, ReservedRouteId, ReservedRouteInfo, RetailerId, RouteDoc, RouteId,
};
use crate::observability::{log_event_with_fields, Event};

use super::indexing::OrFatal;
use super::{resolve, tracked, Market, MarketError, MarketResult};

/// Ids of the two reservation docs created by one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPair {
    pub inventory: ReservedInventoryId,
    pub route: ReservedRouteId,
}

/// A feasible pair priced for a requested quantity
struct Candidate {
    total_cost: u64,
    inventory: Arc<InventoryDoc>,
    route: Arc<RouteDoc>,
}

impl Candidate {
    /// Cheapest first, then lowest inventory id, then lowest route id
    fn rank(&self) -> (u64, InventoryId, RouteId) {
        (self.total_cost, self.inventory.id, self.route.id)
    }
}

impl Market {
    /// Reserve the cheapest listing of `produce_id` at `grade` with at least
    /// `quantity` units, together with a route that delivers it to the
    /// retailer's region, both intersecting `[begin, end]` and each other.
    ///
    /// Total cost is `ppu × quantity + route cost`, saturating.
    pub fn retailer_reserve_cheapest(
        &mut self,
        retailer_id: RetailerId,
        produce_id: ProduceId,
        grade: u8,
        quantity: u32,
        begin: Day,
        end: Day,
    ) -> MarketResult<ReservationPair> {
        let result = self
            .cheapest_candidate(retailer_id, produce_id, grade, quantity, begin, end)
            .and_then(|chosen| {
                self.commit_reservation(retailer_id, chosen.inventory, chosen.route, quantity)
            });
        log_outcome(retailer_id, &result);
        result
    }

    /// Reserve a caller-chosen listing and route for a retailer.
    ///
    /// The route must run from the listing producer's region to the
    /// retailer's region, the two windows must intersect, and neither item
    /// may already be reserved.
    pub fn retailer_reserve(
        &mut self,
        retailer_id: RetailerId,
        inventory_id: InventoryId,
        route_id: RouteId,
    ) -> MarketResult<ReservationPair> {
        let result = self
            .check_pair(retailer_id, inventory_id, route_id)
            .and_then(|(item, route)| {
                let quantity = item.quantity;
                self.commit_reservation(retailer_id, item, route, quantity)
            });
        log_outcome(retailer_id, &result);
        result
    }

    fn cheapest_candidate(
        &self,
        retailer_id: RetailerId,
        produce_id: ProduceId,
        grade: u8,
        quantity: u32,
        begin: Day,
        end: Day,
    ) -> MarketResult<Candidate> {
        if quantity == 0 {
            return Err(MarketError::InvalidQuantity);
        }
        let window = DateWindow::new(begin, end).ok_or(MarketError::InvalidWindow { begin, end })?;
        let retailer = self
            .retailers
            .get_doc(retailer_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Retailer, retailer_id))?;
        if !self.produce.contains(produce_id) {
            return Err(MarketError::not_found(EntityKind::Produce, produce_id));
        }

        self.feasible_pairs(retailer.region.id, Some(&window))
            .into_iter()
            .filter(|(route, item)| {
                item.produce.id == produce_id
                    && item.grade == grade
                    && item.quantity >= quantity
                    && item.window.intersects(&route.window)
            })
            .map(|(route, item)| Candidate {
                total_cost: item.price_of(quantity).saturating_add(route.cost),
                inventory: item,
                route,
            })
            .min_by_key(Candidate::rank)
            .ok_or_else(|| {
                MarketError::infeasible(format!(
                    "no listing of produce {} grade {} with {} units reaches region {} within {}",
                    produce_id, grade, quantity, retailer.region.id, window
                ))
            })
    }

    fn check_pair(
        &self,
        retailer_id: RetailerId,
        inventory_id: InventoryId,
        route_id: RouteId,
    ) -> MarketResult<(Arc<InventoryDoc>, Arc<RouteDoc>)> {
        let retailer = self
            .retailers
            .get_doc(retailer_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Retailer, retailer_id))?;
        let item = self
            .inventory
            .get_doc(inventory_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Inventory, inventory_id))?;
        let route = self
            .routes
            .get_doc(route_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Route, route_id))?;
        let producer = self.producers.require(item.producer_id)?;

        if !item.is_available() {
            return Err(MarketError::infeasible(format!(
                "inventory {} is reserved",
                inventory_id
            )));
        }
        if !route.is_available() {
            return Err(MarketError::infeasible(format!(
                "route {} is reserved",
                route_id
            )));
        }
        if route.end_region.id != retailer.region.id {
            return Err(MarketError::infeasible(format!(
                "route {} ends in region {}, retailer {} is in region {}",
                route_id, route.end_region.id, retailer_id, retailer.region.id
            )));
        }
        if route.start_region.id != producer.region.id {
            return Err(MarketError::infeasible(format!(
                "route {} starts in region {}, producer {} is in region {}",
                route_id, route.start_region.id, producer.id, producer.region.id
            )));
        }
        if !item.window.intersects(&route.window) {
            return Err(MarketError::infeasible(format!(
                "inventory window {} does not meet route window {}",
                item.window, route.window
            )));
        }

        Ok((item, route))
    }

    /// Create both reservation docs, then mark both items reserved and
    /// attach the reservations to producer, transporter and retailer.
    fn commit_reservation(
        &mut self,
        retailer_id: RetailerId,
        item: Arc<InventoryDoc>,
        route: Arc<RouteDoc>,
        quantity: u32,
    ) -> MarketResult<ReservationPair> {
        let added = self.reserved_inventory.add(
            |id| ReservedInventoryInfo {
                id,
                inventory_id: item.id,
                retailer_id,
                quantity,
            },
            resolve::reserved_inventory(&self.inventory, &self.retailers),
        );
        let (held_item_id, held_item) = tracked(EntityKind::ReservedInventory, added)?;

        let added = self.reserved_routes.add(
            |id| ReservedRouteInfo {
                id,
                route_id: route.id,
                retailer_id,
            },
            resolve::reserved_route(&self.routes, &self.retailers),
        );
        let (held_route_id, held_route) = match tracked(EntityKind::ReservedRoute, added) {
            Ok(added) => added,
            Err(err) => {
                self.reserved_inventory.remove(held_item_id);
                return Err(err);
            }
        };

        self.commit_inventory(item.reserved());
        self.commit_route(route.reserved());

        let mut producer = (*self.producers.require(item.producer_id).or_fatal()).clone();
        producer
            .reservations
            .insert(held_item_id, Arc::clone(&held_item));
        self.commit_producer(producer);

        let mut transporter = (*self.transporters.require(route.transporter_id).or_fatal()).clone();
        transporter
            .reservations
            .insert(held_route_id, Arc::clone(&held_route));
        self.commit_transporter(transporter);

        let mut retailer = (*self.retailers.require(retailer_id).or_fatal()).clone();
        retailer.inventory_reservations.insert(held_item_id, held_item);
        retailer.route_reservations.insert(held_route_id, held_route);
        self.commit_retailer(retailer);

        Ok(ReservationPair {
            inventory: held_item_id,
            route: held_route_id,
        })
    }
}

fn log_outcome(retailer_id: RetailerId, result: &MarketResult<ReservationPair>) {
    let retailer = retailer_id.to_string();
    match result {
        Ok(pair) => log_event_with_fields(
            Event::ReservationCommitted,
            &[
                ("retailer", &retailer),
                ("reserved_inventory", &pair.inventory.to_string()),
                ("reserved_route", &pair.route.to_string()),
            ],
        ),
        Err(err) => log_event_with_fields(
            Event::ReservationRejected,
            &[
                ("retailer", &retailer),
                ("code", err.code()),
                ("reason", &err.to_string()),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewInventory, NewRoute, ProducerId, RegionId, TransporterId, TruckTypeId};

    struct Fixture {
        market: Market,
        farm: RegionId,
        city: RegionId,
        producer: ProducerId,
        transporter: TransporterId,
        truck: TruckTypeId,
        retailer: RetailerId,
        produce: ProduceId,
    }

    fn fixture() -> Fixture {
        let mut market = Market::new();
        let farm = market.add_region("farm").unwrap();
        let city = market.add_region("city").unwrap();
        let produce = market.add_produce("corn").unwrap();
        let producer = market.add_producer("fields", farm).unwrap();
        let truck = market.add_truck_type("reefer", 30).unwrap();
        let transporter = market.add_transporter("roads").unwrap();
        let retailer = market.add_retailer("grocer", city).unwrap();
        Fixture {
            market,
            farm,
            city,
            producer,
            transporter,
            truck,
            retailer,
            produce,
        }
    }

    impl Fixture {
        fn listing(&mut self, ppu: u64, quantity: u32) -> InventoryId {
            self.market
                .producer_add_inventory(
                    self.producer,
                    NewInventory {
                        produce_id: self.produce,
                        grade: 1,
                        quantity,
                        ppu,
                        start_date: 10,
                        end_date: 20,
                    },
                )
                .unwrap()
        }

        fn route(&mut self, from: RegionId, to: RegionId, cost: u64) -> RouteId {
            self.market
                .transporter_add_route(
                    self.transporter,
                    NewRoute {
                        truck_type_id: self.truck,
                        start_region_id: from,
                        end_region_id: to,
                        start_date: 5,
                        end_date: 25,
                        cost,
                    },
                )
                .unwrap()
        }
    }

    #[test]
    fn test_cheapest_prefers_lowest_total() {
        let mut fx = fixture();
        fx.listing(10, 40);
        let cheap = fx.listing(2, 40);
        fx.route(fx.farm, fx.city, 50);

        let pair = fx
            .market
            .retailer_reserve_cheapest(fx.retailer, fx.produce, 1, 5, 12, 18)
            .unwrap();

        let held = fx.market.reserved_inventory().get_info(pair.inventory).unwrap();
        assert_eq!(held.inventory_id, cheap);
        assert_eq!(held.quantity, 5);
        fx.market.check_indices().unwrap();
    }

    #[test]
    fn test_cheapest_rejects_zero_quantity() {
        let mut fx = fixture();
        let err = fx
            .market
            .retailer_reserve_cheapest(fx.retailer, fx.produce, 1, 0, 12, 18)
            .unwrap_err();
        assert_eq!(err, MarketError::InvalidQuantity);
    }

    #[test]
    fn test_cheapest_skips_short_listings() {
        let mut fx = fixture();
        fx.listing(1, 3);
        fx.route(fx.farm, fx.city, 50);

        let err = fx
            .market
            .retailer_reserve_cheapest(fx.retailer, fx.produce, 1, 5, 12, 18)
            .unwrap_err();
        assert!(err.is_infeasible());
        assert!(fx.market.reserved_inventory().is_empty());
    }

    #[test]
    fn test_reserve_marks_both_items() {
        let mut fx = fixture();
        let item = fx.listing(3, 10);
        let route = fx.route(fx.farm, fx.city, 20);

        let pair = fx.market.retailer_reserve(fx.retailer, item, route).unwrap();

        assert!(!fx.market.inventory().get_info(item).unwrap().available);
        assert!(!fx.market.routes().get_info(route).unwrap().available);
        assert_eq!(
            fx.market.reserved_inventory().get_info(pair.inventory).unwrap().quantity,
            10
        );
        assert_eq!(fx.market.producer_reservations(fx.producer).unwrap().len(), 1);
        assert_eq!(
            fx.market
                .transporter_all_reservation_info(fx.transporter)
                .unwrap()
                .len(),
            1
        );
        fx.market.check_indices().unwrap();
    }

    #[test]
    fn test_reserve_wrong_direction() {
        let mut fx = fixture();
        let item = fx.listing(3, 10);
        let route = fx.route(fx.city, fx.farm, 20);

        let err = fx.market.retailer_reserve(fx.retailer, item, route).unwrap_err();
        assert!(err.is_infeasible());
        assert!(fx.market.inventory().get_info(item).unwrap().available);
        assert!(fx.market.reserved_routes().is_empty());
    }

    #[test]
    fn test_reserve_unknown_route() {
        let mut fx = fixture();
        let item = fx.listing(3, 10);

        let err = fx
            .market
            .retailer_reserve(fx.retailer, item, RouteId(9))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_reserved_listing_cannot_be_removed() {
        let mut fx = fixture();
        let item = fx.listing(3, 10);
        let route = fx.route(fx.farm, fx.city, 20);
        fx.market.retailer_reserve(fx.retailer, item, route).unwrap();

        let err = fx
            .market
            .producer_rem_inventory(fx.producer, item)
            .unwrap_err();
        assert!(err.is_infeasible());
        let err = fx
            .market
            .transporter_rem_route(fx.transporter, route)
            .unwrap_err();
        assert!(err.is_infeasible());
    }
}
