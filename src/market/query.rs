//! Read-only projections and the route × inventory join
//!
//! Nothing here mutates the market. Joins walk the indices: routes are
//! found by destination region, and each route's source region selects the
//! producers whose listings it can carry.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{
    DateWindow, Day, EntityKind, InventoryDoc, InventoryInfo, ProduceId, ProducerId, RegionId,
    ReservedInventoryInfo, ReservedRouteInfo, RetailerId, RetailerReservations, RouteDoc,
    RouteInfo, TransporterId,
};
use crate::observability::{log_event_with_fields, Event};

use super::{Market, MarketError, MarketResult};

/// Market summary for one produce, over its available listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceMarketInfo {
    pub produce_id: ProduceId,
    pub name: String,
    pub listings: usize,
    pub available_quantity: u64,
    pub min_ppu: Option<u64>,
    pub max_ppu: Option<u64>,
}

/// A route that can carry a listing to some destination
pub(super) type Pair = (Arc<RouteDoc>, Arc<InventoryDoc>);

fn within(window: &DateWindow, filter: Option<&DateWindow>) -> bool {
    filter.map_or(true, |filter| window.intersects(filter))
}

impl Market {
    pub fn producer_all_inventory_info(
        &self,
        producer_id: ProducerId,
    ) -> MarketResult<Vec<InventoryInfo>> {
        let producer = self
            .producers
            .get_doc(producer_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Producer, producer_id))?;
        Ok(producer.inventory.values().map(|doc| doc.to_info()).collect())
    }

    pub fn producer_reservations(
        &self,
        producer_id: ProducerId,
    ) -> MarketResult<Vec<ReservedInventoryInfo>> {
        let producer = self
            .producers
            .get_doc(producer_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Producer, producer_id))?;
        Ok(producer
            .reservations
            .values()
            .map(|doc| doc.to_info())
            .collect())
    }

    pub fn transporter_all_route_info(
        &self,
        transporter_id: TransporterId,
    ) -> MarketResult<Vec<RouteInfo>> {
        let transporter = self
            .transporters
            .get_doc(transporter_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Transporter, transporter_id))?;
        Ok(transporter.routes.values().map(|doc| doc.to_info()).collect())
    }

    pub fn transporter_all_reservation_info(
        &self,
        transporter_id: TransporterId,
    ) -> MarketResult<Vec<ReservedRouteInfo>> {
        let transporter = self
            .transporters
            .get_doc(transporter_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Transporter, transporter_id))?;
        Ok(transporter
            .reservations
            .values()
            .map(|doc| doc.to_info())
            .collect())
    }

    pub fn retailer_all_reservation_info(
        &self,
        retailer_id: RetailerId,
    ) -> MarketResult<RetailerReservations> {
        let retailer = self
            .retailers
            .get_doc(retailer_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Retailer, retailer_id))?;
        Ok(RetailerReservations {
            inventory: retailer
                .inventory_reservations
                .values()
                .map(|doc| doc.to_info())
                .collect(),
            routes: retailer
                .route_reservations
                .values()
                .map(|doc| doc.to_info())
                .collect(),
        })
    }

    /// Available listings deliverable to the retailer's region within
    /// `[begin, end]`, by ascending inventory id.
    ///
    /// Both the route and the listing must intersect the window.
    pub fn retailer_query_dates(
        &self,
        retailer_id: RetailerId,
        begin: Day,
        end: Day,
    ) -> MarketResult<Vec<InventoryInfo>> {
        let window = DateWindow::new(begin, end).ok_or(MarketError::InvalidWindow { begin, end })?;
        self.reachable_inventory(retailer_id, Some(&window))
    }

    /// Available listings deliverable to the retailer's region on any date
    pub fn retailer_query_all(&self, retailer_id: RetailerId) -> MarketResult<Vec<InventoryInfo>> {
        self.reachable_inventory(retailer_id, None)
    }

    pub fn produce_market_info(&self, produce_id: ProduceId) -> MarketResult<ProduceMarketInfo> {
        let produce = self
            .produce
            .get_doc(produce_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Produce, produce_id))?;

        let offered: Vec<&Arc<InventoryDoc>> = self
            .inventory
            .iter()
            .map(|(_, doc)| doc)
            .filter(|doc| doc.produce.id == produce_id && doc.is_available())
            .collect();

        Ok(ProduceMarketInfo {
            produce_id,
            name: produce.name.clone(),
            listings: offered.len(),
            available_quantity: offered.iter().map(|doc| u64::from(doc.quantity)).sum(),
            min_ppu: offered.iter().map(|doc| doc.ppu).min(),
            max_ppu: offered.iter().map(|doc| doc.ppu).max(),
        })
    }

    fn reachable_inventory(
        &self,
        retailer_id: RetailerId,
        window: Option<&DateWindow>,
    ) -> MarketResult<Vec<InventoryInfo>> {
        let retailer = self
            .retailers
            .get_doc(retailer_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Retailer, retailer_id))?;

        let mut found = BTreeMap::new();
        for (_, item) in self.feasible_pairs(retailer.region.id, window) {
            found.entry(item.id).or_insert_with(|| item.to_info());
        }

        log_event_with_fields(
            Event::QueryExecuted,
            &[
                ("retailer", &retailer_id.to_string()),
                ("matches", &found.len().to_string()),
            ],
        );
        Ok(found.into_values().collect())
    }

    /// Every available (route, listing) pair that delivers into
    /// `destination`, optionally restricted to routes and listings
    /// intersecting `window`.
    pub(super) fn feasible_pairs(
        &self,
        destination: RegionId,
        window: Option<&DateWindow>,
    ) -> Vec<Pair> {
        let mut pairs = Vec::new();
        let Some(by_source) = self.routes_by_dst_src.prefix(destination) else {
            return pairs;
        };

        for (source, routes) in by_source {
            let Some(producers) = self.inventory_by_region.prefix(*source) else {
                continue;
            };

            let routes = routes
                .values()
                .filter(|route| route.is_available() && within(&route.window, window));
            for route in routes {
                for listings in producers.values() {
                    let items = listings
                        .values()
                        .filter(|item| item.is_available() && within(&item.window, window));
                    for item in items {
                        pairs.push((Arc::clone(route), Arc::clone(item)));
                    }
                }
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewInventory, NewRoute};

    struct Fixture {
        market: Market,
        retailer: RetailerId,
        producer: ProducerId,
        produce: ProduceId,
    }

    /// Producer in `farm`, retailer in `city`, one route farm → city over [5, 25]
    fn fixture() -> Fixture {
        let mut market = Market::new();
        let farm = market.add_region("farm").unwrap();
        let city = market.add_region("city").unwrap();
        let produce = market.add_produce("beans").unwrap();
        let producer = market.add_producer("acres", farm).unwrap();
        let truck = market.add_truck_type("van", 10).unwrap();
        let transporter = market.add_transporter("wheels").unwrap();
        let retailer = market.add_retailer("shop", city).unwrap();

        market
            .transporter_add_route(
                transporter,
                NewRoute {
                    truck_type_id: truck,
                    start_region_id: farm,
                    end_region_id: city,
                    start_date: 5,
                    end_date: 25,
                    cost: 100,
                },
            )
            .unwrap();

        Fixture {
            market,
            retailer,
            producer,
            produce,
        }
    }

    fn stock(fx: &mut Fixture, start: Day, end: Day, ppu: u64) -> crate::model::InventoryId {
        fx.market
            .producer_add_inventory(
                fx.producer,
                NewInventory {
                    produce_id: fx.produce,
                    grade: 2,
                    quantity: 50,
                    ppu,
                    start_date: start,
                    end_date: end,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_query_dates_finds_reachable_listing() {
        let mut fx = fixture();
        let id = stock(&mut fx, 10, 20, 3);

        let found = fx.market.retailer_query_dates(fx.retailer, 12, 18).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[test]
    fn test_query_dates_excludes_disjoint_listing() {
        let mut fx = fixture();
        stock(&mut fx, 1, 3, 3);

        let found = fx.market.retailer_query_dates(fx.retailer, 12, 18).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_query_dates_rejects_inverted_window() {
        let fx = fixture();
        let err = fx.market.retailer_query_dates(fx.retailer, 9, 2).unwrap_err();
        assert_eq!(err, MarketError::InvalidWindow { begin: 9, end: 2 });
    }

    #[test]
    fn test_query_unknown_retailer() {
        let fx = fixture();
        let err = fx.market.retailer_query_all(RetailerId(40)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_query_all_ignores_dates_and_sorts() {
        let mut fx = fixture();
        let late = stock(&mut fx, 90, 95, 3);
        let early = stock(&mut fx, 1, 2, 3);

        let ids: Vec<_> = fx
            .market
            .retailer_query_all(fx.retailer)
            .unwrap()
            .into_iter()
            .map(|info| info.id)
            .collect();
        assert_eq!(ids, vec![late, early]);
        assert!(late < early);
    }

    #[test]
    fn test_produce_market_info() {
        let mut fx = fixture();
        stock(&mut fx, 1, 5, 4);
        stock(&mut fx, 1, 5, 9);

        let info = fx.market.produce_market_info(fx.produce).unwrap();
        assert_eq!(info.listings, 2);
        assert_eq!(info.available_quantity, 100);
        assert_eq!(info.min_ppu, Some(4));
        assert_eq!(info.max_ppu, Some(9));
    }

    #[test]
    fn test_produce_market_info_without_listings() {
        let fx = fixture();
        let info = fx.market.produce_market_info(fx.produce).unwrap();
        assert_eq!(info.listings, 0);
        assert_eq!(info.min_ppu, None);
    }

    #[test]
    fn test_projections_unknown_owner() {
        let fx = fixture();
        assert!(fx
            .market
            .producer_all_inventory_info(ProducerId(8))
            .unwrap_err()
            .is_not_found());
        assert!(fx
            .market
            .transporter_all_route_info(TransporterId(8))
            .unwrap_err()
            .is_not_found());
    }
}
