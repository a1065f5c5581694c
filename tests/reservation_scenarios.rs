//! Reservation Scenario Tests
//!
//! End-to-end matching over a small market:
//! - Date-window queries through the route join
//! - Cheapest reservation, its tie-breaking and its atomicity
//! - Caller-chosen reservations and their feasibility checks

use agromart::market::{Market, MarketError};
use agromart::model::{
    Day, InventoryId, NewInventory, NewRoute, ProduceId, ProducerId, RegionId, RetailerId,
    RouteId, TransporterId, TruckTypeId,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// R1 → R2 market: P1 in R1, L1 in R2, produce X, truck K1, transporter T1
struct Scene {
    market: Market,
    r1: RegionId,
    r2: RegionId,
    p1: ProducerId,
    x: ProduceId,
    k1: TruckTypeId,
    t1: TransporterId,
    l1: RetailerId,
}

const GRADE: u8 = 1;

fn scene() -> Scene {
    let mut market = Market::new();
    let r1 = market.add_region("R1").unwrap();
    let r2 = market.add_region("R2").unwrap();
    let p1 = market.add_producer("P1", r1).unwrap();
    let x = market.add_produce("X").unwrap();
    let t1 = market.add_transporter("T1").unwrap();
    let k1 = market.add_truck_type("K1", 100).unwrap();
    let l1 = market.add_retailer("L1", r2).unwrap();
    Scene {
        market,
        r1,
        r2,
        p1,
        x,
        k1,
        t1,
        l1,
    }
}

impl Scene {
    fn stock(&mut self, ppu: u64, quantity: u32, start: Day, end: Day) -> InventoryId {
        self.market
            .producer_add_inventory(
                self.p1,
                NewInventory {
                    produce_id: self.x,
                    grade: GRADE,
                    quantity,
                    ppu,
                    start_date: start,
                    end_date: end,
                },
            )
            .unwrap()
    }

    fn route(&mut self, from: RegionId, to: RegionId, cost: u64, start: Day, end: Day) -> RouteId {
        self.market
            .transporter_add_route(
                self.t1,
                NewRoute {
                    truck_type_id: self.k1,
                    start_region_id: from,
                    end_region_id: to,
                    start_date: start,
                    end_date: end,
                    cost,
                },
            )
            .unwrap()
    }

    /// The classic setup: inventory [10,20], route R1→R2 [5,25] cost 100
    fn classic(&mut self) -> (InventoryId, RouteId) {
        let item = self.stock(5, 40, 10, 20);
        let route = self.route(self.r1, self.r2, 100, 5, 25);
        (item, route)
    }
}

// =============================================================================
// Query Scenarios
// =============================================================================

/// Query dates [12,18] finds the listing via the R1→R2 route.
#[test]
fn test_query_dates_finds_listing() {
    let mut s = scene();
    let (item, _) = s.classic();

    let found = s.market.retailer_query_dates(s.l1, 12, 18).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, item);
}

/// Two routes into the same region do not duplicate the listing.
#[test]
fn test_query_dates_deduplicates() {
    let mut s = scene();
    let (item, _) = s.classic();
    s.route(s.r1, s.r2, 60, 0, 30);

    let found = s.market.retailer_query_dates(s.l1, 12, 18).unwrap();
    assert_eq!(found.iter().map(|i| i.id).collect::<Vec<_>>(), vec![item]);
}

/// A route in the wrong direction reaches nobody in R2.
#[test]
fn test_query_dates_ignores_reverse_route() {
    let mut s = scene();
    s.stock(5, 40, 10, 20);
    s.route(s.r2, s.r1, 100, 5, 25);

    assert!(s.market.retailer_query_dates(s.l1, 12, 18).unwrap().is_empty());
}

/// A route outside the window hides the listing.
#[test]
fn test_query_dates_route_outside_window() {
    let mut s = scene();
    s.stock(5, 40, 10, 20);
    s.route(s.r1, s.r2, 100, 30, 40);

    assert!(s.market.retailer_query_dates(s.l1, 12, 18).unwrap().is_empty());
    assert_eq!(s.market.retailer_query_all(s.l1).unwrap().len(), 1);
}

// =============================================================================
// Cheapest Reservation Scenarios
// =============================================================================

/// First call reserves, an identical second call finds nothing.
#[test]
fn test_cheapest_then_exhausted() {
    let mut s = scene();
    let (item, route) = s.classic();

    let pair = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 10, 12, 18)
        .unwrap();
    let held_item = s.market.reserved_inventory().get_info(pair.inventory).unwrap();
    let held_route = s.market.reserved_routes().get_info(pair.route).unwrap();
    assert_eq!(held_item.inventory_id, item);
    assert_eq!(held_item.retailer_id, s.l1);
    assert_eq!(held_route.route_id, route);

    let err = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 10, 12, 18)
        .unwrap_err();
    assert!(err.is_infeasible());
    s.market.check_indices().unwrap();
}

/// A window disjoint from both items yields no match.
#[test]
fn test_cheapest_disjoint_window() {
    let mut s = scene();
    s.classic();

    let err = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 10, 50, 60)
        .unwrap_err();
    assert!(err.is_infeasible());
    assert!(s.market.reserved_inventory().is_empty());
    assert!(s.market.reserved_routes().is_empty());
}

/// A listing that expires before the route runs is never matched.
#[test]
fn test_cheapest_skips_item_route_gap() {
    let mut s = scene();
    let item = s.stock(5, 40, 10, 12);
    let route = s.route(s.r1, s.r2, 100, 16, 20);

    let err = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 5, 10, 20)
        .unwrap_err();
    assert!(err.is_infeasible());
    assert!(s.market.reserved_inventory().is_empty());
    assert!(s.market.reserved_routes().is_empty());

    let err = s.market.retailer_reserve(s.l1, item, route).unwrap_err();
    assert!(err.is_infeasible());
}

/// With a gap on one route, the overlapping dearer route is chosen.
#[test]
fn test_cheapest_prefers_overlapping_route() {
    let mut s = scene();
    s.stock(5, 40, 10, 12);
    s.route(s.r1, s.r2, 10, 16, 20);
    let overlapping = s.route(s.r1, s.r2, 90, 11, 20);

    let pair = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 5, 10, 20)
        .unwrap();
    let held = s.market.reserved_routes().get_info(pair.route).unwrap();
    assert_eq!(held.route_id, overlapping);
    s.market.check_indices().unwrap();
}

/// Total cost counts both price and transport.
#[test]
fn test_cheapest_weighs_route_cost() {
    let mut s = scene();
    s.stock(5, 40, 10, 20);
    let cheap_route = s.route(s.r1, s.r2, 10, 5, 25);
    s.route(s.r1, s.r2, 90, 5, 25);

    let pair = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 4, 12, 18)
        .unwrap();
    let held = s.market.reserved_routes().get_info(pair.route).unwrap();
    assert_eq!(held.route_id, cheap_route);
}

/// Equal totals go to the lowest inventory id, then the lowest route id.
#[test]
fn test_cheapest_tie_break() {
    let mut s = scene();
    let first = s.stock(5, 40, 10, 20);
    let _second = s.stock(5, 40, 10, 20);
    let low_route = s.route(s.r1, s.r2, 50, 5, 25);
    let _high_route = s.route(s.r1, s.r2, 50, 5, 25);

    let pair = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 4, 12, 18)
        .unwrap();
    let item = s.market.reserved_inventory().get_info(pair.inventory).unwrap();
    let route = s.market.reserved_routes().get_info(pair.route).unwrap();
    assert_eq!(item.inventory_id, first);
    assert_eq!(route.route_id, low_route);
}

/// Grade and produce must match exactly.
#[test]
fn test_cheapest_respects_grade() {
    let mut s = scene();
    s.classic();

    let err = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE + 1, 4, 12, 18)
        .unwrap_err();
    assert!(err.is_infeasible());
}

/// An inverted request window is rejected before matching.
#[test]
fn test_cheapest_inverted_window() {
    let mut s = scene();
    s.classic();

    let err = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 4, 18, 12)
        .unwrap_err();
    assert_eq!(err, MarketError::InvalidWindow { begin: 18, end: 12 });
}

/// Reservations show up under all three parties.
#[test]
fn test_reservation_visible_to_parties() {
    let mut s = scene();
    s.classic();
    let pair = s
        .market
        .retailer_reserve_cheapest(s.l1, s.x, GRADE, 4, 12, 18)
        .unwrap();

    let retailer = s.market.retailer_all_reservation_info(s.l1).unwrap();
    assert_eq!(retailer.inventory.len(), 1);
    assert_eq!(retailer.routes.len(), 1);
    assert_eq!(retailer.inventory[0].id, pair.inventory);

    let producer = s.market.producer_reservations(s.p1).unwrap();
    assert_eq!(producer[0].id, pair.inventory);

    let transporter = s.market.transporter_all_reservation_info(s.t1).unwrap();
    assert_eq!(transporter[0].id, pair.route);
}

// =============================================================================
// Caller-Chosen Reservation Scenarios
// =============================================================================

/// A feasible pair is reserved for the whole listing quantity.
#[test]
fn test_reserve_chosen_pair() {
    let mut s = scene();
    let (item, route) = s.classic();

    let pair = s.market.retailer_reserve(s.l1, item, route).unwrap();
    let held = s.market.reserved_inventory().get_info(pair.inventory).unwrap();
    assert_eq!(held.quantity, 40);
    assert!(!s.market.inventory().get_info(item).unwrap().available);
    assert!(!s.market.routes().get_info(route).unwrap().available);
}

/// The same pair cannot be reserved twice.
#[test]
fn test_reserve_twice() {
    let mut s = scene();
    let (item, route) = s.classic();
    s.market.retailer_reserve(s.l1, item, route).unwrap();

    let err = s.market.retailer_reserve(s.l1, item, route).unwrap_err();
    assert!(err.is_infeasible());
    assert_eq!(s.market.reserved_inventory().len(), 1);
}

/// Route windows that miss the listing window are rejected.
#[test]
fn test_reserve_disjoint_windows() {
    let mut s = scene();
    let item = s.stock(5, 40, 10, 20);
    let route = s.route(s.r1, s.r2, 100, 21, 30);

    let err = s.market.retailer_reserve(s.l1, item, route).unwrap_err();
    assert!(err.is_infeasible());
}

/// A route from another region cannot carry the listing.
#[test]
fn test_reserve_wrong_source() {
    let mut s = scene();
    let r3 = s.market.add_region("R3").unwrap();
    let item = s.stock(5, 40, 10, 20);
    let route = s.route(r3, s.r2, 100, 5, 25);

    let err = s.market.retailer_reserve(s.l1, item, route).unwrap_err();
    assert!(err.is_infeasible());
    assert!(s.market.inventory().get_info(item).unwrap().available);
}

/// Unknown ids are not found, not infeasible.
#[test]
fn test_reserve_unknown_ids() {
    let mut s = scene();
    let (item, route) = s.classic();

    assert!(s
        .market
        .retailer_reserve(RetailerId(9), item, route)
        .unwrap_err()
        .is_not_found());
    assert!(s
        .market
        .retailer_reserve(s.l1, InventoryId(9), route)
        .unwrap_err()
        .is_not_found());
}

// =============================================================================
// Removal After Reservation
// =============================================================================

/// Reserved items stay put; available ones can be withdrawn.
#[test]
fn test_remove_reserved_and_available() {
    let mut s = scene();
    let (item, route) = s.classic();
    let spare = s.stock(9, 5, 10, 20);
    s.market.retailer_reserve(s.l1, item, route).unwrap();

    assert!(s
        .market
        .producer_rem_inventory(s.p1, item)
        .unwrap_err()
        .is_infeasible());
    assert_eq!(s.market.producer_rem_inventory(s.p1, spare).unwrap().id, spare);
    assert!(s
        .market
        .transporter_rem_route(s.t1, route)
        .unwrap_err()
        .is_infeasible());
    s.market.check_indices().unwrap();
}
