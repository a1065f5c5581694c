//! Index maintenance
//!
//! The `commit_*` helpers write an already validated doc into its table and
//! refresh every copy of it held elsewhere: the owner's collection and the
//! derived indices. They cannot fail for a recoverable reason. A failed
//! index or table write there is a broken invariant and aborts via
//! [`OrFatal`].

use std::fmt;
use std::sync::Arc;

use crate::index::{IndexError, IndexResult, SparseMap2, SparseMap3};
use crate::model::{
    InventoryDoc, InventoryMap, ProducerDoc, ProducerId, RegionId, RetailerDoc, RouteDoc, RouteId,
    TransporterDoc,
};
use crate::observability::{log_event_with_fields, Event};
use crate::store::StoreResult;

use super::Market;

pub const INVENTORY_BY_REGION: &str = "inventory_by_region";
pub const ROUTES_BY_DST_SRC: &str = "routes_by_dst_src";

/// region → producer → the producer's listings
pub type InventoryIndex = SparseMap2<RegionId, ProducerId, Arc<InventoryMap>>;

/// end region → start region → route id → route
pub type RouteIndex = SparseMap3<RegionId, RegionId, RouteId, Arc<RouteDoc>>;

/// Unwrap a result whose failure means market state is corrupt.
///
/// Logs `INDEX_INVARIANT_VIOLATED` and panics.
pub(super) trait OrFatal<T> {
    fn or_fatal(self) -> T;
}

impl<T> OrFatal<T> for IndexResult<T> {
    fn or_fatal(self) -> T {
        self.unwrap_or_else(|err| abort(err.code().code(), &err))
    }
}

impl<T> OrFatal<T> for StoreResult<T> {
    fn or_fatal(self) -> T {
        self.unwrap_or_else(|err| abort(err.code(), &err))
    }
}

fn abort(code: &str, err: &dyn fmt::Display) -> ! {
    let reason = err.to_string();
    log_event_with_fields(
        Event::IndexInvariantViolated,
        &[("code", code), ("reason", &reason)],
    );
    panic!("market invariant violated: {}", reason);
}

impl Market {
    /// Store a producer and refresh its inventory index entry.
    ///
    /// The producer's region must not have changed.
    pub(super) fn commit_producer(&mut self, doc: ProducerDoc) {
        self.inventory_by_region
            .replace(doc.region.id, doc.id, Arc::clone(&doc.inventory))
            .or_fatal();
        self.producers.update(doc.id, doc).or_fatal();
    }

    /// Store a listing and refresh its producer's collection
    pub(super) fn commit_inventory(&mut self, doc: InventoryDoc) {
        let doc = Arc::new(doc);
        let producer = self.producers.require(doc.producer_id).or_fatal();

        let mut listings = (*producer.inventory).clone();
        listings.insert(doc.id, Arc::clone(&doc));

        self.inventory.update(doc.id, doc).or_fatal();
        self.commit_producer(producer.with_inventory(listings));
    }

    /// Store a route and refresh its transporter's collection and index leaf
    pub(super) fn commit_route(&mut self, doc: RouteDoc) {
        let doc = Arc::new(doc);
        let mut transporter = (*self.transporters.require(doc.transporter_id).or_fatal()).clone();
        transporter.routes.insert(doc.id, Arc::clone(&doc));

        self.routes.update(doc.id, Arc::clone(&doc)).or_fatal();
        self.commit_transporter(transporter);
        self.routes_by_dst_src
            .replace(doc.end_region.id, doc.start_region.id, doc.id, doc)
            .or_fatal();
    }

    pub(super) fn commit_transporter(&mut self, doc: TransporterDoc) {
        self.transporters.update(doc.id, doc).or_fatal();
    }

    pub(super) fn commit_retailer(&mut self, doc: RetailerDoc) {
        self.retailers.update(doc.id, doc).or_fatal();
    }

    /// Verify that both indices and all owner collections mirror the tables.
    ///
    /// Checks both directions: every index entry points at a live record
    /// with matching keys and content, and every live record has its entry.
    pub fn check_indices(&self) -> IndexResult<()> {
        self.check_inventory_index()?;
        self.check_route_index()
    }

    fn check_inventory_index(&self) -> IndexResult<()> {
        let diverged = |reason: String| IndexError::diverged(INVENTORY_BY_REGION, reason);

        for (region, producer_id, listings) in self.inventory_by_region.iter() {
            let producer = self
                .producers
                .get_doc(producer_id)
                .ok_or_else(|| diverged(format!("entry for missing producer {}", producer_id)))?;
            if producer.region.id != region {
                return Err(diverged(format!(
                    "producer {} filed under region {} but lives in {}",
                    producer_id, region, producer.region.id
                )));
            }
            if **listings != *producer.inventory {
                return Err(diverged(format!(
                    "stale listings for producer {}",
                    producer_id
                )));
            }
        }

        if self.inventory_by_region.len() != self.producers.len() {
            return Err(diverged(format!(
                "{} entries for {} producers",
                self.inventory_by_region.len(),
                self.producers.len()
            )));
        }

        let mut owned = 0;
        for (_, producer) in self.producers.iter() {
            for (id, listing) in producer.inventory.iter() {
                match self.inventory.get_doc(*id) {
                    Some(stored) if *stored == **listing && stored.producer_id == producer.id => {
                        owned += 1
                    }
                    _ => {
                        return Err(diverged(format!(
                            "producer {} holds stale listing {}",
                            producer.id, id
                        )))
                    }
                }
            }
        }
        if owned != self.inventory.len() {
            return Err(diverged(format!(
                "{} listings owned by producers, {} stored",
                owned,
                self.inventory.len()
            )));
        }

        Ok(())
    }

    fn check_route_index(&self) -> IndexResult<()> {
        let diverged = |reason: String| IndexError::diverged(ROUTES_BY_DST_SRC, reason);

        for (end, start, id, route) in self.routes_by_dst_src.iter() {
            let stored = self
                .routes
                .get_doc(id)
                .ok_or_else(|| diverged(format!("entry for missing route {}", id)))?;
            if stored.end_region.id != end || stored.start_region.id != start {
                return Err(diverged(format!(
                    "route {} filed under ({}, {})",
                    id, end, start
                )));
            }
            if **route != *stored {
                return Err(diverged(format!("stale copy of route {}", id)));
            }
        }

        if self.routes_by_dst_src.len() != self.routes.len() {
            return Err(diverged(format!(
                "{} entries for {} routes",
                self.routes_by_dst_src.len(),
                self.routes.len()
            )));
        }

        let mut owned = 0;
        for (_, transporter) in self.transporters.iter() {
            for (id, route) in transporter.routes.iter() {
                match self.routes.get_doc(*id) {
                    Some(stored)
                        if *stored == **route && stored.transporter_id == transporter.id =>
                    {
                        owned += 1
                    }
                    _ => {
                        return Err(diverged(format!(
                            "transporter {} holds stale route {}",
                            transporter.id, id
                        )))
                    }
                }
            }
        }
        if owned != self.routes.len() {
            return Err(diverged(format!(
                "{} routes owned by transporters, {} stored",
                owned,
                self.routes.len()
            )));
        }

        Ok(())
    }
}
