//! Typed entity identifiers
//!
//! Every entity kind gets its own id newtype, so a `RegionId` can never be
//! passed where a `ProducerId` is expected. Ids are plain natural numbers
//! allocated by the owning store, starting at 0.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Behaviour shared by all entity ids.
pub trait EntityId: Copy + Ord + fmt::Debug + fmt::Display {
    /// Wrap a raw allocator value
    fn from_raw(raw: u64) -> Self;

    /// Unwrap to the raw allocator value
    fn raw(self) -> u64;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl EntityId for $name {
            fn from_raw(raw: u64) -> Self {
                $name(raw)
            }

            fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Id of a truck type
    TruckTypeId
);
entity_id!(
    /// Id of a region
    RegionId
);
entity_id!(
    /// Id of a produce kind (e.g. "apples")
    ProduceId
);
entity_id!(
    /// Id of a producer
    ProducerId
);
entity_id!(
    /// Id of a transporter
    TransporterId
);
entity_id!(
    /// Id of a retailer
    RetailerId
);
entity_id!(
    /// Id of an inventory listing
    InventoryId
);
entity_id!(
    /// Id of an inventory reservation
    ReservedInventoryId
);
entity_id!(
    /// Id of a delivery route
    RouteId
);
entity_id!(
    /// Id of a route reservation
    ReservedRouteId
);
