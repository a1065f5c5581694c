//! Catalog entities: truck types, regions and produce kinds
//!
//! These carry no foreign keys, so their Info→Doc conversion never fails.

use serde::{Deserialize, Serialize};

use super::ids::{ProduceId, RegionId, TruckTypeId};

/// Public view of a truck type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckTypeInfo {
    pub id: TruckTypeId,
    pub name: String,
    /// Load capacity in produce units
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruckTypeDoc {
    pub id: TruckTypeId,
    pub name: String,
    pub capacity: u32,
}

impl TruckTypeDoc {
    pub fn to_info(&self) -> TruckTypeInfo {
        TruckTypeInfo {
            id: self.id,
            name: self.name.clone(),
            capacity: self.capacity,
        }
    }
}

/// Public view of a region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub id: RegionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDoc {
    pub id: RegionId,
    pub name: String,
}

impl RegionDoc {
    pub fn to_info(&self) -> RegionInfo {
        RegionInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Public view of a produce kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceInfo {
    pub id: ProduceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProduceDoc {
    pub id: ProduceId,
    pub name: String,
}

impl ProduceDoc {
    pub fn to_info(&self) -> ProduceInfo {
        ProduceInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
