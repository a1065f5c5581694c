//! Inventory listings and inventory reservations

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::ProduceDoc;
use super::ids::{InventoryId, ProduceId, ProducerId, ReservedInventoryId, RetailerId};
use super::window::{Availability, DateWindow, Day};

/// Public view of an inventory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryInfo {
    pub id: InventoryId,
    pub producer_id: ProducerId,
    pub produce_id: ProduceId,
    pub grade: u8,
    pub quantity: u32,
    /// Price per unit
    pub ppu: u64,
    pub start_date: Day,
    pub end_date: Day,
    pub available: bool,
}

/// Caller-supplied fields of a new or replacement listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventory {
    pub produce_id: ProduceId,
    pub grade: u8,
    pub quantity: u32,
    pub ppu: u64,
    pub start_date: Day,
    pub end_date: Day,
}

impl NewInventory {
    /// Build the Info for a listing owned by `producer_id`
    pub fn into_info(self, id: InventoryId, producer_id: ProducerId) -> InventoryInfo {
        InventoryInfo {
            id,
            producer_id,
            produce_id: self.produce_id,
            grade: self.grade,
            quantity: self.quantity,
            ppu: self.ppu,
            start_date: self.start_date,
            end_date: self.end_date,
            available: true,
        }
    }
}

/// Internal listing record.
///
/// The owning producer is referenced by id: the producer doc embeds its
/// listings, so embedding the producer here would be circular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryDoc {
    pub id: InventoryId,
    pub producer_id: ProducerId,
    pub produce: Arc<ProduceDoc>,
    pub grade: u8,
    pub quantity: u32,
    pub ppu: u64,
    pub window: DateWindow,
    pub availability: Availability,
}

impl InventoryDoc {
    pub fn to_info(&self) -> InventoryInfo {
        InventoryInfo {
            id: self.id,
            producer_id: self.producer_id,
            produce_id: self.produce.id,
            grade: self.grade,
            quantity: self.quantity,
            ppu: self.ppu,
            start_date: self.window.start(),
            end_date: self.window.end(),
            available: self.availability.is_available(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.availability.is_available()
    }

    /// Copy of this listing in the reserved state
    pub fn reserved(&self) -> Self {
        Self {
            availability: Availability::Reserved,
            ..self.clone()
        }
    }

    /// Price of `quantity` units, saturating on overflow
    pub fn price_of(&self, quantity: u32) -> u64 {
        self.ppu.saturating_mul(u64::from(quantity))
    }
}

/// Public view of an inventory reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedInventoryInfo {
    pub id: ReservedInventoryId,
    pub inventory_id: InventoryId,
    pub retailer_id: RetailerId,
    /// Units the retailer asked for; the whole listing is held regardless
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedInventoryDoc {
    pub id: ReservedInventoryId,
    pub retailer_id: RetailerId,
    /// Listing as it was when the reservation was taken
    pub inventory: Arc<InventoryDoc>,
    pub quantity: u32,
}

impl ReservedInventoryDoc {
    pub fn to_info(&self) -> ReservedInventoryInfo {
        ReservedInventoryInfo {
            id: self.id,
            inventory_id: self.inventory.id,
            retailer_id: self.retailer_id,
            quantity: self.quantity,
        }
    }
}
