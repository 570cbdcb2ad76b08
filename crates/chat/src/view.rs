//! Read-only snapshot the assistant answers from.
//!
//! The API layer builds this from the repositories; the chat crate never
//! touches storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
}

impl ProductView {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.low_stock_threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementView {
    pub product_name: String,
    pub inbound: bool,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Snapshot of the inventory the assistant reasons over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryView {
    pub products: Vec<ProductView>,
    /// Most recent movements, newest first.
    pub recent_movements: Vec<MovementView>,
}
