use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocksmith_core::{DomainError, DomainResult, MovementId, ProductId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Out => f.write_str("out"),
        }
    }
}

/// Ledger entry: an inbound or outbound quantity change for a product, with
/// the unit price at the time of the movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub direction: Direction,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: record a stock movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMovement {
    pub movement_id: MovementId,
    pub product_id: ProductId,
    pub direction: Direction,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn record(cmd: RecordMovement) -> DomainResult<Self> {
        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if cmd.unit_price_cents < 0 {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        Ok(Self {
            id: cmd.movement_id,
            product_id: cmd.product_id,
            direction: cmd.direction,
            quantity: cmd.quantity,
            unit_price_cents: cmd.unit_price_cents,
            note: cmd.note,
            occurred_at: cmd.occurred_at,
        })
    }

    /// Signed stock delta this movement applies to its product.
    pub fn stock_delta(&self) -> i64 {
        match self.direction {
            Direction::In => self.quantity,
            Direction::Out => -self.quantity,
        }
    }

    /// Signed stock delta of undoing this movement (ledger entry deletion).
    pub fn reversal_delta(&self) -> i64 {
        -self.stock_delta()
    }

    /// Value of the moved goods at the recorded unit price.
    pub fn value_cents(&self) -> i64 {
        self.quantity.saturating_mul(self.unit_price_cents)
    }
}
