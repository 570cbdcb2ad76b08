//! `stocksmith-inventory` — stock ledger domain.
//!
//! Locations and stock movements (the in/out ledger). The one invariant that
//! matters: applying or reversing a movement may never take a product's
//! on-hand quantity below zero.

pub mod location;
pub mod movement;

pub use location::{CreateLocation, Location, UpdateLocation};
pub use movement::{Direction, RecordMovement, StockMovement};
