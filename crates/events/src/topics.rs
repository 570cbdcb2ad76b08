//! Well-known notification topics.

pub const PRODUCT_CREATED: &str = "catalog.product_created";
pub const PRODUCT_UPDATED: &str = "catalog.product_updated";
pub const PRODUCT_DELETED: &str = "catalog.product_deleted";
pub const MOVEMENT_RECORDED: &str = "inventory.movement_recorded";
pub const MOVEMENT_DELETED: &str = "inventory.movement_deleted";
pub const LOW_STOCK: &str = "inventory.low_stock";
pub const STATS_UPDATED: &str = "dashboard.stats_updated";
pub const TODO_CHANGED: &str = "tasks.todo_changed";
