//! `stocksmith-dashboard` — aggregate statistics for the UI dashboard.
//!
//! The computation is a deliberately boring single pass over products and
//! movements (no incremental state); freshness comes from a short-TTL cache.

pub mod cache;
pub mod stats;

pub use cache::StatsCache;
pub use stats::{compute_stats, DashboardStats, LowStockEntry, TrendBucket, TREND_DAYS};
