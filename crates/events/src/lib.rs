//! `stocksmith-events` — realtime notification fan-out.
//!
//! Notifications are best-effort: lossy broadcast, no delivery guarantee,
//! no ordering guarantee, no replay. Subscribers that fall behind miss
//! messages and must refetch state through the normal read paths.

pub mod notification;
pub mod topics;

pub use notification::{Notification, NotificationHub};
