//! `stocksmith-chat`
//!
//! **Responsibility:** natural-language assistant over the inventory data.
//!
//! This crate is intentionally **not** part of the domain model:
//! - It must not depend on catalog/inventory entities (it reads a snapshot).
//! - It must not mutate state.
//! - Intent detection is keyword/regex based: linear, stateless, single pass.

pub mod assistant;
pub mod intent;
pub mod view;

pub use assistant::{Assistant, ChatError, ChatReply, KeywordAssistant};
pub use intent::{detect_intent, Intent};
pub use view::{InventoryView, MovementView, ProductView};
