//! Storage and lookup infrastructure.
//!
//! Domain crates stay persistence-free; this crate supplies the store traits
//! the service layer talks to, an in-memory implementation used for tests and
//! single-process deployments, an optional Postgres implementation behind the
//! `postgres` feature, and the keyword search index over the catalog.

pub mod search;
pub mod store;

pub use search::ProductSearchIndex;
pub use store::{
    CategoryStore, LocationStore, MovementStore, ProductStore, RoleStore, StoreError,
    StoreResult, TodoStore, UserStore,
};
pub use store::memory::{
    InMemoryCategoryStore, InMemoryLocationStore, InMemoryMovementStore, InMemoryProductStore,
    InMemoryRoleStore, InMemoryTodoStore, InMemoryUserStore,
};

#[cfg(feature = "postgres")]
pub use store::postgres::{run_migrations, PostgresMovementStore, PostgresProductStore};
