//! Store traits the service layer depends on.
//!
//! Each entity gets a small async trait with the lookups the use cases need.
//! Implementations must be `Send + Sync`; the API shares them as
//! `Arc<dyn ...Store>`. Cross-entity rules (sku uniqueness, delete guards,
//! stock invariants) live in the service layer, not here.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use stocksmith_auth::{Role, User};
use stocksmith_catalog::{Category, Product, ProductPrice};
use stocksmith_core::{CategoryId, LocationId, MovementId, ProductId, RoleId, TodoId, UserId};
use stocksmith_inventory::{Location, StockMovement};
use stocksmith_tasks::TodoItem;

/// Infrastructure-level storage failure (backend I/O, poisoned lock).
///
/// Domain rule violations never surface as `StoreError`; those are decided
/// before the store is touched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>>;
    async fn find_by_sku(&self, sku: &str) -> StoreResult<Option<Product>>;
    /// All products, ordered by creation time then id.
    async fn list(&self) -> StoreResult<Vec<Product>>;
    async fn upsert(&self, product: Product) -> StoreResult<()>;
    /// Returns `false` when the product did not exist.
    async fn delete(&self, id: ProductId) -> StoreResult<bool>;
    async fn append_price(&self, price: ProductPrice) -> StoreResult<()>;
    /// Price snapshots for a product, oldest first.
    async fn price_history(&self, id: ProductId) -> StoreResult<Vec<ProductPrice>>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>>;
    /// Case-insensitive name lookup, for the uniqueness check.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>>;
    async fn list(&self) -> StoreResult<Vec<Category>>;
    async fn upsert(&self, category: Category) -> StoreResult<()>;
    async fn delete(&self, id: CategoryId) -> StoreResult<bool>;
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn get(&self, id: LocationId) -> StoreResult<Option<Location>>;
    async fn list(&self) -> StoreResult<Vec<Location>>;
    async fn upsert(&self, location: Location) -> StoreResult<()>;
    async fn delete(&self, id: LocationId) -> StoreResult<bool>;
}

#[async_trait]
pub trait MovementStore: Send + Sync {
    async fn get(&self, id: MovementId) -> StoreResult<Option<StockMovement>>;
    /// All movements, newest first.
    async fn list(&self) -> StoreResult<Vec<StockMovement>>;
    /// Movements for one product, newest first.
    async fn list_for_product(&self, product_id: ProductId) -> StoreResult<Vec<StockMovement>>;
    /// True when at least one movement references the product (delete guard).
    async fn exists_for_product(&self, product_id: ProductId) -> StoreResult<bool>;
    async fn insert(&self, movement: StockMovement) -> StoreResult<()>;
    async fn delete(&self, id: MovementId) -> StoreResult<bool>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn get(&self, id: TodoId) -> StoreResult<Option<TodoItem>>;
    async fn list(&self) -> StoreResult<Vec<TodoItem>>;
    async fn upsert(&self, todo: TodoItem) -> StoreResult<()>;
    async fn delete(&self, id: TodoId) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: UserId) -> StoreResult<Option<User>>;
    /// Lookup by normalized (lowercased, trimmed) email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn upsert(&self, user: User) -> StoreResult<()>;
    async fn delete(&self, id: UserId) -> StoreResult<bool>;
    /// True when at least one user holds the named role (role delete guard).
    async fn any_with_role(&self, role_name: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get(&self, id: RoleId) -> StoreResult<Option<Role>>;
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>>;
    async fn list(&self) -> StoreResult<Vec<Role>>;
    async fn upsert(&self, role: Role) -> StoreResult<()>;
    async fn delete(&self, id: RoleId) -> StoreResult<bool>;
}
