//! In-memory store implementations.
//!
//! Backed by `RwLock<HashMap>`; locks are never held across an await point.
//! Intended for tests and single-process deployments. Not optimized for
//! large catalogs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stocksmith_auth::{Role, User};
use stocksmith_catalog::{Category, Product, ProductPrice};
use stocksmith_core::{CategoryId, LocationId, MovementId, ProductId, RoleId, TodoId, UserId};
use stocksmith_inventory::{Location, StockMovement};
use stocksmith_tasks::TodoItem;

use super::{
    CategoryStore, LocationStore, MovementStore, ProductStore, RoleStore, StoreError,
    StoreResult, TodoStore, UserStore,
};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::backend("lock poisoned")
}

// ─── Products ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
    prices: RwLock<HashMap<ProductId, Vec<ProductPrice>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let products = self.products.read().map_err(poisoned)?;
        Ok(products.get(&id).cloned())
    }

    async fn find_by_sku(&self, sku: &str) -> StoreResult<Option<Product>> {
        let products = self.products.read().map_err(poisoned)?;
        Ok(products.values().find(|p| p.sku == sku).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        let products = self.products.read().map_err(poisoned)?;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| (a.created_at, a.id.as_uuid()).cmp(&(b.created_at, b.id.as_uuid())));
        Ok(all)
    }

    async fn upsert(&self, product: Product) -> StoreResult<()> {
        let mut products = self.products.write().map_err(poisoned)?;
        products.insert(product.id, product);
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        let mut products = self.products.write().map_err(poisoned)?;
        let existed = products.remove(&id).is_some();
        drop(products);
        let mut prices = self.prices.write().map_err(poisoned)?;
        prices.remove(&id);
        Ok(existed)
    }

    async fn append_price(&self, price: ProductPrice) -> StoreResult<()> {
        let mut prices = self.prices.write().map_err(poisoned)?;
        prices.entry(price.product_id).or_default().push(price);
        Ok(())
    }

    async fn price_history(&self, id: ProductId) -> StoreResult<Vec<ProductPrice>> {
        let prices = self.prices.read().map_err(poisoned)?;
        Ok(prices.get(&id).cloned().unwrap_or_default())
    }
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn get(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let categories = self.categories.read().map_err(poisoned)?;
        Ok(categories.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let needle = name.trim().to_lowercase();
        let categories = self.categories.read().map_err(poisoned)?;
        Ok(categories
            .values()
            .find(|c| c.name.to_lowercase() == needle)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Category>> {
        let categories = self.categories.read().map_err(poisoned)?;
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn upsert(&self, category: Category) -> StoreResult<()> {
        let mut categories = self.categories.write().map_err(poisoned)?;
        categories.insert(category.id, category);
        Ok(())
    }

    async fn delete(&self, id: CategoryId) -> StoreResult<bool> {
        let mut categories = self.categories.write().map_err(poisoned)?;
        Ok(categories.remove(&id).is_some())
    }
}

// ─── Locations ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryLocationStore {
    locations: RwLock<HashMap<LocationId, Location>>,
}

impl InMemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn get(&self, id: LocationId) -> StoreResult<Option<Location>> {
        let locations = self.locations.read().map_err(poisoned)?;
        Ok(locations.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Location>> {
        let locations = self.locations.read().map_err(poisoned)?;
        let mut all: Vec<Location> = locations.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn upsert(&self, location: Location) -> StoreResult<()> {
        let mut locations = self.locations.write().map_err(poisoned)?;
        locations.insert(location.id, location);
        Ok(())
    }

    async fn delete(&self, id: LocationId) -> StoreResult<bool> {
        let mut locations = self.locations.write().map_err(poisoned)?;
        Ok(locations.remove(&id).is_some())
    }
}

// ─── Movements ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryMovementStore {
    movements: RwLock<HashMap<MovementId, StockMovement>>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_desc(mut movements: Vec<StockMovement>) -> Vec<StockMovement> {
        movements
            .sort_by(|a, b| (b.occurred_at, b.id.as_uuid()).cmp(&(a.occurred_at, a.id.as_uuid())));
        movements
    }
}

#[async_trait]
impl MovementStore for InMemoryMovementStore {
    async fn get(&self, id: MovementId) -> StoreResult<Option<StockMovement>> {
        let movements = self.movements.read().map_err(poisoned)?;
        Ok(movements.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<StockMovement>> {
        let movements = self.movements.read().map_err(poisoned)?;
        Ok(Self::sorted_desc(movements.values().cloned().collect()))
    }

    async fn list_for_product(&self, product_id: ProductId) -> StoreResult<Vec<StockMovement>> {
        let movements = self.movements.read().map_err(poisoned)?;
        Ok(Self::sorted_desc(
            movements
                .values()
                .filter(|m| m.product_id == product_id)
                .cloned()
                .collect(),
        ))
    }

    async fn exists_for_product(&self, product_id: ProductId) -> StoreResult<bool> {
        let movements = self.movements.read().map_err(poisoned)?;
        Ok(movements.values().any(|m| m.product_id == product_id))
    }

    async fn insert(&self, movement: StockMovement) -> StoreResult<()> {
        let mut movements = self.movements.write().map_err(poisoned)?;
        movements.insert(movement.id, movement);
        Ok(())
    }

    async fn delete(&self, id: MovementId) -> StoreResult<bool> {
        let mut movements = self.movements.write().map_err(poisoned)?;
        Ok(movements.remove(&id).is_some())
    }
}

// ─── Todos ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    todos: RwLock<HashMap<TodoId, TodoItem>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn get(&self, id: TodoId) -> StoreResult<Option<TodoItem>> {
        let todos = self.todos.read().map_err(poisoned)?;
        Ok(todos.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<TodoItem>> {
        let todos = self.todos.read().map_err(poisoned)?;
        let mut all: Vec<TodoItem> = todos.values().cloned().collect();
        all.sort_by(|a, b| (a.created_at, a.id.as_uuid()).cmp(&(b.created_at, b.id.as_uuid())));
        Ok(all)
    }

    async fn upsert(&self, todo: TodoItem) -> StoreResult<()> {
        let mut todos = self.todos.write().map_err(poisoned)?;
        todos.insert(todo.id, todo);
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> StoreResult<bool> {
        let mut todos = self.todos.write().map_err(poisoned)?;
        Ok(todos.remove(&id).is_some())
    }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let needle = email.trim().to_lowercase();
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().find(|u| u.email == needle).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().map_err(poisoned)?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| (a.created_at, a.id.as_uuid()).cmp(&(b.created_at, b.id.as_uuid())));
        Ok(all)
    }

    async fn upsert(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().map_err(poisoned)?;
        users.insert(user.id, user);
        Ok(())
    }

    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        let mut users = self.users.write().map_err(poisoned)?;
        Ok(users.remove(&id).is_some())
    }

    async fn any_with_role(&self, role_name: &str) -> StoreResult<bool> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().any(|u| u.role.as_str() == role_name))
    }
}

// ─── Roles ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    roles: RwLock<HashMap<RoleId, Role>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn get(&self, id: RoleId) -> StoreResult<Option<Role>> {
        let roles = self.roles.read().map_err(poisoned)?;
        Ok(roles.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let needle = name.trim().to_lowercase();
        let roles = self.roles.read().map_err(poisoned)?;
        Ok(roles
            .values()
            .find(|r| r.name.as_str() == needle)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Role>> {
        let roles = self.roles.read().map_err(poisoned)?;
        let mut all: Vec<Role> = roles.values().cloned().collect();
        all.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(all)
    }

    async fn upsert(&self, role: Role) -> StoreResult<()> {
        let mut roles = self.roles.write().map_err(poisoned)?;
        roles.insert(role.id, role);
        Ok(())
    }

    async fn delete(&self, id: RoleId) -> StoreResult<bool> {
        let mut roles = self.roles.write().map_err(poisoned)?;
        Ok(roles.remove(&id).is_some())
    }
}
