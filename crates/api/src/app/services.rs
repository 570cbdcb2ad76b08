//! Store wiring and use-case methods.
//!
//! `AppServices` owns the stores, the search index, the notification hub and
//! the dashboard cache, and exposes one method per use case. Cross-entity
//! rules (sku uniqueness, delete guards, the non-negative stock invariant)
//! are enforced here; the domain crates stay storage-free.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::Utc;
use serde_json::json;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use stocksmith_auth::{
    default_claims, hash_password, verify_password, ChangeRole, CreateUser, Hs256Jwt, JwtClaims,
    JwtValidator, Permission, Role, RoleName, UpdateUser, User, ADMIN_ROLE, USER_ROLE,
};
use stocksmith_catalog::{
    Category, CreateCategory, CreateProduct, Product, ProductPrice, UpdateCategory, UpdateProduct,
};
use stocksmith_chat::{
    Assistant, ChatReply, InventoryView, KeywordAssistant, MovementView, ProductView,
};
use stocksmith_core::{
    CategoryId, DomainError, LocationId, MovementId, ProductId, RoleId, TodoId, UserId,
};
use stocksmith_dashboard::{compute_stats, DashboardStats, StatsCache};
use stocksmith_events::{topics, Notification, NotificationHub};
use stocksmith_infra::{
    CategoryStore, InMemoryCategoryStore, InMemoryLocationStore, InMemoryMovementStore,
    InMemoryProductStore, InMemoryRoleStore, InMemoryTodoStore, InMemoryUserStore, LocationStore,
    MovementStore, ProductSearchIndex, ProductStore, RoleStore, StoreResult, TodoStore, UserStore,
};
use stocksmith_inventory::{
    CreateLocation, Direction, Location, RecordMovement, StockMovement, UpdateLocation,
};
use stocksmith_tasks::{CreateTodo, TodoItem, UpdateTodo};

use super::dto;
use super::errors::{ApiError, ApiResult};
use super::AppConfig;
use crate::context::PrincipalContext;

/// Token lifetime for issued logins.
const TOKEN_TTL_HOURS: i64 = 24;

/// How many recent movements the chat assistant sees.
const CHAT_RECENT_MOVEMENTS: usize = 20;

pub struct AppServices {
    products: Arc<dyn ProductStore>,
    categories: Arc<dyn CategoryStore>,
    locations: Arc<dyn LocationStore>,
    movements: Arc<dyn MovementStore>,
    todos: Arc<dyn TodoStore>,
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    search: ProductSearchIndex,
    hub: NotificationHub,
    stats_cache: StatsCache,
    jwt: Arc<Hs256Jwt>,
    assistant: KeywordAssistant,
}

/// Build services on in-memory stores.
pub async fn build_services(config: &AppConfig) -> AppServices {
    let services = AppServices {
        products: Arc::new(InMemoryProductStore::new()),
        categories: Arc::new(InMemoryCategoryStore::new()),
        locations: Arc::new(InMemoryLocationStore::new()),
        movements: Arc::new(InMemoryMovementStore::new()),
        todos: Arc::new(InMemoryTodoStore::new()),
        users: Arc::new(InMemoryUserStore::new()),
        roles: Arc::new(InMemoryRoleStore::new()),
        search: ProductSearchIndex::new(),
        hub: NotificationHub::default(),
        stats_cache: StatsCache::new(),
        jwt: Arc::new(Hs256Jwt::new(&config.jwt_secret)),
        assistant: KeywordAssistant::new(),
    };
    services.seed(config).await;
    services
}

/// Build services with Postgres-backed catalog and movement stores; the
/// remaining stores stay in-memory.
#[cfg(feature = "postgres")]
pub async fn build_persistent_services(config: &AppConfig, pool: sqlx::PgPool) -> AppServices {
    stocksmith_infra::run_migrations(&pool)
        .await
        .expect("failed to run store migrations");

    let services = AppServices {
        products: Arc::new(stocksmith_infra::PostgresProductStore::new(pool.clone())),
        categories: Arc::new(InMemoryCategoryStore::new()),
        locations: Arc::new(InMemoryLocationStore::new()),
        movements: Arc::new(stocksmith_infra::PostgresMovementStore::new(pool)),
        todos: Arc::new(InMemoryTodoStore::new()),
        users: Arc::new(InMemoryUserStore::new()),
        roles: Arc::new(InMemoryRoleStore::new()),
        search: ProductSearchIndex::new(),
        hub: NotificationHub::default(),
        stats_cache: StatsCache::new(),
        jwt: Arc::new(Hs256Jwt::new(&config.jwt_secret)),
        assistant: KeywordAssistant::new(),
    };
    services.seed(config).await;
    services
}

impl AppServices {
    /// Seed built-in roles, the bootstrap admin account, and the search
    /// index. Idempotent against already-populated stores.
    async fn seed(&self, config: &AppConfig) {
        let now = Utc::now();

        for name in [ADMIN_ROLE, USER_ROLE] {
            let existing = self
                .roles
                .find_by_name(name)
                .await
                .expect("failed to read role store during seeding");
            if existing.is_none() {
                self.roles
                    .upsert(Role::built_in(name, now))
                    .await
                    .expect("failed to seed built-in role");
            }
        }

        let admin = self
            .users
            .find_by_email(&config.admin_email)
            .await
            .expect("failed to read user store during seeding");
        if admin.is_none() {
            let password_hash =
                hash_password(&config.admin_password).expect("failed to hash admin password");
            let admin = User::create(CreateUser {
                user_id: UserId::new(),
                email: config.admin_email.clone(),
                display_name: "Administrator".to_string(),
                password_hash,
                role: RoleName::new(ADMIN_ROLE),
                occurred_at: now,
            })
            .expect("failed to create bootstrap admin");
            tracing::info!(email = %admin.email, "seeded bootstrap admin user");
            self.users
                .upsert(admin)
                .await
                .expect("failed to seed bootstrap admin");
        }

        let products = self
            .products
            .list()
            .await
            .expect("failed to read product store during seeding");
        for product in &products {
            self.search.index(product);
        }
    }

    pub fn jwt_validator(&self) -> Arc<dyn JwtValidator> {
        self.jwt.clone()
    }

    fn publish(&self, topic: &str, payload: serde_json::Value) {
        self.hub.publish(Notification::new(topic, payload));
    }

    /// Resolve a token subject to a request principal.
    ///
    /// Returns `None` for unknown or suspended users. Permissions come from
    /// the role store so edits to a role apply to live sessions.
    pub async fn resolve_principal(
        &self,
        user_id: UserId,
    ) -> StoreResult<Option<PrincipalContext>> {
        let Some(user) = self.users.get(user_id).await? else {
            return Ok(None);
        };
        if !user.can_authenticate() {
            return Ok(None);
        }
        let permissions = match self.roles.find_by_name(user.role.as_str()).await? {
            Some(role) => role.claims,
            None => default_claims(user.role.as_str()),
        };
        Ok(Some(PrincipalContext::new(user.id, user.role, permissions)))
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    pub async fn login(&self, req: dto::LoginRequest) -> ApiResult<(User, String)> {
        let user = self
            .users
            .find_by_email(&req.email)
            .await?
            .ok_or(DomainError::Unauthorized)?;
        if !verify_password(&req.password, &user.password_hash) {
            return Err(DomainError::Unauthorized.into());
        }
        if !user.can_authenticate() {
            return Err(DomainError::Unauthorized.into());
        }

        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id,
            role: user.role.clone(),
            issued_at: now,
            expires_at: now + chrono::Duration::hours(TOKEN_TTL_HOURS),
        };
        let token = self
            .jwt
            .issue(&claims)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok((user, token))
    }

    // ─── Products ────────────────────────────────────────────────────────────

    pub async fn create_product(&self, req: dto::CreateProductRequest) -> ApiResult<Product> {
        let now = Utc::now();
        let sku = req.sku.trim().to_string();
        if self.products.find_by_sku(&sku).await?.is_some() {
            return Err(DomainError::conflict(format!("sku '{sku}' already exists")).into());
        }
        self.ensure_category_exists(req.category_id).await?;
        self.ensure_location_exists(req.location_id).await?;

        let product = Product::create(CreateProduct {
            product_id: ProductId::new(),
            sku,
            name: req.name,
            description: req.description,
            category_id: req.category_id,
            location_id: req.location_id,
            low_stock_threshold: req.low_stock_threshold,
            purchase_price_cents: req.purchase_price_cents,
            sale_price_cents: req.sale_price_cents,
            attributes: req.attributes,
            occurred_at: now,
        })?;

        self.products.upsert(product.clone()).await?;
        // The price history starts with the creation prices.
        self.products
            .append_price(ProductPrice {
                product_id: product.id,
                purchase_price_cents: product.purchase_price_cents,
                sale_price_cents: product.sale_price_cents,
                recorded_at: now,
            })
            .await?;
        self.search.index(&product);
        self.stats_cache.invalidate();
        self.publish(
            topics::PRODUCT_CREATED,
            json!({ "id": product.id.to_string(), "sku": product.sku, "name": product.name }),
        );

        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: ProductId,
        req: dto::UpdateProductRequest,
    ) -> ApiResult<Product> {
        let now = Utc::now();
        let mut product = self.products.get(id).await?.ok_or(DomainError::not_found())?;

        if let Some(sku) = &req.sku {
            let sku = sku.trim();
            if let Some(other) = self.products.find_by_sku(sku).await? {
                if other.id != id {
                    return Err(DomainError::conflict(format!("sku '{sku}' already exists")).into());
                }
            }
        }
        if let Some(Some(category_id)) = req.category_id {
            self.ensure_category_exists(Some(category_id)).await?;
        }
        if let Some(Some(location_id)) = req.location_id {
            self.ensure_location_exists(Some(location_id)).await?;
        }

        let snapshot = product.update(UpdateProduct {
            sku: req.sku,
            name: req.name,
            description: req.description,
            category_id: req.category_id,
            location_id: req.location_id,
            low_stock_threshold: req.low_stock_threshold,
            purchase_price_cents: req.purchase_price_cents,
            sale_price_cents: req.sale_price_cents,
            attributes: req.attributes,
            occurred_at: now,
        })?;

        self.products.upsert(product.clone()).await?;
        if let Some(price) = snapshot {
            self.products.append_price(price).await?;
        }
        self.search.index(&product);
        self.stats_cache.invalidate();
        self.publish(
            topics::PRODUCT_UPDATED,
            json!({ "id": product.id.to_string(), "sku": product.sku }),
        );

        Ok(product)
    }

    pub async fn delete_product(&self, id: ProductId) -> ApiResult<()> {
        if self.products.get(id).await?.is_none() {
            return Err(DomainError::not_found().into());
        }
        if self.movements.exists_for_product(id).await? {
            return Err(
                DomainError::conflict("product has recorded stock movements").into(),
            );
        }

        self.products.delete(id).await?;
        self.search.remove(id);
        self.stats_cache.invalidate();
        self.publish(topics::PRODUCT_DELETED, json!({ "id": id.to_string() }));
        Ok(())
    }

    pub async fn get_product(&self, id: ProductId) -> ApiResult<Product> {
        Ok(self.products.get(id).await?.ok_or(DomainError::not_found())?)
    }

    /// List products, optionally filtered by a keyword query.
    pub async fn list_products(&self, query: Option<&str>) -> ApiResult<Vec<Product>> {
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            None => Ok(self.products.list().await?),
            Some(q) => {
                let mut hits = Vec::new();
                for id in self.search.search(q) {
                    if let Some(product) = self.products.get(id).await? {
                        hits.push(product);
                    }
                }
                Ok(hits)
            }
        }
    }

    pub async fn price_history(&self, id: ProductId) -> ApiResult<Vec<ProductPrice>> {
        if self.products.get(id).await?.is_none() {
            return Err(DomainError::not_found().into());
        }
        Ok(self.products.price_history(id).await?)
    }

    async fn ensure_category_exists(&self, id: Option<CategoryId>) -> ApiResult<()> {
        if let Some(id) = id {
            if self.categories.get(id).await?.is_none() {
                return Err(DomainError::validation("unknown category").into());
            }
        }
        Ok(())
    }

    async fn ensure_location_exists(&self, id: Option<LocationId>) -> ApiResult<()> {
        if let Some(id) = id {
            if self.locations.get(id).await?.is_none() {
                return Err(DomainError::validation("unknown location").into());
            }
        }
        Ok(())
    }

    // ─── Categories ──────────────────────────────────────────────────────────

    pub async fn create_category(&self, req: dto::CreateCategoryRequest) -> ApiResult<Category> {
        if self.categories.find_by_name(&req.name).await?.is_some() {
            return Err(DomainError::conflict("category name already in use").into());
        }
        let category = Category::create(CreateCategory {
            category_id: CategoryId::new(),
            name: req.name,
            description: req.description,
            occurred_at: Utc::now(),
        })?;
        self.categories.upsert(category.clone()).await?;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        req: dto::UpdateCategoryRequest,
    ) -> ApiResult<Category> {
        let mut category = self
            .categories
            .get(id)
            .await?
            .ok_or(DomainError::not_found())?;
        if let Some(name) = &req.name {
            if let Some(other) = self.categories.find_by_name(name).await? {
                if other.id != id {
                    return Err(DomainError::conflict("category name already in use").into());
                }
            }
        }
        category.update(UpdateCategory {
            name: req.name,
            description: req.description,
            occurred_at: Utc::now(),
        })?;
        self.categories.upsert(category.clone()).await?;
        Ok(category)
    }

    /// Delete a category and detach it from any products referencing it.
    pub async fn delete_category(&self, id: CategoryId) -> ApiResult<()> {
        if !self.categories.delete(id).await? {
            return Err(DomainError::not_found().into());
        }
        for mut product in self.products.list().await? {
            if product.detach_category(id) {
                self.products.upsert(product.clone()).await?;
                self.search.index(&product);
            }
        }
        Ok(())
    }

    pub async fn get_category(&self, id: CategoryId) -> ApiResult<Category> {
        Ok(self
            .categories
            .get(id)
            .await?
            .ok_or(DomainError::not_found())?)
    }

    pub async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        Ok(self.categories.list().await?)
    }

    // ─── Locations ───────────────────────────────────────────────────────────

    pub async fn create_location(&self, req: dto::CreateLocationRequest) -> ApiResult<Location> {
        let location = Location::create(CreateLocation {
            location_id: LocationId::new(),
            name: req.name,
            description: req.description,
            occurred_at: Utc::now(),
        })?;
        self.locations.upsert(location.clone()).await?;
        Ok(location)
    }

    pub async fn update_location(
        &self,
        id: LocationId,
        req: dto::UpdateLocationRequest,
    ) -> ApiResult<Location> {
        let mut location = self
            .locations
            .get(id)
            .await?
            .ok_or(DomainError::not_found())?;
        location.update(UpdateLocation {
            name: req.name,
            description: req.description,
            occurred_at: Utc::now(),
        })?;
        self.locations.upsert(location.clone()).await?;
        Ok(location)
    }

    /// Delete a location and detach it from any products referencing it.
    pub async fn delete_location(&self, id: LocationId) -> ApiResult<()> {
        if !self.locations.delete(id).await? {
            return Err(DomainError::not_found().into());
        }
        let now = Utc::now();
        for mut product in self.products.list().await? {
            if product.location_id == Some(id) {
                product.location_id = None;
                product.updated_at = now;
                self.products.upsert(product).await?;
            }
        }
        Ok(())
    }

    pub async fn get_location(&self, id: LocationId) -> ApiResult<Location> {
        Ok(self
            .locations
            .get(id)
            .await?
            .ok_or(DomainError::not_found())?)
    }

    pub async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        Ok(self.locations.list().await?)
    }

    // ─── Movements ───────────────────────────────────────────────────────────

    /// Record a stock movement and apply it to the product's on-hand
    /// quantity. Rejected with an invariant violation when an outbound
    /// movement would take stock negative.
    pub async fn record_movement(
        &self,
        req: dto::RecordMovementRequest,
    ) -> ApiResult<StockMovement> {
        let now = Utc::now();
        let mut product = self
            .products
            .get(req.product_id)
            .await?
            .ok_or_else(|| DomainError::validation("unknown product"))?;

        let unit_price_cents = req.unit_price_cents.unwrap_or(match req.direction {
            Direction::In => product.purchase_price_cents,
            Direction::Out => product.sale_price_cents,
        });

        let movement = StockMovement::record(RecordMovement {
            movement_id: MovementId::new(),
            product_id: req.product_id,
            direction: req.direction,
            quantity: req.quantity,
            unit_price_cents,
            note: req.note,
            occurred_at: now,
        })?;

        product.apply_stock_delta(movement.stock_delta())?;
        product.updated_at = now;

        self.products.upsert(product.clone()).await?;
        self.movements.insert(movement.clone()).await?;
        self.stats_cache.invalidate();
        self.publish(
            topics::MOVEMENT_RECORDED,
            json!({
                "id": movement.id.to_string(),
                "product_id": movement.product_id.to_string(),
                "direction": movement.direction.to_string(),
                "quantity": movement.quantity,
            }),
        );
        if product.is_low_stock() {
            self.publish(
                topics::LOW_STOCK,
                json!({
                    "product_id": product.id.to_string(),
                    "name": product.name,
                    "quantity": product.quantity,
                    "low_stock_threshold": product.low_stock_threshold,
                }),
            );
        }

        Ok(movement)
    }

    /// Delete a movement, reversing its effect on the product's stock.
    /// Rejected when the reversal would take stock negative.
    pub async fn delete_movement(&self, id: MovementId) -> ApiResult<()> {
        let movement = self
            .movements
            .get(id)
            .await?
            .ok_or(DomainError::not_found())?;

        if let Some(mut product) = self.products.get(movement.product_id).await? {
            product.apply_stock_delta(movement.reversal_delta())?;
            product.updated_at = Utc::now();
            self.products.upsert(product).await?;
        }

        self.movements.delete(id).await?;
        self.stats_cache.invalidate();
        self.publish(
            topics::MOVEMENT_DELETED,
            json!({ "id": id.to_string(), "product_id": movement.product_id.to_string() }),
        );
        Ok(())
    }

    pub async fn get_movement(&self, id: MovementId) -> ApiResult<StockMovement> {
        Ok(self.movements.get(id).await?.ok_or(DomainError::not_found())?)
    }

    pub async fn list_movements(
        &self,
        product_id: Option<ProductId>,
    ) -> ApiResult<Vec<StockMovement>> {
        match product_id {
            Some(id) => Ok(self.movements.list_for_product(id).await?),
            None => Ok(self.movements.list().await?),
        }
    }

    // ─── Todos ───────────────────────────────────────────────────────────────

    pub async fn create_todo(&self, req: dto::CreateTodoRequest) -> ApiResult<TodoItem> {
        let todo = TodoItem::create(CreateTodo {
            todo_id: TodoId::new(),
            title: req.title,
            description: req.description,
            priority: req.priority,
            due_date: req.due_date,
            occurred_at: Utc::now(),
        })?;
        self.todos.upsert(todo.clone()).await?;
        self.publish(topics::TODO_CHANGED, json!({ "id": todo.id.to_string() }));
        Ok(todo)
    }

    pub async fn update_todo(&self, id: TodoId, req: dto::UpdateTodoRequest) -> ApiResult<TodoItem> {
        let mut todo = self.todos.get(id).await?.ok_or(DomainError::not_found())?;
        todo.update(UpdateTodo {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            occurred_at: Utc::now(),
        })?;
        self.todos.upsert(todo.clone()).await?;
        self.publish(topics::TODO_CHANGED, json!({ "id": todo.id.to_string() }));
        Ok(todo)
    }

    pub async fn delete_todo(&self, id: TodoId) -> ApiResult<()> {
        if !self.todos.delete(id).await? {
            return Err(DomainError::not_found().into());
        }
        self.publish(topics::TODO_CHANGED, json!({ "id": id.to_string() }));
        Ok(())
    }

    pub async fn get_todo(&self, id: TodoId) -> ApiResult<TodoItem> {
        Ok(self.todos.get(id).await?.ok_or(DomainError::not_found())?)
    }

    pub async fn list_todos(&self) -> ApiResult<Vec<TodoItem>> {
        Ok(self.todos.list().await?)
    }

    // ─── Users ───────────────────────────────────────────────────────────────

    pub async fn create_user(&self, req: dto::CreateUserRequest) -> ApiResult<User> {
        let email = req.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("email already in use").into());
        }
        let role = self
            .roles
            .find_by_name(&req.role)
            .await?
            .ok_or_else(|| DomainError::validation("unknown role"))?;
        let password_hash =
            hash_password(&req.password).map_err(|e| DomainError::validation(e.to_string()))?;

        let user = User::create(CreateUser {
            user_id: UserId::new(),
            email,
            display_name: req.display_name,
            password_hash,
            role: role.name,
            occurred_at: Utc::now(),
        })?;
        self.users.upsert(user.clone()).await?;
        Ok(user)
    }

    pub async fn update_user(&self, id: UserId, req: dto::UpdateUserRequest) -> ApiResult<User> {
        let mut user = self.users.get(id).await?.ok_or(DomainError::not_found())?;
        if let Some(email) = &req.email {
            let email = email.trim().to_lowercase();
            if let Some(other) = self.users.find_by_email(&email).await? {
                if other.id != id {
                    return Err(DomainError::conflict("email already in use").into());
                }
            }
        }
        let password_hash = match req.password {
            Some(password) => Some(
                hash_password(&password).map_err(|e| DomainError::validation(e.to_string()))?,
            ),
            None => None,
        };
        user.update(UpdateUser {
            email: req.email,
            display_name: req.display_name,
            password_hash,
            occurred_at: Utc::now(),
        })?;
        self.users.upsert(user.clone()).await?;
        Ok(user)
    }

    /// Replace a user's role. The actor must be someone else; the domain
    /// rejects self-escalation regardless of the actor's permissions.
    pub async fn change_user_role(
        &self,
        id: UserId,
        actor_id: UserId,
        req: dto::ChangeRoleRequest,
    ) -> ApiResult<User> {
        let mut user = self.users.get(id).await?.ok_or(DomainError::not_found())?;
        let role = self
            .roles
            .find_by_name(&req.role)
            .await?
            .ok_or_else(|| DomainError::validation("unknown role"))?;
        user.change_role(ChangeRole {
            user_id: id,
            role: role.name,
            actor_id,
            occurred_at: Utc::now(),
        })?;
        self.users.upsert(user.clone()).await?;
        Ok(user)
    }

    pub async fn suspend_user(&self, id: UserId) -> ApiResult<User> {
        let mut user = self.users.get(id).await?.ok_or(DomainError::not_found())?;
        user.suspend(Utc::now())?;
        self.users.upsert(user.clone()).await?;
        Ok(user)
    }

    pub async fn activate_user(&self, id: UserId) -> ApiResult<User> {
        let mut user = self.users.get(id).await?.ok_or(DomainError::not_found())?;
        user.activate(Utc::now())?;
        self.users.upsert(user.clone()).await?;
        Ok(user)
    }

    pub async fn delete_user(&self, id: UserId, actor_id: UserId) -> ApiResult<()> {
        if id == actor_id {
            return Err(DomainError::invariant("users cannot delete themselves").into());
        }
        if !self.users.delete(id).await? {
            return Err(DomainError::not_found().into());
        }
        Ok(())
    }

    pub async fn get_user(&self, id: UserId) -> ApiResult<User> {
        Ok(self.users.get(id).await?.ok_or(DomainError::not_found())?)
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.users.list().await?)
    }

    // ─── Roles ───────────────────────────────────────────────────────────────

    pub async fn create_role(&self, req: dto::CreateRoleRequest) -> ApiResult<Role> {
        if self.roles.find_by_name(&req.name).await?.is_some() {
            return Err(DomainError::conflict("role name already in use").into());
        }
        let claims = req.claims.into_iter().map(Permission::new).collect();
        let role = Role::create(RoleId::new(), req.name, claims, Utc::now())?;
        self.roles.upsert(role.clone()).await?;
        Ok(role)
    }

    pub async fn update_role(&self, id: RoleId, req: dto::UpdateRoleRequest) -> ApiResult<Role> {
        let mut role = self.roles.get(id).await?.ok_or(DomainError::not_found())?;
        let now = Utc::now();
        if let Some(name) = &req.name {
            // Echoing the current name is not a rename; built-in roles can
            // still have their claims updated this way.
            if name.trim().to_lowercase() != role.name.as_str() {
                if let Some(other) = self.roles.find_by_name(name).await? {
                    if other.id != id {
                        return Err(DomainError::conflict("role name already in use").into());
                    }
                }
                role.rename(name, now)?;
            }
        }
        if let Some(claims) = req.claims {
            role.set_claims(claims.into_iter().map(Permission::new).collect(), now);
        }
        self.roles.upsert(role.clone()).await?;
        Ok(role)
    }

    /// Delete a role. Built-in roles and roles still assigned to users are
    /// protected.
    pub async fn delete_role(&self, id: RoleId) -> ApiResult<()> {
        let role = self.roles.get(id).await?.ok_or(DomainError::not_found())?;
        role.ensure_deletable()?;
        if self.users.any_with_role(role.name.as_str()).await? {
            return Err(DomainError::conflict("role is assigned to users").into());
        }
        self.roles.delete(id).await?;
        Ok(())
    }

    pub async fn list_roles(&self) -> ApiResult<Vec<Role>> {
        Ok(self.roles.list().await?)
    }

    // ─── Dashboard ───────────────────────────────────────────────────────────

    /// Dashboard snapshot, served from the short-TTL cache when fresh.
    /// A recompute that changes the content broadcasts `stats_updated`.
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        if let Some(stats) = self.stats_cache.get() {
            return Ok(stats);
        }

        let products = self.products.list().await?;
        let movements = self.movements.list().await?;
        let stats = compute_stats(&products, &movements, Utc::now());

        let previous = self.stats_cache.put(stats.clone());
        let changed = previous.is_none_or(|p| !p.same_content(&stats));
        if changed {
            self.publish(
                topics::STATS_UPDATED,
                json!({ "computed_at": stats.computed_at }),
            );
        }

        Ok(stats)
    }

    // ─── Chat ────────────────────────────────────────────────────────────────

    pub async fn chat(&self, message: &str) -> ApiResult<ChatReply> {
        let view = self.inventory_view().await?;
        self.assistant
            .reply(message, &view)
            .map_err(|e| DomainError::validation(e.to_string()).into())
    }

    async fn inventory_view(&self) -> ApiResult<InventoryView> {
        let products = self.products.list().await?;
        let names: HashMap<ProductId, String> =
            products.iter().map(|p| (p.id, p.name.clone())).collect();

        let movements = self.movements.list().await?;
        let recent_movements = movements
            .into_iter()
            .take(CHAT_RECENT_MOVEMENTS)
            .map(|m| MovementView {
                product_name: names
                    .get(&m.product_id)
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                inbound: m.direction == Direction::In,
                quantity: m.quantity,
                unit_price_cents: m.unit_price_cents,
                occurred_at: m.occurred_at,
            })
            .collect();

        let products = products
            .into_iter()
            .map(|p| ProductView {
                name: p.name,
                sku: p.sku,
                quantity: p.quantity,
                low_stock_threshold: p.low_stock_threshold,
                purchase_price_cents: p.purchase_price_cents,
                sale_price_cents: p.sale_price_cents,
            })
            .collect();

        Ok(InventoryView {
            products,
            recent_movements,
        })
    }
}

/// SSE stream over the notification hub.
///
/// Lossy: a slow client lags past missed messages and must refetch state
/// through the normal read endpoints.
pub fn realtime_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.hub.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(n) => {
            let data = serde_json::to_string(&n.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(n.topic).data(data)))
        }
        Err(_lagged) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
