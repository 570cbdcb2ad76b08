//! Request/response DTOs and JSON mapping helpers.
//!
//! Update requests distinguish "field absent" (leave untouched) from "field
//! null" (clear it) with the `Option<Option<T>>` + `deserialize_some`
//! pattern.

use serde::{Deserialize, Deserializer};
use serde_json::json;

use stocksmith_auth::{Role, User};
use stocksmith_catalog::{Category, Product, ProductAttribute, ProductPrice};
use stocksmith_core::{CategoryId, LocationId, ProductId};
use stocksmith_inventory::{Direction, Location, StockMovement};
use stocksmith_tasks::{Priority, TodoItem, TodoStatus};

/// Deserialize a present-but-possibly-null field into `Some(Option<T>)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub low_stock_threshold: i64,
    #[serde(default)]
    pub purchase_price_cents: i64,
    #[serde(default)]
    pub sale_price_cents: i64,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub location_id: Option<Option<LocationId>>,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
    #[serde(default)]
    pub purchase_price_cents: Option<i64>,
    #[serde(default)]
    pub sale_price_cents: Option<i64>,
    #[serde(default)]
    pub attributes: Option<Vec<ProductAttribute>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLocationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    pub product_id: ProductId,
    pub direction: Direction,
    pub quantity: i64,
    /// Defaults to the product's current purchase (inbound) or sale
    /// (outbound) price when omitted.
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<TodoStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub claims: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub claims: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    /// Keyword search query over name, sku and attribute values.
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementListParams {
    #[serde(default)]
    pub product_id: Option<String>,
}

// ─── Response mapping ────────────────────────────────────────────────────────

pub fn product_to_json(product: &Product) -> serde_json::Value {
    json!({
        "id": product.id.to_string(),
        "sku": product.sku,
        "name": product.name,
        "description": product.description,
        "category_id": product.category_id.map(|c| c.to_string()),
        "location_id": product.location_id.map(|l| l.to_string()),
        "quantity": product.quantity,
        "low_stock_threshold": product.low_stock_threshold,
        "purchase_price_cents": product.purchase_price_cents,
        "sale_price_cents": product.sale_price_cents,
        "low_stock": product.is_low_stock(),
        "attributes": product.attributes,
        "created_at": product.created_at,
        "updated_at": product.updated_at,
    })
}

pub fn price_to_json(price: &ProductPrice) -> serde_json::Value {
    json!({
        "product_id": price.product_id.to_string(),
        "purchase_price_cents": price.purchase_price_cents,
        "sale_price_cents": price.sale_price_cents,
        "recorded_at": price.recorded_at,
    })
}

pub fn category_to_json(category: &Category) -> serde_json::Value {
    json!({
        "id": category.id.to_string(),
        "name": category.name,
        "description": category.description,
        "created_at": category.created_at,
        "updated_at": category.updated_at,
    })
}

pub fn location_to_json(location: &Location) -> serde_json::Value {
    json!({
        "id": location.id.to_string(),
        "name": location.name,
        "description": location.description,
        "created_at": location.created_at,
        "updated_at": location.updated_at,
    })
}

pub fn movement_to_json(movement: &StockMovement) -> serde_json::Value {
    json!({
        "id": movement.id.to_string(),
        "product_id": movement.product_id.to_string(),
        "direction": movement.direction.to_string(),
        "quantity": movement.quantity,
        "unit_price_cents": movement.unit_price_cents,
        "note": movement.note,
        "occurred_at": movement.occurred_at,
    })
}

pub fn todo_to_json(todo: &TodoItem) -> serde_json::Value {
    json!({
        "id": todo.id.to_string(),
        "title": todo.title,
        "description": todo.description,
        "status": todo.status,
        "priority": todo.priority,
        "due_date": todo.due_date,
        "created_at": todo.created_at,
        "updated_at": todo.updated_at,
    })
}

/// User mapping; never exposes the password hash.
pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.to_string(),
        "email": user.email,
        "display_name": user.display_name,
        "role": user.role.as_str(),
        "status": user.status,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
    })
}

pub fn role_to_json(role: &Role) -> serde_json::Value {
    json!({
        "id": role.id.to_string(),
        "name": role.name.as_str(),
        "built_in": role.name.is_built_in(),
        "claims": role.claims.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        "created_at": role.created_at,
        "updated_at": role.updated_at,
    })
}
