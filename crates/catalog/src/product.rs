use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocksmith_core::{CategoryId, DomainError, DomainResult, LocationId, ProductId};

/// Free-form key/value attribute attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub key: String,
    pub value: String,
}

/// Price-history snapshot, appended whenever either price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPrice {
    pub product_id: ProductId,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Product entity.
///
/// # Invariants
/// - `sku` and `name` are non-empty.
/// - `quantity` and `low_stock_threshold` are never negative.
/// - Prices are never negative (integer cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub attributes: Vec<ProductAttribute>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command: create a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
    pub low_stock_threshold: i64,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub attributes: Vec<ProductAttribute>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: update a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<CategoryId>>,
    pub location_id: Option<Option<LocationId>>,
    pub low_stock_threshold: Option<i64>,
    pub purchase_price_cents: Option<i64>,
    pub sale_price_cents: Option<i64>,
    pub attributes: Option<Vec<ProductAttribute>>,
    pub occurred_at: DateTime<Utc>,
}

impl Product {
    pub fn create(cmd: CreateProduct) -> DomainResult<Self> {
        let sku = cmd.sku.trim().to_string();
        let name = cmd.name.trim().to_string();
        if sku.is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        ensure_threshold(cmd.low_stock_threshold)?;
        ensure_price(cmd.purchase_price_cents, "purchase price")?;
        ensure_price(cmd.sale_price_cents, "sale price")?;

        Ok(Self {
            id: cmd.product_id,
            sku,
            name,
            description: cmd.description,
            category_id: cmd.category_id,
            location_id: cmd.location_id,
            quantity: 0,
            low_stock_threshold: cmd.low_stock_threshold,
            purchase_price_cents: cmd.purchase_price_cents,
            sale_price_cents: cmd.sale_price_cents,
            attributes: cmd.attributes,
            created_at: cmd.occurred_at,
            updated_at: cmd.occurred_at,
        })
    }

    /// Apply an update; returns a price-history snapshot when either price
    /// changed.
    pub fn update(&mut self, cmd: UpdateProduct) -> DomainResult<Option<ProductPrice>> {
        if let Some(sku) = &cmd.sku {
            if sku.trim().is_empty() {
                return Err(DomainError::validation("sku cannot be empty"));
            }
        }
        if let Some(name) = &cmd.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if let Some(threshold) = cmd.low_stock_threshold {
            ensure_threshold(threshold)?;
        }
        if let Some(p) = cmd.purchase_price_cents {
            ensure_price(p, "purchase price")?;
        }
        if let Some(p) = cmd.sale_price_cents {
            ensure_price(p, "sale price")?;
        }

        if let Some(sku) = cmd.sku {
            self.sku = sku.trim().to_string();
        }
        if let Some(name) = cmd.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = cmd.description {
            self.description = description;
        }
        if let Some(category_id) = cmd.category_id {
            self.category_id = category_id;
        }
        if let Some(location_id) = cmd.location_id {
            self.location_id = location_id;
        }
        if let Some(threshold) = cmd.low_stock_threshold {
            self.low_stock_threshold = threshold;
        }
        if let Some(attributes) = cmd.attributes {
            self.attributes = attributes;
        }

        let old_purchase = self.purchase_price_cents;
        let old_sale = self.sale_price_cents;
        if let Some(p) = cmd.purchase_price_cents {
            self.purchase_price_cents = p;
        }
        if let Some(p) = cmd.sale_price_cents {
            self.sale_price_cents = p;
        }

        self.updated_at = cmd.occurred_at;

        let price_changed =
            self.purchase_price_cents != old_purchase || self.sale_price_cents != old_sale;
        Ok(price_changed.then(|| ProductPrice {
            product_id: self.id,
            purchase_price_cents: self.purchase_price_cents,
            sale_price_cents: self.sale_price_cents,
            recorded_at: cmd.occurred_at,
        }))
    }

    /// Apply a signed stock delta (from a movement or its reversal).
    pub fn apply_stock_delta(&mut self, delta: i64) -> DomainResult<()> {
        let new_quantity = self
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock quantity out of range"))?;
        if new_quantity < 0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }
        self.quantity = new_quantity;
        Ok(())
    }

    /// A product is critically stocked when quantity falls below its threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity < self.low_stock_threshold
    }

    /// Detach the given category (used when the category is deleted).
    pub fn detach_category(&mut self, category_id: CategoryId) -> bool {
        if self.category_id == Some(category_id) {
            self.category_id = None;
            return true;
        }
        false
    }
}

fn ensure_threshold(threshold: i64) -> DomainResult<()> {
    if threshold < 0 {
        return Err(DomainError::validation("low stock threshold cannot be negative"));
    }
    Ok(())
}

fn ensure_price(cents: i64, what: &str) -> DomainResult<()> {
    if cents < 0 {
        return Err(DomainError::validation(format!("{what} cannot be negative")));
    }
    Ok(())
}
