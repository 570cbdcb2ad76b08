//! Postgres-backed stores for the catalog and the movement ledger.
//!
//! Enabled with the `postgres` feature. Errors are mapped uniformly to
//! [`StoreError::Backend`] with the failing operation in the message; callers
//! treat every backend failure the same way.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use stocksmith_catalog::{Product, ProductAttribute, ProductPrice};
use stocksmith_core::{CategoryId, LocationId, MovementId, ProductId};
use stocksmith_inventory::{Direction, StockMovement};

use super::{MovementStore, ProductStore, StoreError, StoreResult};

/// Create the tables these stores need. Idempotent.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id UUID PRIMARY KEY,
            sku TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT,
            category_id UUID,
            location_id UUID,
            quantity BIGINT NOT NULL DEFAULT 0,
            low_stock_threshold BIGINT NOT NULL DEFAULT 0,
            purchase_price_cents BIGINT NOT NULL DEFAULT 0,
            sale_price_cents BIGINT NOT NULL DEFAULT 0,
            attributes JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS product_prices (
            product_id UUID NOT NULL,
            purchase_price_cents BIGINT NOT NULL,
            sale_price_cents BIGINT NOT NULL,
            recorded_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_product_prices_product
            ON product_prices (product_id, recorded_at)
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS stock_movements (
            id UUID PRIMARY KEY,
            product_id UUID NOT NULL,
            direction TEXT NOT NULL CHECK (direction IN ('in', 'out')),
            quantity BIGINT NOT NULL CHECK (quantity > 0),
            unit_price_cents BIGINT NOT NULL CHECK (unit_price_cents >= 0),
            note TEXT,
            occurred_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_stock_movements_product
            ON stock_movements (product_id, occurred_at DESC)
        "#,
    ];
    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("run_migrations", e))?;
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::backend(format!("{operation}: {err}"))
}

// ─── Products ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, sku, name, description, category_id, location_id, quantity, \
     low_stock_threshold, purchase_price_cents, sale_price_cents, attributes, created_at, updated_at";

fn product_from_row(row: &sqlx::postgres::PgRow) -> StoreResult<Product> {
    let map = |e: sqlx::Error| map_sqlx_error("decode product row", e);
    let attributes: serde_json::Value = row.try_get("attributes").map_err(map)?;
    let attributes: Vec<ProductAttribute> = serde_json::from_value(attributes)
        .map_err(|e| StoreError::backend(format!("decode product attributes: {e}")))?;
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id").map_err(map)?),
        sku: row.try_get("sku").map_err(map)?,
        name: row.try_get("name").map_err(map)?,
        description: row.try_get("description").map_err(map)?,
        category_id: row
            .try_get::<Option<uuid::Uuid>, _>("category_id")
            .map_err(map)?
            .map(CategoryId::from_uuid),
        location_id: row
            .try_get::<Option<uuid::Uuid>, _>("location_id")
            .map_err(map)?
            .map(LocationId::from_uuid),
        quantity: row.try_get("quantity").map_err(map)?,
        low_stock_threshold: row.try_get("low_stock_threshold").map_err(map)?,
        purchase_price_cents: row.try_get("purchase_price_cents").map_err(map)?,
        sale_price_cents: row.try_get("sale_price_cents").map_err(map)?,
        attributes,
        created_at: row.try_get("created_at").map_err(map)?,
        updated_at: row.try_get("updated_at").map_err(map)?,
    })
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get product", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_sku(&self, sku: &str) -> StoreResult<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1"
        ))
        .bind(sku)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find product by sku", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list products", e))?;
        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn upsert(&self, product: Product) -> StoreResult<()> {
        let attributes = serde_json::to_value(&product.attributes)
            .map_err(|e| StoreError::backend(format!("encode product attributes: {e}")))?;
        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description, category_id, location_id, quantity,
                low_stock_threshold, purchase_price_cents, sale_price_cents,
                attributes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                sku = EXCLUDED.sku,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                category_id = EXCLUDED.category_id,
                location_id = EXCLUDED.location_id,
                quantity = EXCLUDED.quantity,
                low_stock_threshold = EXCLUDED.low_stock_threshold,
                purchase_price_cents = EXCLUDED.purchase_price_cents,
                sale_price_cents = EXCLUDED.sale_price_cents,
                attributes = EXCLUDED.attributes,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id.map(|c| c.as_uuid()))
        .bind(product.location_id.map(|l| l.as_uuid()))
        .bind(product.quantity)
        .bind(product.low_stock_threshold)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(attributes)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert product", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        sqlx::query("DELETE FROM product_prices WHERE product_id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete product prices", e))?;
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete product", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, price), fields(product_id = %price.product_id), err)]
    async fn append_price(&self, price: ProductPrice) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO product_prices (product_id, purchase_price_cents, sale_price_cents, recorded_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(price.product_id.as_uuid())
        .bind(price.purchase_price_cents)
        .bind(price.sale_price_cents)
        .bind(price.recorded_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append product price", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn price_history(&self, id: ProductId) -> StoreResult<Vec<ProductPrice>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, purchase_price_cents, sale_price_cents, recorded_at
            FROM product_prices
            WHERE product_id = $1
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load price history", e))?;

        let map = |e: sqlx::Error| map_sqlx_error("decode price row", e);
        rows.iter()
            .map(|row| {
                Ok(ProductPrice {
                    product_id: ProductId::from_uuid(row.try_get("product_id").map_err(map)?),
                    purchase_price_cents: row.try_get("purchase_price_cents").map_err(map)?,
                    sale_price_cents: row.try_get("sale_price_cents").map_err(map)?,
                    recorded_at: row.try_get("recorded_at").map_err(map)?,
                })
            })
            .collect()
    }
}

// ─── Movements ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresMovementStore {
    pool: Arc<PgPool>,
}

impl PostgresMovementStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn movement_from_row(row: &sqlx::postgres::PgRow) -> StoreResult<StockMovement> {
    let map = |e: sqlx::Error| map_sqlx_error("decode movement row", e);
    let direction: String = row.try_get("direction").map_err(map)?;
    let direction = match direction.as_str() {
        "in" => Direction::In,
        "out" => Direction::Out,
        other => {
            return Err(StoreError::backend(format!(
                "unknown movement direction '{other}'"
            )));
        }
    };
    let occurred_at: DateTime<Utc> = row.try_get("occurred_at").map_err(map)?;
    Ok(StockMovement {
        id: MovementId::from_uuid(row.try_get("id").map_err(map)?),
        product_id: ProductId::from_uuid(row.try_get("product_id").map_err(map)?),
        direction,
        quantity: row.try_get("quantity").map_err(map)?,
        unit_price_cents: row.try_get("unit_price_cents").map_err(map)?,
        note: row.try_get("note").map_err(map)?,
        occurred_at,
    })
}

const MOVEMENT_COLUMNS: &str =
    "id, product_id, direction, quantity, unit_price_cents, note, occurred_at";

#[async_trait]
impl MovementStore for PostgresMovementStore {
    #[instrument(skip(self), fields(movement_id = %id), err)]
    async fn get(&self, id: MovementId) -> StoreResult<Option<StockMovement>> {
        let row = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get movement", e))?;
        row.as_ref().map(movement_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<StockMovement>> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements ORDER BY occurred_at DESC, id DESC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list movements", e))?;
        rows.iter().map(movement_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn list_for_product(&self, product_id: ProductId) -> StoreResult<Vec<StockMovement>> {
        let rows = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE product_id = $1 ORDER BY occurred_at DESC, id DESC"
        ))
        .bind(product_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list movements for product", e))?;
        rows.iter().map(movement_from_row).collect()
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn exists_for_product(&self, product_id: ProductId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM stock_movements WHERE product_id = $1 LIMIT 1")
            .bind(product_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("check movements for product", e))?;
        Ok(row.is_some())
    }

    #[instrument(skip(self, movement), fields(movement_id = %movement.id), err)]
    async fn insert(&self, movement: StockMovement) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, product_id, direction, quantity, unit_price_cents, note, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.product_id.as_uuid())
        .bind(movement.direction.to_string())
        .bind(movement.quantity)
        .bind(movement.unit_price_cents)
        .bind(&movement.note)
        .bind(movement.occurred_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert movement", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(movement_id = %id), err)]
    async fn delete(&self, id: MovementId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM stock_movements WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete movement", e))?;
        Ok(result.rows_affected() > 0)
    }
}
