use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stocksmith_catalog::Product;
use stocksmith_core::ProductId;
use stocksmith_inventory::{Direction, StockMovement};

/// Number of days covered by the movement trend.
pub const TREND_DAYS: i64 = 30;

/// One day of movement totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub date: NaiveDate,
    pub inbound_units: i64,
    pub outbound_units: i64,
}

/// Product flagged as critically stocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockEntry {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub threshold: i64,
}

/// Aggregate snapshot served to the UI and push-broadcast on change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_stock_units: i64,
    pub inventory_purchase_value_cents: i64,
    pub inventory_sale_value_cents: i64,
    pub potential_margin_cents: i64,
    pub low_stock: Vec<LowStockEntry>,
    pub inbound_units_30d: i64,
    pub outbound_units_30d: i64,
    /// Oldest first, one bucket per day, [`TREND_DAYS`] entries.
    pub daily_trend: Vec<TrendBucket>,
    pub computed_at: DateTime<Utc>,
}

impl DashboardStats {
    /// Equality ignoring `computed_at` (used to decide whether to broadcast).
    pub fn same_content(&self, other: &Self) -> bool {
        self.total_products == other.total_products
            && self.total_stock_units == other.total_stock_units
            && self.inventory_purchase_value_cents == other.inventory_purchase_value_cents
            && self.inventory_sale_value_cents == other.inventory_sale_value_cents
            && self.low_stock == other.low_stock
            && self.inbound_units_30d == other.inbound_units_30d
            && self.outbound_units_30d == other.outbound_units_30d
            && self.daily_trend == other.daily_trend
    }
}

/// Compute the dashboard snapshot.
///
/// Linear, stateless, single pass over each input slice. Movements older
/// than the trend window are ignored; movements with future timestamps land
/// in today's bucket.
pub fn compute_stats(
    products: &[Product],
    movements: &[StockMovement],
    now: DateTime<Utc>,
) -> DashboardStats {
    let mut total_stock_units = 0i64;
    let mut purchase_value = 0i64;
    let mut sale_value = 0i64;
    let mut low_stock = Vec::new();

    for product in products {
        total_stock_units += product.quantity;
        purchase_value =
            purchase_value.saturating_add(product.quantity.saturating_mul(product.purchase_price_cents));
        sale_value =
            sale_value.saturating_add(product.quantity.saturating_mul(product.sale_price_cents));
        if product.is_low_stock() {
            low_stock.push(LowStockEntry {
                product_id: product.id,
                name: product.name.clone(),
                quantity: product.quantity,
                threshold: product.low_stock_threshold,
            });
        }
    }
    // Most-critical first: largest shortfall below threshold.
    low_stock.sort_by_key(|e| e.quantity - e.threshold);

    let today = now.date_naive();
    let window_start = today - Duration::days(TREND_DAYS - 1);
    let mut daily_trend: Vec<TrendBucket> = (0..TREND_DAYS)
        .map(|offset| TrendBucket {
            date: window_start + Duration::days(offset),
            inbound_units: 0,
            outbound_units: 0,
        })
        .collect();

    let mut inbound_30d = 0i64;
    let mut outbound_30d = 0i64;
    for movement in movements {
        let date = movement.occurred_at.date_naive().min(today);
        if date < window_start {
            continue;
        }
        let idx = (date - window_start).num_days() as usize;
        match movement.direction {
            Direction::In => {
                inbound_30d += movement.quantity;
                daily_trend[idx].inbound_units += movement.quantity;
            }
            Direction::Out => {
                outbound_30d += movement.quantity;
                daily_trend[idx].outbound_units += movement.quantity;
            }
        }
    }

    DashboardStats {
        total_products: products.len(),
        total_stock_units,
        inventory_purchase_value_cents: purchase_value,
        inventory_sale_value_cents: sale_value,
        potential_margin_cents: sale_value - purchase_value,
        low_stock,
        inbound_units_30d: inbound_30d,
        outbound_units_30d: outbound_30d,
        daily_trend,
        computed_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocksmith_catalog::CreateProduct;
    use stocksmith_core::MovementId;
    use stocksmith_inventory::RecordMovement;

    fn product(name: &str, quantity: i64, threshold: i64, purchase: i64, sale: i64) -> Product {
        let mut p = Product::create(CreateProduct {
            product_id: ProductId::new(),
            sku: format!("SKU-{name}"),
            name: name.to_string(),
            description: None,
            category_id: None,
            location_id: None,
            low_stock_threshold: threshold,
            purchase_price_cents: purchase,
            sale_price_cents: sale,
            attributes: vec![],
            occurred_at: Utc::now(),
        })
        .unwrap();
        p.apply_stock_delta(quantity).unwrap();
        p
    }

    fn movement(direction: Direction, quantity: i64, days_ago: i64) -> StockMovement {
        StockMovement::record(RecordMovement {
            movement_id: MovementId::new(),
            product_id: ProductId::new(),
            direction,
            quantity,
            unit_price_cents: 100,
            note: None,
            occurred_at: Utc::now() - Duration::days(days_ago),
        })
        .unwrap()
    }

    #[test]
    fn values_and_margin_are_summed_over_products() {
        let products = vec![
            product("beans", 10, 2, 500, 900),
            product("paper", 4, 10, 100, 250),
        ];
        let stats = compute_stats(&products, &[], Utc::now());

        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_stock_units, 14);
        assert_eq!(stats.inventory_purchase_value_cents, 10 * 500 + 4 * 100);
        assert_eq!(stats.inventory_sale_value_cents, 10 * 900 + 4 * 250);
        assert_eq!(
            stats.potential_margin_cents,
            stats.inventory_sale_value_cents - stats.inventory_purchase_value_cents
        );
    }

    #[test]
    fn low_stock_is_sorted_most_critical_first() {
        let products = vec![
            product("paper", 4, 10, 100, 250),  // shortfall 6
            product("lids", 1, 20, 100, 250),   // shortfall 19
            product("beans", 10, 2, 500, 900),  // not low
        ];
        let stats = compute_stats(&products, &[], Utc::now());

        let names: Vec<_> = stats.low_stock.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["lids", "paper"]);
    }

    #[test]
    fn trend_buckets_cover_thirty_days_and_sum_directions() {
        let now = Utc::now();
        let movements = vec![
            movement(Direction::In, 5, 0),
            movement(Direction::In, 3, 0),
            movement(Direction::Out, 2, 1),
            movement(Direction::In, 7, TREND_DAYS + 5), // outside window
        ];
        let stats = compute_stats(&[], &movements, now);

        assert_eq!(stats.daily_trend.len(), TREND_DAYS as usize);
        assert_eq!(stats.inbound_units_30d, 8);
        assert_eq!(stats.outbound_units_30d, 2);

        let today = stats.daily_trend.last().unwrap();
        assert_eq!(today.date, now.date_naive());
        assert_eq!(today.inbound_units, 8);

        let yesterday = &stats.daily_trend[stats.daily_trend.len() - 2];
        assert_eq!(yesterday.outbound_units, 2);
    }

    #[test]
    fn same_content_ignores_computed_at() {
        let products = vec![product("beans", 10, 2, 500, 900)];
        let a = compute_stats(&products, &[], Utc::now());
        let b = compute_stats(&products, &[], Utc::now() + Duration::seconds(5));
        assert!(a.same_content(&b));

        let more = vec![product("beans", 10, 2, 500, 900), product("lids", 1, 2, 1, 2)];
        let c = compute_stats(&more, &[], Utc::now());
        assert!(!a.same_content(&c));
    }
}
