use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::intent::{detect_intent, Intent};
use crate::view::{InventoryView, ProductView};

/// Assistant reply.
///
/// This is an insight over the inventory snapshot, not a domain mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Human-readable answer.
    pub text: String,

    /// The intent the answer was produced for.
    pub intent: Intent,

    /// Structured payload backing the answer (tables, lists, totals).
    pub data: serde_json::Value,
}

impl ChatReply {
    pub fn new(text: impl Into<String>, intent: Intent) -> Self {
        Self {
            text: text.into(),
            intent,
            data: serde_json::Value::Null,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
}

/// Assistant seam.
///
/// The keyword implementation below is the only one shipped; a model-backed
/// implementation would slot in behind the same trait.
pub trait Assistant: Send + Sync {
    fn reply(&self, message: &str, view: &InventoryView) -> Result<ChatReply, ChatError>;
}

/// Deterministic keyword/regex assistant.
#[derive(Debug, Clone)]
pub struct KeywordAssistant {
    /// Cap for list-style answers (low stock, movement history).
    max_listed: usize,
}

impl KeywordAssistant {
    pub fn new() -> Self {
        Self { max_listed: 10 }
    }

    pub fn with_max_listed(mut self, max_listed: usize) -> Self {
        self.max_listed = max_listed.max(1);
        self
    }
}

impl Default for KeywordAssistant {
    fn default() -> Self {
        Self::new()
    }
}

impl Assistant for KeywordAssistant {
    fn reply(&self, message: &str, view: &InventoryView) -> Result<ChatReply, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let intent = detect_intent(message);
        let reply = match &intent {
            Intent::Greeting => ChatReply::new(
                "Hello! Ask me about stock levels, low-stock products, \
                 inventory value or recent movements.",
                intent.clone(),
            ),
            Intent::Help => ChatReply::new(
                "I can answer questions like: \"how much <product> do we have\", \
                 \"which products are low on stock\", \"what is our inventory worth\" \
                 or \"show recent movements\".",
                intent.clone(),
            ),
            Intent::StockOf { query } => self.answer_stock_of(query, view, intent.clone()),
            Intent::LowStock => self.answer_low_stock(view, intent.clone()),
            Intent::InventoryValue => answer_inventory_value(view, intent.clone()),
            Intent::MovementHistory => self.answer_movements(view, intent.clone()),
            Intent::Unknown => ChatReply::new(
                "Sorry, I didn't understand that. Try asking for \"help\".",
                intent.clone(),
            ),
        };
        Ok(reply)
    }
}

impl KeywordAssistant {
    fn answer_stock_of(&self, query: &str, view: &InventoryView, intent: Intent) -> ChatReply {
        let matches = find_products(query, &view.products);
        match matches.as_slice() {
            [] => ChatReply::new(
                format!("I couldn't find a product matching \"{query}\"."),
                intent,
            ),
            [product] => ChatReply::new(
                format!(
                    "{}: {} on hand{}.",
                    product.name,
                    product.quantity,
                    if product.is_low_stock() { " (below threshold!)" } else { "" }
                ),
                intent,
            )
            .with_data(json!({
                "name": product.name,
                "sku": product.sku,
                "quantity": product.quantity,
                "low_stock": product.is_low_stock(),
            })),
            many => {
                let listed: Vec<_> = many
                    .iter()
                    .take(self.max_listed)
                    .map(|p| json!({"name": p.name, "sku": p.sku, "quantity": p.quantity}))
                    .collect();
                ChatReply::new(
                    format!(
                        "{} products match \"{query}\": {}.",
                        many.len(),
                        many.iter()
                            .take(self.max_listed)
                            .map(|p| format!("{} ({})", p.name, p.quantity))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                    intent,
                )
                .with_data(json!({ "matches": listed }))
            }
        }
    }

    fn answer_low_stock(&self, view: &InventoryView, intent: Intent) -> ChatReply {
        let mut low: Vec<&ProductView> =
            view.products.iter().filter(|p| p.is_low_stock()).collect();
        low.sort_by_key(|p| p.quantity - p.low_stock_threshold);

        if low.is_empty() {
            return ChatReply::new("All products are at or above their thresholds.", intent);
        }

        let listed: Vec<_> = low
            .iter()
            .take(self.max_listed)
            .map(|p| {
                json!({
                    "name": p.name,
                    "sku": p.sku,
                    "quantity": p.quantity,
                    "threshold": p.low_stock_threshold,
                })
            })
            .collect();

        ChatReply::new(
            format!(
                "{} product(s) below threshold: {}.",
                low.len(),
                low.iter()
                    .take(self.max_listed)
                    .map(|p| format!("{} ({}/{})", p.name, p.quantity, p.low_stock_threshold))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            intent,
        )
        .with_data(json!({ "low_stock": listed }))
    }

    fn answer_movements(&self, view: &InventoryView, intent: Intent) -> ChatReply {
        if view.recent_movements.is_empty() {
            return ChatReply::new("No stock movements recorded yet.", intent);
        }

        let listed: Vec<_> = view
            .recent_movements
            .iter()
            .take(self.max_listed)
            .map(|m| {
                json!({
                    "product": m.product_name,
                    "direction": if m.inbound { "in" } else { "out" },
                    "quantity": m.quantity,
                    "occurred_at": m.occurred_at.to_rfc3339(),
                })
            })
            .collect();

        ChatReply::new(
            format!(
                "Last {} movement(s): {}.",
                listed.len(),
                view.recent_movements
                    .iter()
                    .take(self.max_listed)
                    .map(|m| format!(
                        "{} {}{}",
                        m.product_name,
                        if m.inbound { "+" } else { "-" },
                        m.quantity
                    ))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            intent,
        )
        .with_data(json!({ "movements": listed }))
    }
}

fn answer_inventory_value(view: &InventoryView, intent: Intent) -> ChatReply {
    let purchase_value: i64 = view
        .products
        .iter()
        .map(|p| p.quantity.saturating_mul(p.purchase_price_cents))
        .sum();
    let sale_value: i64 = view
        .products
        .iter()
        .map(|p| p.quantity.saturating_mul(p.sale_price_cents))
        .sum();

    ChatReply::new(
        format!(
            "Inventory is worth {} at purchase prices and {} at sale prices \
             (potential margin {}).",
            format_cents(purchase_value),
            format_cents(sale_value),
            format_cents(sale_value - purchase_value),
        ),
        intent,
    )
    .with_data(json!({
        "purchase_value_cents": purchase_value,
        "sale_value_cents": sale_value,
        "margin_cents": sale_value - purchase_value,
    }))
}

fn find_products<'a>(query: &str, products: &'a [ProductView]) -> Vec<&'a ProductView> {
    let query = query.to_lowercase();
    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&query) || p.sku.to_lowercase().contains(&query)
        })
        .collect()
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{sign}{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::MovementView;
    use chrono::Utc;

    fn product(name: &str, sku: &str, quantity: i64, threshold: i64) -> ProductView {
        ProductView {
            name: name.to_string(),
            sku: sku.to_string(),
            quantity,
            low_stock_threshold: threshold,
            purchase_price_cents: 500,
            sale_price_cents: 900,
        }
    }

    fn view() -> InventoryView {
        InventoryView {
            products: vec![
                product("Espresso Beans", "SKU-001", 12, 5),
                product("Filter Paper", "SKU-002", 2, 10),
            ],
            recent_movements: vec![MovementView {
                product_name: "Espresso Beans".to_string(),
                inbound: true,
                quantity: 12,
                unit_price_cents: 500,
                occurred_at: Utc::now(),
            }],
        }
    }

    #[test]
    fn stock_question_answers_with_quantity() {
        let reply = KeywordAssistant::new()
            .reply("how much espresso beans do we have?", &view())
            .unwrap();
        assert!(matches!(reply.intent, Intent::StockOf { .. }));
        assert!(reply.text.contains("12"));
        assert_eq!(reply.data["quantity"], 12);
    }

    #[test]
    fn unknown_product_gets_a_polite_miss() {
        let reply = KeywordAssistant::new()
            .reply("stock of unobtanium", &view())
            .unwrap();
        assert!(reply.text.contains("couldn't find"));
    }

    #[test]
    fn low_stock_report_lists_critical_products() {
        let reply = KeywordAssistant::new()
            .reply("which products are low on stock?", &view())
            .unwrap();
        assert_eq!(reply.intent, Intent::LowStock);
        assert!(reply.text.contains("Filter Paper"));
        assert!(!reply.text.contains("Espresso Beans"));
    }

    #[test]
    fn inventory_value_sums_quantities_times_prices() {
        let reply = KeywordAssistant::new()
            .reply("what is our inventory worth?", &view())
            .unwrap();
        // (12 + 2) * 500 = 7000 purchase, (12 + 2) * 900 = 12600 sale.
        assert_eq!(reply.data["purchase_value_cents"], 7000);
        assert_eq!(reply.data["sale_value_cents"], 12600);
        assert_eq!(reply.data["margin_cents"], 5600);
    }

    #[test]
    fn movement_history_lists_recent_entries() {
        let reply = KeywordAssistant::new()
            .reply("show recent movements", &view())
            .unwrap();
        assert_eq!(reply.intent, Intent::MovementHistory);
        assert!(reply.text.contains("Espresso Beans +12"));
    }

    #[test]
    fn default_assistant_behaves_like_new() {
        let reply = KeywordAssistant::default()
            .reply("which products are low on stock?", &view())
            .unwrap();
        assert!(reply.text.contains("Filter Paper"));
    }

    #[test]
    fn empty_message_is_an_error() {
        assert!(matches!(
            KeywordAssistant::new().reply("  ", &view()),
            Err(ChatError::EmptyMessage)
        ));
    }
}
