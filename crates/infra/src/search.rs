//! Keyword search index over the product catalog.
//!
//! A small inverted-token index kept in process memory. The service layer
//! re-indexes a product on every create/update and removes it on delete, so
//! the index tracks the product store without a rebuild step. Matching is
//! token-prefix based: every query token must prefix some indexed token.

use std::collections::HashMap;
use std::sync::RwLock;

use stocksmith_catalog::Product;
use stocksmith_core::ProductId;

#[derive(Debug, Default)]
pub struct ProductSearchIndex {
    tokens: RwLock<HashMap<ProductId, Vec<String>>>,
}

impl ProductSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index (or re-index) a product under its name, sku and attribute values.
    pub fn index(&self, product: &Product) {
        let mut tokens = tokenize(&product.name);
        tokens.extend(tokenize(&product.sku));
        for attribute in &product.attributes {
            tokens.extend(tokenize(&attribute.value));
        }
        tokens.sort();
        tokens.dedup();

        if let Ok(mut index) = self.tokens.write() {
            index.insert(product.id, tokens);
        }
    }

    pub fn remove(&self, id: ProductId) {
        if let Ok(mut index) = self.tokens.write() {
            index.remove(&id);
        }
    }

    /// Ids of products matching every token of `query`. An empty or
    /// whitespace-only query matches nothing.
    pub fn search(&self, query: &str) -> Vec<ProductId> {
        let needles = tokenize(query);
        if needles.is_empty() {
            return vec![];
        }
        let Ok(index) = self.tokens.read() else {
            return vec![];
        };
        let mut hits: Vec<ProductId> = index
            .iter()
            .filter(|(_, tokens)| {
                needles
                    .iter()
                    .all(|needle| tokens.iter().any(|t| t.starts_with(needle.as_str())))
            })
            .map(|(id, _)| *id)
            .collect();
        // Uuid v7 order is creation order.
        hits.sort_by_key(|id| *id.as_uuid());
        hits
    }

    pub fn len(&self) -> usize {
        self.tokens.read().map(|index| index.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lowercased alphanumeric tokens. Everything else is a separator, so
/// "SKU-001" indexes as ["sku", "001"].
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stocksmith_catalog::{CreateProduct, ProductAttribute};

    fn product(sku: &str, name: &str, attributes: Vec<ProductAttribute>) -> Product {
        Product::create(CreateProduct {
            product_id: ProductId::new(),
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            category_id: None,
            location_id: None,
            low_stock_threshold: 0,
            purchase_price_cents: 100,
            sale_price_cents: 200,
            attributes,
            occurred_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn matches_on_name_prefix_tokens() {
        let index = ProductSearchIndex::new();
        let beans = product("SKU-001", "Espresso Beans 1kg", vec![]);
        let filters = product("SKU-002", "Paper Filters", vec![]);
        index.index(&beans);
        index.index(&filters);

        assert_eq!(index.search("espresso"), vec![beans.id]);
        assert_eq!(index.search("esp bean"), vec![beans.id]);
        assert_eq!(index.search("paper"), vec![filters.id]);
        assert!(index.search("grinder").is_empty());
    }

    #[test]
    fn matches_on_sku_and_attribute_values() {
        let index = ProductSearchIndex::new();
        let beans = product(
            "SKU-001",
            "Espresso Beans",
            vec![ProductAttribute {
                key: "roast".to_string(),
                value: "Dark".to_string(),
            }],
        );
        index.index(&beans);

        assert_eq!(index.search("sku 001"), vec![beans.id]);
        assert_eq!(index.search("dark"), vec![beans.id]);
    }

    #[test]
    fn reindex_replaces_old_tokens_and_remove_drops_them() {
        let index = ProductSearchIndex::new();
        let mut beans = product("SKU-001", "Espresso Beans", vec![]);
        index.index(&beans);

        beans.name = "Filter Coffee Beans".to_string();
        index.index(&beans);
        assert!(index.search("espresso").is_empty());
        assert_eq!(index.search("filter"), vec![beans.id]);

        index.remove(beans.id);
        assert!(index.search("filter").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn blank_query_matches_nothing() {
        let index = ProductSearchIndex::new();
        index.index(&product("SKU-001", "Espresso Beans", vec![]));
        assert!(index.search("").is_empty());
        assert!(index.search("   ").is_empty());
    }
}
