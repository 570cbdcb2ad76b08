//! `stocksmith-catalog` — product catalog domain.
//!
//! Pure domain types and transitions for products, categories, free-form
//! attributes and price-history snapshots. No IO; persistence lives in infra.

pub mod category;
pub mod product;

pub use category::{Category, CreateCategory, UpdateCategory};
pub use product::{
    CreateProduct, Product, ProductAttribute, ProductPrice, UpdateProduct,
};
