//! Cache types for listing responses.

use std::sync::Arc;

use ev_market_core::{Product, ProductId, UserId};

/// Cache keys for listing responses.
pub(crate) fn all_products_key() -> String {
    "products:all".to_string()
}

pub(crate) fn product_key(id: ProductId) -> String {
    format!("product:{id}")
}

pub(crate) fn seller_products_key(seller_id: UserId) -> String {
    format!("products:seller:{seller_id}")
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
}
