//! Cache types for catalog responses.

use crate::models::{Product, Restaurant};
use tabletop_core::{ProductId, RestaurantId};

/// Cache key for restaurants and products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Restaurants,
    Restaurant(RestaurantId),
    RestaurantProducts(RestaurantId),
    Products,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Restaurants(Vec<Restaurant>),
    Restaurant(Box<Restaurant>),
    Products(Vec<Product>),
    Product(Box<Product>),
}
