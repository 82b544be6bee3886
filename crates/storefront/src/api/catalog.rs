//! Restaurant and menu reads. All cached.

use serde_json::Value;
use tracing::{debug, instrument};

use tabletop_core::{ProductId, RestaurantId};

use super::cache::{CacheKey, CacheValue};
use super::{ApiClient, ApiError};
use crate::models::{Product, Restaurant};

impl ApiClient {
    // =========================================================================
    // Restaurants
    // =========================================================================

    /// List every restaurant.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn restaurants(&self) -> Result<Vec<Restaurant>, ApiError> {
        if let Some(CacheValue::Restaurants(restaurants)) =
            self.inner.cache.get(&CacheKey::Restaurants).await
        {
            debug!("Cache hit for restaurants");
            return Ok(restaurants);
        }

        let restaurants: Vec<Restaurant> = self.get_json(&["restaurants"]).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Restaurants,
                CacheValue::Restaurants(restaurants.clone()),
            )
            .await;

        Ok(restaurants)
    }

    /// Get a single restaurant.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the backend does not know the ID,
    /// [`ApiError::BadRequest`] if it rejects the ID as malformed, or any
    /// other error if the request fails.
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn restaurant(&self, id: &RestaurantId) -> Result<Restaurant, ApiError> {
        if id.is_blank() {
            return Err(ApiError::BadRequest("No restaurant ID provided".to_string()));
        }

        let cache_key = CacheKey::Restaurant(id.clone());
        if let Some(CacheValue::Restaurant(restaurant)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for restaurant");
            return Ok(*restaurant);
        }

        let restaurant: Restaurant = self
            .get_json(&["restaurants", id.as_str()])
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => ApiError::NotFound(format!("Restaurant not found: {id}")),
                other => other,
            })?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Restaurant(Box::new(restaurant.clone())))
            .await;

        Ok(restaurant)
    }

    /// Get a restaurant's menu.
    ///
    /// A restaurant the backend has no menu for yields an empty list rather
    /// than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails for any reason other than
    /// a 404.
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn restaurant_products(&self, id: &RestaurantId) -> Result<Vec<Product>, ApiError> {
        let cache_key = CacheKey::RestaurantProducts(id.clone());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for restaurant products");
            return Ok(products);
        }

        let products: Vec<Product> = match self
            .get_json(&["restaurants", id.as_str(), "products"])
            .await
        {
            Ok(products) => products,
            Err(ApiError::NotFound(_)) => {
                debug!("No menu for restaurant");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product across restaurants.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json(&["products"]).await?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the backend does not know the ID or
    /// answers with a body that has no ID, or any other error if the request
    /// fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let not_found = || ApiError::NotFound(format!("Product not found: {id}"));

        let body: Value = self
            .get_json(&["products", id.as_str()])
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => not_found(),
                other => other,
            })?;

        // The backend answers unknown IDs with 200 and an empty object.
        if !has_id(&body) {
            return Err(not_found());
        }
        let product: Product = serde_json::from_value(body)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }
}

/// Whether a product body carries an `_id` or `id`.
fn has_id(body: &Value) -> bool {
    ["_id", "id"]
        .iter()
        .any(|key| body.get(key).is_some_and(|v| !v.is_null()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_has_id() {
        assert!(has_id(&json!({"_id": "abc"})));
        assert!(has_id(&json!({"id": 7})));
        assert!(!has_id(&json!({})));
        assert!(!has_id(&json!({"_id": null})));
        assert!(!has_id(&json!(null)));
    }
}
