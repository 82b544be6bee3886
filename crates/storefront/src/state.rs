//! Storefront state shared by every front end.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::services::{AuthService, CartService, CheckoutService};
use crate::storage::{FileStore, LocalStore};

/// Storefront state: configuration, backend client, and local store.
///
/// This struct is cheaply cloneable via `Arc`; services handed out share
/// the same client and store.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    store: Arc<dyn LocalStore>,
}

impl Storefront {
    /// Create storefront state backed by files under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the HTTP
    /// client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let store = FileStore::open(&config.data_dir)?;
        Self::with_store(config, Arc::new(store))
    }

    /// Create storefront state over an arbitrary store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn LocalStore>) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self {
            inner: Arc::new(StorefrontInner { config, api, store }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the local store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.inner.store
    }

    /// Restore the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn cart(&self) -> Result<CartService> {
        Ok(CartService::load(Arc::clone(&self.inner.store))?)
    }

    /// Authentication service over this state.
    #[must_use]
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.inner.api.clone(), Arc::clone(&self.inner.store))
    }

    /// Checkout service charging in the configured currency.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(
            self.inner.api.clone(),
            Arc::clone(&self.inner.store),
            self.inner.config.currency,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::CartItem;

    #[test]
    fn test_services_share_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig::new("http://localhost:3000/api", dir.path()).unwrap();
        let storefront = Storefront::new(config).unwrap();

        let mut cart = storefront.cart().unwrap();
        cart.add(CartItem::new("p1", "Chai", Decimal::new(120, 0)))
            .unwrap();

        let reopened = Storefront::new(storefront.config().clone()).unwrap();
        assert_eq!(reopened.cart().unwrap().item_count(), 1);
        assert!(dir.path().join("cart.json").exists());
    }
}
