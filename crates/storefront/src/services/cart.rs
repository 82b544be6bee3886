//! Cart persistence.
//!
//! The cart lives in memory and is mirrored to the local store after every
//! mutation, so a later invocation picks up where this one left off.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use tabletop_core::ProductId;

use crate::models::{Cart, CartItem, CartLine, Product, QuantityChange};
use crate::storage::{self, LocalStore, StorageError, keys};

/// The shopping cart, backed by the local store.
pub struct CartService {
    store: Arc<dyn LocalStore>,
    cart: Cart,
}

impl CartService {
    /// Restore the cart from `store`.
    ///
    /// A missing or unreadable stored cart starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store itself cannot be read.
    pub fn load(store: Arc<dyn LocalStore>) -> Result<Self, StorageError> {
        let cart: Cart = storage::load_json(store.as_ref(), keys::CART)?.unwrap_or_default();
        debug!(lines = cart.len(), "Cart restored");
        Ok(Self { store, cart })
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one of `item`, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn add(&mut self, item: CartItem) -> Result<(), StorageError> {
        self.add_quantity(item, 1)
    }

    /// Add `quantity` of `item`, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    #[instrument(skip(self, item), fields(product_id = %item.id, quantity))]
    pub fn add_quantity(&mut self, item: CartItem, quantity: u32) -> Result<(), StorageError> {
        if quantity == 0 {
            return Ok(());
        }
        self.cart.add_quantity(item, quantity);
        self.persist()
    }

    /// Add `quantity` of a menu product.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> Result<(), StorageError> {
        self.add_quantity(CartItem::from(product), quantity)
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn remove(&mut self, id: &ProductId) -> Result<bool, StorageError> {
        let removed = self.cart.remove(id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Set the quantity for `id`; zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn update_quantity(
        &mut self,
        id: &ProductId,
        quantity: i64,
    ) -> Result<QuantityChange, StorageError> {
        let change = self.cart.update_quantity(id, quantity);
        if change != QuantityChange::Missing {
            self.persist()?;
        }
        Ok(change)
    }

    /// Empty the cart and delete it from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart cannot be removed.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.store.remove(keys::CART)?;
        debug!("Cart cleared");
        Ok(())
    }

    /// Take a placed order's lines out of the cart, keeping anything added
    /// since. Deletes the stored cart once nothing is left.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be saved or removed.
    #[instrument(skip(self, ordered))]
    pub fn remove_ordered(&mut self, ordered: &Cart) -> Result<(), StorageError> {
        self.cart.subtract(ordered);
        if self.cart.is_empty() {
            self.clear()
        } else {
            self.persist()
        }
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    fn persist(&self) -> Result<(), StorageError> {
        storage::save_json(self.store.as_ref(), keys::CART, &self.cart)?;
        debug!(
            lines = self.cart.len(),
            items = self.cart.item_count(),
            "Cart saved"
        );
        Ok(())
    }
}
