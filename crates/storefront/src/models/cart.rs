//! Cart domain types.
//!
//! The cart is an ordered list of lines keyed by product ID. Every mutation
//! keeps two invariants:
//!
//! - at most one line per product ID (adding an existing product bumps its
//!   quantity instead of appending a duplicate)
//! - every line has a quantity of at least one (setting a quantity to zero or
//!   less removes the line)
//!
//! This module is pure; persistence lives in
//! [`CartService`](crate::services::cart::CartService).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use tabletop_core::{ProductId, RestaurantId};

use super::lenient;

/// A product snapshot as placed into the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in the store currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Restaurant the product belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<RestaurantId>,
    /// Menu category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CartItem {
    /// Create an item with no image, restaurant, or category.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
            restaurant_id: None,
            category: None,
        }
    }

    /// Set the restaurant this item is ordered from.
    #[must_use]
    pub fn with_restaurant(mut self, restaurant_id: impl Into<RestaurantId>) -> Self {
        self.restaurant_id = Some(restaurant_id.into());
        self
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// The product snapshot.
    #[serde(flatten)]
    pub item: CartItem,
    /// Quantity, always at least one.
    pub quantity: u32,
}

impl CartLine {
    /// Product ID of this line.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.item.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.item.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Outcome of [`Cart::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has the requested quantity.
    Updated,
    /// The requested quantity was zero or less, so the line was removed.
    Removed,
    /// No line with that product ID exists.
    Missing,
}

/// The shopping cart.
///
/// Serializes as a plain JSON array of lines. Deserialization is forgiving
/// (see [`Cart::from_stored`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<StoredCartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `item`.
    ///
    /// If the product is already in the cart its quantity is incremented and
    /// the existing snapshot is kept; otherwise a new line with quantity one
    /// is appended.
    pub fn add(&mut self, item: CartItem) {
        self.add_quantity(item, 1);
    }

    /// Add `quantity` units of `item`. Adding zero units does nothing.
    pub fn add_quantity(&mut self, item: CartItem, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(line) = self.line_mut(&item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine { item, quantity });
        }
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id() != id);
        self.lines.len() != before
    }

    /// Set the quantity for `id`.
    ///
    /// A quantity of zero or less removes the line. Quantities above
    /// `u32::MAX` are clamped.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> QuantityChange {
        if quantity <= 0 {
            return if self.remove(id) {
                QuantityChange::Removed
            } else {
                QuantityChange::Missing
            };
        }

        match self.line_mut(id) {
            Some(line) => {
                line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                QuantityChange::Updated
            }
            None => QuantityChange::Missing,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Take `other`'s quantities out of this cart, dropping lines that
    /// reach zero. Products not in this cart are ignored.
    pub fn subtract(&mut self, other: &Self) {
        for taken in other {
            if let Some(line) = self.line_mut(taken.id()) {
                line.quantity = line.quantity.saturating_sub(taken.quantity);
            }
        }
        self.lines.retain(|line| line.quantity > 0);
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.line_total()))
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Restaurant of the first line; orders are placed against it.
    #[must_use]
    pub fn restaurant_id(&self) -> Option<&RestaurantId> {
        self.lines
            .first()
            .and_then(|line| line.item.restaurant_id.as_ref())
    }

    /// Short human-readable description, e.g. `"Zinger x2, Fries x1"`.
    #[must_use]
    pub fn summary(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{} x{}", line.item.name, line.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Rebuild a cart from stored lines.
    ///
    /// - lines without an ID are dropped
    /// - a missing or non-numeric price counts as zero
    /// - a missing, non-numeric, or non-positive quantity drops the line
    /// - repeated IDs are merged by summing their quantities
    #[must_use]
    pub fn from_stored(stored: Vec<StoredCartLine>) -> Self {
        let mut cart = Self::new();
        for raw in stored {
            let Some((item, quantity)) = raw.into_parts() else {
                continue;
            };
            cart.add_quantity(item, quantity);
        }
        cart
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lines.serialize(serializer)
    }
}

impl From<Vec<StoredCartLine>> for Cart {
    fn from(stored: Vec<StoredCartLine>) -> Self {
        Self::from_stored(stored)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// A cart line as found in the local store, before validation.
///
/// Accepts `_id` in place of `id`, and prices or quantities written as
/// numbers, numeric strings, or not at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCartLine {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "_id")]
    legacy_id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Value,
    #[serde(default)]
    quantity: Value,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    restaurant_id: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl StoredCartLine {
    fn into_parts(self) -> Option<(CartItem, u32)> {
        let id = [self.id, self.legacy_id]
            .into_iter()
            .flatten()
            .find_map(|value| match value {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        let Some(id) = id else {
            tracing::warn!("Dropping stored cart line without an id");
            return None;
        };

        let quantity = lenient::whole_number(&self.quantity)
            .filter(|q| *q > 0)
            .map(|q| u32::try_from(q).unwrap_or(u32::MAX));
        let Some(quantity) = quantity else {
            tracing::warn!(product_id = %id, "Dropping stored cart line without a positive quantity");
            return None;
        };

        let item = CartItem {
            id: ProductId::new(id),
            name: self.name.unwrap_or_default(),
            price: lenient::decimal_or_zero(&self.price),
            image: self.image,
            restaurant_id: self.restaurant_id.map(RestaurantId::new),
            category: self.category,
        };
        Some((item, quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn burger() -> CartItem {
        CartItem::new("p-burger", "Burger", Decimal::new(450, 0)).with_restaurant("r-1")
    }

    fn fries() -> CartItem {
        CartItem::new("p-fries", "Fries", Decimal::new(1995, 2)).with_restaurant("r-2")
    }

    #[test]
    fn test_add_same_product_twice_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.add(burger());

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::new("p-burger")).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.add(fries());
        cart.add(burger());

        let ids: Vec<_> = cart.lines().iter().map(|l| l.id().as_str()).collect();
        assert_eq!(ids, vec!["p-burger", "p-fries"]);
    }

    #[test]
    fn test_add_quantity_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_quantity(burger(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_to_zero_or_less_removes_line() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.add(fries());

        let id = ProductId::new("p-burger");
        assert_eq!(cart.update_quantity(&id, 0), QuantityChange::Removed);
        assert!(cart.get(&id).is_none());

        let id = ProductId::new("p-fries");
        assert_eq!(cart.update_quantity(&id, -3), QuantityChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        cart.add(burger());
        let id = ProductId::new("p-burger");

        assert_eq!(cart.update_quantity(&id, 5), QuantityChange::Updated);
        assert_eq!(cart.get(&id).unwrap().quantity, 5);
    }

    #[test]
    fn test_update_quantity_unknown_id() {
        let mut cart = Cart::new();
        cart.add(burger());
        let missing = ProductId::new("nope");

        assert_eq!(cart.update_quantity(&missing, 2), QuantityChange::Missing);
        assert_eq!(cart.update_quantity(&missing, 0), QuantityChange::Missing);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(burger());
        assert!(cart.remove(&ProductId::new("p-burger")));
        assert!(!cart.remove(&ProductId::new("p-burger")));
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.add(burger());
        cart.add(fries());

        // 2 * 450 + 19.95
        assert_eq!(cart.total(), Decimal::new(91995, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
        assert!(cart.restaurant_id().is_none());
        assert_eq!(cart.summary(), "");
    }

    #[test]
    fn test_restaurant_is_first_lines() {
        let mut cart = Cart::new();
        cart.add(fries());
        cart.add(burger());
        assert_eq!(cart.restaurant_id().unwrap().as_str(), "r-2");
    }

    #[test]
    fn test_summary() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.add(burger());
        cart.add(fries());
        assert_eq!(cart.summary(), "Burger x2, Fries x1");
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_subtract_keeps_remainder() {
        let mut cart = Cart::new();
        cart.add_quantity(burger(), 3);
        cart.add(fries());

        let mut ordered = Cart::new();
        ordered.add(burger());
        ordered.add_quantity(fries(), 2);
        ordered.add(CartItem::new("p9", "Cola", Decimal::new(90, 0)));

        cart.subtract(&ordered);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::new("p-burger")).unwrap().quantity, 2);
        assert!(cart.get(&ProductId::new("p-fries")).is_none());
    }

    #[test]
    fn test_serializes_as_array_of_flat_lines() {
        let mut cart = Cart::new();
        cart.add(burger());
        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            value,
            json!([{
                "id": "p-burger",
                "name": "Burger",
                "price": 450.0,
                "restaurantId": "r-1",
                "quantity": 1
            }])
        );
    }

    #[test]
    fn test_stored_cart_survives_reload() {
        let mut cart = Cart::new();
        cart.add(burger());
        cart.add(fries());
        cart.update_quantity(&ProductId::new("p-fries"), 3);

        let raw = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_total_tolerates_missing_and_non_numeric_values() {
        let raw = json!([
            {"id": "a", "name": "A", "price": "120.50", "quantity": "2"},
            {"id": "b", "name": "B", "price": "market price", "quantity": 4},
            {"id": "c", "name": "C", "quantity": 1},
            {"id": "d", "name": "D", "price": 99},
            {"id": "e", "name": "E", "price": 10, "quantity": "lots"}
        ]);
        let cart: Cart = serde_json::from_value(raw).unwrap();

        // d and e have no usable quantity and are dropped.
        assert_eq!(cart.len(), 3);
        assert_eq!(cart.total(), Decimal::new(24100, 2));
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_stored_lines_accept_legacy_id_and_merge_duplicates() {
        let raw = json!([
            {"_id": "x", "name": "X", "price": 5, "quantity": 1},
            {"id": "x", "name": "X again", "price": 6, "quantity": 2},
            {"name": "no id", "price": 1, "quantity": 1},
            {"id": "y", "price": 1, "quantity": 0}
        ]);
        let cart: Cart = serde_json::from_value(raw).unwrap();

        assert_eq!(cart.len(), 1);
        let line = cart.get(&ProductId::new("x")).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.item.name, "X");
    }
}
