//! Order types.
//!
//! An order is only ever built from a cart snapshot after the payment
//! service reports the intent as succeeded.

use rust_decimal::Decimal;
use serde::Serialize;

use tabletop_core::{OrderId, PaymentIntentId, PaymentStatus, ProductId, RestaurantId, UserId};

use super::cart::{Cart, CartLine};

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.item.id.clone(),
            name: line.item.name.clone(),
            price: line.item.price,
            quantity: line.quantity,
        }
    }
}

/// Order record submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<RestaurantId>,
    pub products: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub payment_intent_id: PaymentIntentId,
    pub payment_status: PaymentStatus,
    pub notes: String,
}

impl NewOrder {
    /// Snapshot `cart` into a completed-payment order for `user_id`.
    #[must_use]
    pub fn paid(user_id: UserId, cart: &Cart, payment_intent_id: PaymentIntentId) -> Self {
        let notes = format!("Order with payment ID: {payment_intent_id}");
        Self {
            user_id,
            restaurant_id: cart.restaurant_id().cloned(),
            products: cart.lines().iter().map(OrderLine::from).collect(),
            total_amount: cart.total(),
            payment_intent_id,
            payment_status: PaymentStatus::Completed,
            notes,
        }
    }
}

/// What the customer sees once an order has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Backend order ID; `None` if the backend recorded the order without
    /// returning one.
    pub order_id: Option<OrderId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub payment_intent_id: PaymentIntentId,
    pub items: Vec<CartLine>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::cart::CartItem;

    #[test]
    fn test_paid_order_snapshot() {
        let mut cart = Cart::new();
        cart.add(CartItem::new("p1", "Karahi", Decimal::new(1200, 0)).with_restaurant("r9"));
        cart.add(CartItem::new("p2", "Naan", Decimal::new(60, 0)).with_restaurant("r9"));
        cart.update_quantity(&ProductId::new("p2"), 3);

        let order = NewOrder::paid(UserId::new("u1"), &cart, PaymentIntentId::new("pi_123"));
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(
            value,
            json!({
                "userId": "u1",
                "restaurantId": "r9",
                "products": [
                    {"productId": "p1", "name": "Karahi", "price": 1200.0, "quantity": 1},
                    {"productId": "p2", "name": "Naan", "price": 60.0, "quantity": 3}
                ],
                "totalAmount": 1380.0,
                "paymentIntentId": "pi_123",
                "paymentStatus": "completed",
                "notes": "Order with payment ID: pi_123"
            })
        );
    }
}
