//! Order submission.

use serde_json::Value;
use tracing::instrument;

use tabletop_core::OrderId;

use super::{ApiClient, ApiError};
use crate::models::{AuthToken, NewOrder};

impl ApiClient {
    /// Record a paid order and return the backend's order ID.
    ///
    /// A success response without an ID still means the order was recorded,
    /// so it yields `Ok(None)` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the order or cannot be reached.
    #[instrument(
        skip(self, order, token),
        fields(user_id = %order.user_id, payment_intent_id = %order.payment_intent_id)
    )]
    pub async fn create_order(
        &self,
        order: &NewOrder,
        token: &AuthToken,
    ) -> Result<Option<OrderId>, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["orders"]))
            .json(order)
            .bearer_auth(token.expose());
        let response = self.send(request).await?;

        // Recorded from here on; an unreadable body only loses the ID.
        let body = response.text().await.unwrap_or_default();
        let order_id = serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(order_id_from);

        match &order_id {
            Some(order_id) => tracing::info!(order_id = %order_id, "Order created"),
            None => tracing::warn!("Order created but the response carried no order ID"),
        }
        Ok(order_id)
    }
}

/// Order ID from a create-order response: `data._id`, then top-level `_id`
/// or `id`.
fn order_id_from(body: &Value) -> Option<OrderId> {
    let candidates = [
        body.pointer("/data/_id"),
        body.pointer("/data/id"),
        body.get("_id"),
        body.get("id"),
    ];
    candidates.into_iter().flatten().find_map(|v| match v {
        Value::String(s) if !s.trim().is_empty() => Some(OrderId::new(s.as_str())),
        Value::Number(n) => Some(OrderId::new(n.to_string())),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_id_prefers_data() {
        let body = json!({"success": true, "data": {"_id": "o1"}, "_id": "o2"});
        assert_eq!(order_id_from(&body).unwrap().as_str(), "o1");
    }

    #[test]
    fn test_order_id_top_level() {
        assert_eq!(order_id_from(&json!({"_id": "o2"})).unwrap().as_str(), "o2");
        assert_eq!(order_id_from(&json!({"id": 17})).unwrap().as_str(), "17");
    }

    #[test]
    fn test_order_id_missing() {
        assert!(order_id_from(&json!({"success": true})).is_none());
        assert!(order_id_from(&json!({"_id": ""})).is_none());
    }
}
