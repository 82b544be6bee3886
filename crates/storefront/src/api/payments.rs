//! Payment-service endpoints (`/stripe/*`).
//!
//! Card entry and confirmation happen out of process; the client only
//! creates intents and polls their status.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tabletop_core::{CurrencyCode, PaymentIntentId, PaymentIntentStatus, UserId};

use super::{ApiClient, ApiError};

/// Metadata attached to a payment intent for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadata {
    /// Client-side reference, `order-<epoch millis>`.
    pub order_id: String,
    pub customer_id: UserId,
    pub item_count: u64,
    /// `"name xqty, name xqty"`.
    pub items: String,
}

/// A freshly created payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Secret handed to the card form to confirm the payment.
    pub client_secret: String,
    pub id: PaymentIntentId,
}

/// Current state of a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentState {
    pub id: PaymentIntentId,
    pub status: PaymentIntentStatus,
}

#[derive(Serialize)]
struct CreateIntentRequest<'a> {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    currency: CurrencyCode,
    metadata: &'a PaymentMetadata,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIntentResponse {
    client_secret: Option<String>,
    payment_intent_id: Option<PaymentIntentId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishableKeyResponse {
    publishable_key: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    id: Option<PaymentIntentId>,
    status: PaymentIntentStatus,
}

impl ApiClient {
    /// Publishable key for the card form.
    ///
    /// A key configured locally wins over asking the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingField`] if the backend has no key to give,
    /// or any other error if the request fails.
    #[instrument(skip(self))]
    pub async fn publishable_key(&self) -> Result<String, ApiError> {
        if let Some(key) = self.inner.config.payment_publishable_key.as_deref() {
            tracing::debug!("Using configured publishable key");
            return Ok(key.to_string());
        }

        let response: PublishableKeyResponse = self.get_json(&["stripe", "config"]).await?;
        response
            .publishable_key
            .filter(|k| !k.is_empty())
            .ok_or(ApiError::MissingField("publishableKey"))
    }

    /// Create a payment intent for `amount` in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingField`] if the response has no client
    /// secret, or any other error if the backend refuses the intent.
    #[instrument(skip(self, metadata), fields(amount = %amount, currency = %currency, reference = %metadata.order_id))]
    pub async fn create_payment_intent(
        &self,
        amount: Decimal,
        currency: CurrencyCode,
        metadata: &PaymentMetadata,
    ) -> Result<PaymentIntent, ApiError> {
        let body = CreateIntentRequest {
            amount,
            currency,
            metadata,
        };
        let response: CreateIntentResponse = self
            .post_json(&["stripe", "create-payment-intent"], &body)
            .await?;

        let client_secret = response
            .client_secret
            .filter(|s| !s.is_empty())
            .ok_or(ApiError::MissingField("clientSecret"))?;
        let id = response
            .payment_intent_id
            .filter(|id| !id.is_blank())
            .or_else(|| intent_id_from_secret(&client_secret))
            .ok_or(ApiError::MissingField("paymentIntentId"))?;

        tracing::info!(payment_intent_id = %id, "Payment intent created");

        Ok(PaymentIntent { client_secret, id })
    }

    /// Ask the payment service where an intent stands.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(payment_intent_id = %id))]
    pub async fn payment_status(
        &self,
        id: &PaymentIntentId,
    ) -> Result<PaymentIntentState, ApiError> {
        let response: StatusResponse = self
            .get_json(&["stripe", "payment-status", id.as_str()])
            .await?;

        Ok(PaymentIntentState {
            id: response.id.unwrap_or_else(|| id.clone()),
            status: response.status,
        })
    }
}

/// Client secrets look like `pi_XXX_secret_YYY`; the intent ID is the
/// part before `_secret_`.
fn intent_id_from_secret(client_secret: &str) -> Option<PaymentIntentId> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
        .map(PaymentIntentId::new)
}
