//! Checkout: payment intent, out-of-process confirmation, order submission.
//!
//! Card entry happens outside this process, so checkout is a small state
//! machine persisted under the `checkout` key:
//!
//! ```text
//! Idle ──begin──▶ AwaitingPayment ──confirm──▶ Confirmed ──submit_order──▶ Idle
//!   ▲                   │                                      │
//!   └──cancel/failed────┘                          (failure: stays Confirmed)
//! ```
//!
//! The cart and customer are snapshotted with the intent, and the order
//! placed is that snapshot whatever the live cart looks like later. An order
//! is only ever submitted for an intent the payment service reports as
//! `succeeded`, and a pending intent is never replaced or cancelled without
//! first asking the payment service whether it was paid.

mod error;

pub use error::CheckoutError;

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tabletop_core::{CurrencyCode, PaymentIntentId, PaymentIntentStatus, Price, UserId};

use super::cart::CartService;
use crate::api::{ApiClient, PaymentIntent, PaymentMetadata};
use crate::models::{Cart, CurrentUser, NewOrder, OrderConfirmation};
use crate::storage::{self, LocalStore, keys};

/// A payment intent waiting for the customer to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayment {
    pub intent: PaymentIntent,
    /// Amount the intent was created for.
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// Client-side reference sent as `orderId` metadata.
    pub reference: String,
    /// Account the intent was created for.
    pub customer_id: UserId,
    /// Cart the intent pays for.
    pub cart: Cart,
}

/// Where the checkout currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// No checkout in progress.
    #[default]
    Idle,
    /// Intent created; waiting for the card form.
    AwaitingPayment(PendingPayment),
    /// Payment succeeded; the order still has to be placed.
    #[serde(rename_all = "camelCase")]
    Confirmed {
        payment_intent_id: PaymentIntentId,
        amount: Decimal,
        customer_id: UserId,
        /// The cart that was paid for.
        cart: Cart,
    },
}

impl CheckoutPhase {
    /// Short name for logs and status output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingPayment(_) => "awaiting_payment",
            Self::Confirmed { .. } => "confirmed",
        }
    }
}

/// Checkout service.
#[derive(Clone)]
pub struct CheckoutService {
    api: ApiClient,
    store: Arc<dyn LocalStore>,
    currency: CurrencyCode,
}

impl CheckoutService {
    /// Create a checkout service charging in `currency`.
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn LocalStore>, currency: CurrencyCode) -> Self {
        Self {
            api,
            store,
            currency,
        }
    }

    /// Current phase. Unreadable stored state counts as idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn phase(&self) -> Result<CheckoutPhase, CheckoutError> {
        Ok(storage::load_json(self.store.as_ref(), keys::CHECKOUT)?.unwrap_or_default())
    }

    /// Start paying for `cart`.
    ///
    /// Reuses the pending intent when the cart, customer, and currency are
    /// unchanged. Otherwise the pending intent is checked first: if it was
    /// paid in the meantime the checkout moves to confirmed and no new
    /// intent is created.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn`, `EmptyCart`, `BelowMinimum`, or `AlreadyPaid`
    /// before any new intent is created, `NotYetPaid` while the previous
    /// payment is still processing, or `Api` if the payment service fails.
    #[instrument(skip(self, user, cart), fields(currency = %self.currency))]
    pub async fn begin(
        &self,
        user: Option<&CurrentUser>,
        cart: &Cart,
    ) -> Result<PendingPayment, CheckoutError> {
        let user = user.ok_or(CheckoutError::NotLoggedIn)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let amount = cart.total();
        let total = Price::new(amount, self.currency);
        if !total.meets_minimum_charge() {
            return Err(CheckoutError::BelowMinimum {
                total,
                minimum: Price::new(self.currency.minimum_charge(), self.currency),
            });
        }

        match self.phase()? {
            CheckoutPhase::Idle => {}
            CheckoutPhase::AwaitingPayment(pending)
                if pending.cart == *cart
                    && pending.currency == self.currency
                    && pending.customer_id == user.id =>
            {
                tracing::debug!(payment_intent_id = %pending.intent.id, "Reusing pending payment intent");
                return Ok(pending);
            }
            CheckoutPhase::AwaitingPayment(pending) => self.ensure_unpaid(pending).await?,
            CheckoutPhase::Confirmed {
                payment_intent_id, ..
            } => return Err(CheckoutError::AlreadyPaid(payment_intent_id)),
        }

        let reference = format!("order-{}", Utc::now().timestamp_millis());
        let metadata = PaymentMetadata {
            order_id: reference.clone(),
            customer_id: user.id.clone(),
            item_count: cart.item_count(),
            items: cart.summary(),
        };
        let intent = self
            .api
            .create_payment_intent(amount, self.currency, &metadata)
            .await?;

        let pending = PendingPayment {
            intent,
            amount,
            currency: self.currency,
            reference,
            customer_id: user.id.clone(),
            cart: cart.clone(),
        };
        self.save(&CheckoutPhase::AwaitingPayment(pending.clone()))?;

        tracing::info!(
            payment_intent_id = %pending.intent.id,
            amount = %amount,
            reference = %pending.reference,
            "Checkout awaiting payment"
        );
        Ok(pending)
    }

    /// Ask the payment service whether the pending payment went through.
    ///
    /// Already-confirmed checkouts return their intent ID without a request.
    ///
    /// # Errors
    ///
    /// Returns `NoPendingPayment` when idle, `NotYetPaid` while the payment
    /// can still succeed, or `PaymentFailed` (and resets to idle) once the
    /// intent is canceled.
    #[instrument(skip(self))]
    pub async fn confirm(&self) -> Result<PaymentIntentId, CheckoutError> {
        let pending = match self.phase()? {
            CheckoutPhase::Idle => return Err(CheckoutError::NoPendingPayment),
            CheckoutPhase::Confirmed {
                payment_intent_id, ..
            } => return Ok(payment_intent_id),
            CheckoutPhase::AwaitingPayment(pending) => pending,
        };

        let state = self.api.payment_status(&pending.intent.id).await?;
        match state.status {
            PaymentIntentStatus::Succeeded => self.record_paid(pending),
            PaymentIntentStatus::Canceled => {
                self.store.remove(keys::CHECKOUT)?;
                tracing::warn!(payment_intent_id = %pending.intent.id, "Payment canceled");
                Err(CheckoutError::PaymentFailed(state.status))
            }
            status => {
                tracing::debug!(status = %status, "Payment not completed yet");
                Err(CheckoutError::NotYetPaid(status))
            }
        }
    }

    /// Place the order for a confirmed payment.
    ///
    /// The order holds the cart as it was paid for. On success checkout
    /// returns to idle and the ordered quantities are taken out of the cart;
    /// anything added after payment stays. On failure nothing changes, so
    /// submission can be retried.
    ///
    /// # Errors
    ///
    /// Returns `NotConfirmed` unless the payment is confirmed,
    /// `PaidByOtherCustomer` if `user` is not the account that paid, or
    /// `OrderSubmission` if the backend does not record the order.
    #[instrument(skip(self, user, cart), fields(user_id = %user.id))]
    pub async fn submit_order(
        &self,
        user: &CurrentUser,
        cart: &mut CartService,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let CheckoutPhase::Confirmed {
            payment_intent_id,
            amount,
            customer_id,
            cart: paid,
        } = self.phase()?
        else {
            return Err(CheckoutError::NotConfirmed);
        };
        if customer_id != user.id {
            return Err(CheckoutError::PaidByOtherCustomer {
                payment_intent_id,
                customer_id,
            });
        }
        if cart.cart() != &paid {
            tracing::warn!(
                payment_intent_id = %payment_intent_id,
                "Cart changed after payment; ordering the items that were paid for"
            );
        }

        let order = NewOrder::paid(user.id.clone(), &paid, payment_intent_id.clone());
        let order_id = self
            .api
            .create_order(&order, &user.token)
            .await
            .map_err(|source| {
                tracing::error!(
                    payment_intent_id = %payment_intent_id,
                    error = %source,
                    "Order submission failed after payment"
                );
                CheckoutError::OrderSubmission {
                    payment_intent_id: payment_intent_id.clone(),
                    source,
                }
            })?;

        // The backend has the order; this payment must never be submitted again.
        self.store.remove(keys::CHECKOUT)?;
        if let Err(e) = cart.remove_ordered(&paid) {
            tracing::warn!(error = %e, "Order placed but the cart could not be updated");
        }

        tracing::info!(order_id = ?order_id, payment_intent_id = %payment_intent_id, "Order placed");
        Ok(OrderConfirmation {
            order_id,
            total: amount,
            payment_intent_id,
            items: paid.lines().to_vec(),
        })
    }

    /// Confirm the payment, then place the order.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::confirm`] or [`Self::submit_order`].
    pub async fn complete(
        &self,
        user: &CurrentUser,
        cart: &mut CartService,
    ) -> Result<OrderConfirmation, CheckoutError> {
        self.confirm().await?;
        self.submit_order(user, cart).await
    }

    /// Abandon the checkout and return to idle.
    ///
    /// A pending intent is checked with the payment service first; a paid
    /// checkout is never abandoned.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPaid` if the payment went through, `NotYetPaid` while
    /// it is still processing, or an error if the payment service or store
    /// cannot be reached.
    #[instrument(skip(self))]
    pub async fn cancel(&self) -> Result<(), CheckoutError> {
        match self.phase()? {
            CheckoutPhase::Idle => {}
            CheckoutPhase::AwaitingPayment(pending) => self.ensure_unpaid(pending).await?,
            CheckoutPhase::Confirmed {
                payment_intent_id, ..
            } => return Err(CheckoutError::AlreadyPaid(payment_intent_id)),
        }
        self.store.remove(keys::CHECKOUT)?;
        tracing::info!("Checkout cancelled");
        Ok(())
    }

    /// Check that `pending` can be dropped without losing a payment.
    ///
    /// A paid intent is recorded as confirmed before `AlreadyPaid` is
    /// returned.
    async fn ensure_unpaid(&self, pending: PendingPayment) -> Result<(), CheckoutError> {
        let status = self.api.payment_status(&pending.intent.id).await?.status;
        match status {
            PaymentIntentStatus::Succeeded => {
                let payment_intent_id = self.record_paid(pending)?;
                Err(CheckoutError::AlreadyPaid(payment_intent_id))
            }
            PaymentIntentStatus::Processing | PaymentIntentStatus::RequiresCapture => {
                Err(CheckoutError::NotYetPaid(status))
            }
            _ => {
                tracing::debug!(
                    payment_intent_id = %pending.intent.id,
                    status = %status,
                    "Dropping unpaid payment intent"
                );
                Ok(())
            }
        }
    }

    fn record_paid(&self, pending: PendingPayment) -> Result<PaymentIntentId, CheckoutError> {
        let payment_intent_id = pending.intent.id;
        self.save(&CheckoutPhase::Confirmed {
            payment_intent_id: payment_intent_id.clone(),
            amount: pending.amount,
            customer_id: pending.customer_id,
            cart: pending.cart,
        })?;
        tracing::info!(payment_intent_id = %payment_intent_id, "Payment confirmed");
        Ok(payment_intent_id)
    }

    fn save(&self, phase: &CheckoutPhase) -> Result<(), CheckoutError> {
        storage::save_json(self.store.as_ref(), keys::CHECKOUT, phase)?;
        tracing::debug!(phase = phase.name(), "Checkout state saved");
        Ok(())
    }
}
