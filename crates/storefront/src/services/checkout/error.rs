//! Checkout error types.

use thiserror::Error;

use tabletop_core::{PaymentIntentId, PaymentIntentStatus, Price, UserId};

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur while paying for and placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout needs a signed-in customer.
    #[error("Please log in to check out.")]
    NotLoggedIn,

    /// Nothing to pay for.
    #[error("Your cart is empty.")]
    EmptyCart,

    /// Cart total is under the payment service's minimum charge.
    #[error("Minimum payment amount is {minimum}; your total is {total}.")]
    BelowMinimum {
        /// Cart total.
        total: Price,
        /// Smallest chargeable amount in the same currency.
        minimum: Price,
    },

    /// A payment already went through and its order has not been placed.
    #[error("Payment {0} already succeeded; its order has to be placed first.")]
    AlreadyPaid(PaymentIntentId),

    /// The confirmed payment was made by a different account.
    #[error(
        "Payment {payment_intent_id} was made by another account; log in as that account to place the order."
    )]
    PaidByOtherCustomer {
        /// The charged payment.
        payment_intent_id: PaymentIntentId,
        /// Account the payment was made for.
        customer_id: UserId,
    },

    /// No payment has been started.
    #[error("No payment in progress.")]
    NoPendingPayment,

    /// The payment has not gone through yet.
    #[error("Payment not completed yet (status: {0}).")]
    NotYetPaid(PaymentIntentStatus),

    /// The payment can no longer succeed.
    #[error("Payment failed (status: {0}).")]
    PaymentFailed(PaymentIntentStatus),

    /// Order submission attempted before payment was confirmed.
    #[error("Payment has not been confirmed.")]
    NotConfirmed,

    /// Payment succeeded but the backend did not record the order.
    #[error("Payment {payment_intent_id} succeeded but the order could not be placed: {source}")]
    OrderSubmission {
        /// The charged payment, for support follow-up.
        payment_intent_id: PaymentIntentId,
        /// Underlying backend error.
        #[source]
        source: ApiError,
    },

    /// Payment service or backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Checkout state could not be saved or restored.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
