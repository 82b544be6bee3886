//! Unified error handling.
//!
//! Provides a unified `AppError` type wrapping every module's error. Front
//! ends show [`AppError::user_message`] and log the full error chain.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// Message safe to show the customer.
    ///
    /// Validation and backend messages pass through; transport, parsing,
    /// and storage details do not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Storage(_) => STORAGE_MESSAGE.to_string(),
            Self::Api(err) => api_message(err),
            Self::Auth(err) => match err {
                AuthError::Api(err) => api_message(err),
                AuthError::Storage(_) => STORAGE_MESSAGE.to_string(),
                other => other.to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Api(err) => api_message(err),
                CheckoutError::Storage(_) => STORAGE_MESSAGE.to_string(),
                CheckoutError::OrderSubmission {
                    payment_intent_id,
                    source,
                } => format!(
                    "Payment {payment_intent_id} succeeded but the order could not be placed: {} \
                     Your cart has been kept; try submitting the order again.",
                    api_message(source)
                ),
                other => other.to_string(),
            },
        }
    }
}

const STORAGE_MESSAGE: &str = "Could not read or write local data.";

fn api_message(err: &ApiError) -> String {
    match err {
        ApiError::Http(_) => "Network error. Please try again.".to_string(),
        ApiError::Parse(_) | ApiError::MissingField(_) => {
            "Unexpected response from the server.".to_string()
        }
        ApiError::RateLimited(secs) => {
            format!("Too many requests. Please wait {secs} seconds and try again.")
        }
        ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg.clone(),
        ApiError::Rejected { message, .. } => message.clone(),
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tabletop_core::PaymentIntentId;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Api(ApiError::NotFound("Restaurant not found: r1".to_string()));
        assert_eq!(err.to_string(), "API error: Not found: Restaurant not found: r1");
        assert_eq!(err.user_message(), "Restaurant not found: r1");
    }

    #[test]
    fn test_internal_details_hidden() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::Api(ApiError::Parse(parse));
        assert_eq!(err.user_message(), "Unexpected response from the server.");

        let err = AppError::Storage(StorageError::InvalidKey("../etc".to_string()));
        assert_eq!(err.user_message(), STORAGE_MESSAGE);
    }

    #[test]
    fn test_validation_messages_pass_through() {
        let err = AppError::Auth(AuthError::PasswordMismatch);
        assert_eq!(err.user_message(), "Passwords do not match.");

        let err = AppError::Auth(AuthError::Api(ApiError::Rejected {
            status: 401,
            message: "Invalid credentials".to_string(),
        }));
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_order_submission_message_names_payment() {
        let err = AppError::Checkout(CheckoutError::OrderSubmission {
            payment_intent_id: PaymentIntentId::new("pi_42"),
            source: ApiError::Rejected {
                status: 500,
                message: "Failed to create order".to_string(),
            },
        });
        let message = err.user_message();
        assert!(message.starts_with("Payment pi_42 succeeded"));
        assert!(message.contains("Failed to create order"));
    }
}
