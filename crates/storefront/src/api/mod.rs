//! Backend REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`
//! - The backend is the source of truth for restaurants, menus, accounts,
//!   and orders; nothing is synced locally except the cart and session
//! - In-memory caching via `moka` for restaurant and product reads
//!
//! # Endpoints
//!
//! | area | methods |
//! |---|---|
//! | catalog | `restaurants`, `restaurant`, `restaurant_products`, `products`, `product` |
//! | account | `login`, `signup` |
//! | payments | `publishable_key`, `create_payment_intent`, `payment_status` |
//! | orders | `create_order` |
//!
//! # Example
//!
//! ```rust,ignore
//! use tabletop_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! let menu = client.restaurant_products(&restaurant_id).await?;
//! ```

mod account;
mod cache;
mod catalog;
mod orders;
mod payments;

pub use account::LoginSuccess;
pub use payments::{PaymentIntent, PaymentIntentState, PaymentMetadata};

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::StorefrontConfig;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the request as malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The backend answered with an error status or `success: false`.
    #[error("{message} (status {status})")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, or a generic fallback.
        message: String,
    },

    /// A success response lacked a field the client depends on.
    #[error("Response missing {0}")]
    MissingField(&'static str),
}

impl ApiError {
    /// HTTP status attached to the error, when there is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::BadRequest(_) => Some(400),
            Self::RateLimited(_) => Some(429),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request never got an answer from the backend.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront backend.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: StorefrontConfig,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                config: config.clone(),
                cache,
            }),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        self.inner.config.endpoint(segments)
    }

    /// GET the endpoint at `segments` and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let request = self.inner.client.get(self.endpoint(segments));
        let response = self.send(request).await?;
        decode(response).await
    }

    /// POST `body` as JSON to the endpoint at `segments` and decode the reply.
    async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.inner.client.post(self.endpoint(segments)).json(body);
        let response = self.send(request).await?;
        decode(response).await
    }

    /// Send a request and turn error statuses into [`ApiError`]s.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::warn!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );

        Err(match status {
            StatusCode::NOT_FOUND => {
                ApiError::NotFound(message.unwrap_or_else(|| "resource not found".to_string()))
            }
            StatusCode::BAD_REQUEST => ApiError::BadRequest(message.unwrap_or(body)),
            _ => ApiError::Rejected {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                }),
            },
        })
    }
}

/// Decode a success response body, logging what could not be parsed.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

/// Pull a human-readable message out of an error body.
///
/// The backend is inconsistent about where it puts the reason, so this
/// checks `message`, then `error`, then `details`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "details"].iter().find_map(|key| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_precedence() {
        assert_eq!(
            error_message(r#"{"error":"e","message":"m"}"#).as_deref(),
            Some("m")
        );
        assert_eq!(
            error_message(r#"{"error":"e","details":"d"}"#).as_deref(),
            Some("e")
        );
        assert_eq!(error_message(r#"{"details":"d"}"#).as_deref(), Some("d"));
    }

    #[test]
    fn test_error_message_missing() {
        assert_eq!(error_message("<html>oops</html>"), None);
        assert_eq!(error_message(r#"{"message":""}"#), None);
        assert_eq!(error_message(r#"{"message":42}"#), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Rejected {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.to_string(), "Email already registered (status 409)");
        assert_eq!(err.status(), Some(409));

        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
