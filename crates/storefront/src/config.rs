//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TABLETOP_API_BASE_URL` - Backend REST API base (default: `http://localhost:3000/api`)
//! - `TABLETOP_DATA_DIR` - Directory holding the local store (default: `.tabletop`)
//! - `TABLETOP_CURRENCY` - Checkout currency (default: `pkr`)
//! - `TABLETOP_HTTP_TIMEOUT_SECS` - Backend request timeout (default: 30)
//! - `TABLETOP_CACHE_TTL_SECS` - Restaurant/product cache lifetime (default: 300)
//! - `STRIPE_PUBLISHABLE_KEY` - Payment element publishable key; fetched from
//!   the backend when unset

use std::path::PathBuf;
use std::time::Duration;

use tabletop_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_DATA_DIR: &str = ".tabletop";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API base URL, always ending in `/`
    pub api_base_url: Url,
    /// Directory for the local store (cart, current user, checkout state)
    pub data_dir: PathBuf,
    /// Currency used for payment intents
    pub currency: CurrencyCode,
    /// Payment element publishable key, if configured locally
    pub payment_publishable_key: Option<String>,
    /// Timeout applied to every backend request
    pub http_timeout: Duration,
    /// How long restaurant and product responses stay cached
    pub cache_ttl: Duration,
}

impl StorefrontConfig {
    /// Create a configuration with defaults for everything but the API base
    /// URL and the data directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the base URL cannot be parsed.
    pub fn new(api_base_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("TABLETOP_API_BASE_URL", api_base_url)?,
            data_dir: data_dir.into(),
            currency: CurrencyCode::default(),
            payment_publishable_key: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_base_url = parse_base_url(
            "TABLETOP_API_BASE_URL",
            &get("TABLETOP_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let data_dir = PathBuf::from(get("TABLETOP_DATA_DIR", DEFAULT_DATA_DIR));
        let currency = get("TABLETOP_CURRENCY", "pkr")
            .parse::<CurrencyCode>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TABLETOP_CURRENCY".to_string(), e.to_string())
            })?;
        let http_timeout = parse_secs(
            "TABLETOP_HTTP_TIMEOUT_SECS",
            lookup("TABLETOP_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let cache_ttl = parse_secs(
            "TABLETOP_CACHE_TTL_SECS",
            lookup("TABLETOP_CACHE_TTL_SECS"),
            DEFAULT_CACHE_TTL_SECS,
        )?;
        let payment_publishable_key =
            lookup("STRIPE_PUBLISHABLE_KEY").filter(|key| !key.trim().is_empty());

        Ok(Self {
            api_base_url,
            data_dir,
            currency,
            payment_publishable_key,
            http_timeout,
            cache_ttl,
        })
    }

    /// Resolve API path segments (e.g. `["restaurants", id, "products"]`)
    /// against the base URL. Segments are percent-encoded.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base_url.clone();
        // Base URLs are checked to be hierarchical when parsed.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, forcing a trailing slash so relative joins keep the
/// last path segment.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_secs(key: &str, raw: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    raw.map_or(Ok(Duration::from_secs(default)), |value| {
        value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:3000/api/");
        assert_eq!(config.data_dir, PathBuf::from(".tabletop"));
        assert_eq!(config.currency, CurrencyCode::PKR);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.payment_publishable_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("TABLETOP_API_BASE_URL", "https://food.example.com/api/v2"),
            ("TABLETOP_DATA_DIR", "/tmp/tabletop"),
            ("TABLETOP_CURRENCY", "USD"),
            ("TABLETOP_HTTP_TIMEOUT_SECS", "5"),
            ("TABLETOP_CACHE_TTL_SECS", "0"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_123"),
        ]))
        .unwrap();
        assert_eq!(
            config.api_base_url.as_str(),
            "https://food.example.com/api/v2/"
        );
        assert_eq!(config.currency, CurrencyCode::USD);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Duration::ZERO);
        assert_eq!(config.payment_publishable_key.as_deref(), Some("pk_test_123"));
    }

    #[test]
    fn test_blank_publishable_key_is_ignored() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("STRIPE_PUBLISHABLE_KEY", "  ")]))
                .unwrap();
        assert!(config.payment_publishable_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[("TABLETOP_CURRENCY", "jpy")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "TABLETOP_CURRENCY"));

        let err = StorefrontConfig::from_lookup(lookup_from(&[(
            "TABLETOP_HTTP_TIMEOUT_SECS",
            "soon",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err =
            StorefrontConfig::from_lookup(lookup_from(&[("TABLETOP_API_BASE_URL", "not a url")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = StorefrontConfig::new("http://localhost:3000/api", "/tmp").unwrap();
        assert_eq!(
            config
                .endpoint(&["restaurants", "abc", "products"])
                .as_str(),
            "http://localhost:3000/api/restaurants/abc/products"
        );
        assert_eq!(
            config.endpoint(&["orders"]).as_str(),
            "http://localhost:3000/api/orders"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let config = StorefrontConfig::new("http://localhost:3000/api/", "/tmp").unwrap();
        assert_eq!(
            config.endpoint(&["products", "a/b c"]).as_str(),
            "http://localhost:3000/api/products/a%2Fb%20c"
        );
    }
}
