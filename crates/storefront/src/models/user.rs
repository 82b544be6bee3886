//! Signed-in user types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use tabletop_core::{Email, UserId};

/// Bearer token issued by the backend at login.
///
/// Redacted from `Debug` output; only [`AuthToken::expose`] reveals it.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Reveal the raw token, e.g. for an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

impl Serialize for AuthToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for AuthToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// The signed-in user, as persisted in the local store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    /// Backend user ID.
    #[serde(alias = "_id")]
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Bearer token for authenticated requests.
    pub token: AuthToken,
}

impl CurrentUser {
    /// Name to greet the user with, falling back to "Guest".
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Guest"
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_token_redacted_in_debug() {
        let user = CurrentUser {
            id: UserId::new("u1"),
            name: "Ayesha".to_string(),
            email: Email::parse("ayesha@example.com").unwrap(),
            token: AuthToken::new("super-secret-jwt"),
        };
        let debug_output = format!("{user:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-jwt"));
    }

    #[test]
    fn test_persisted_shape() {
        let raw = json!({
            "_id": "675a123456789012345678ab",
            "name": "Ayesha",
            "email": "ayesha@example.com",
            "token": "jwt"
        });
        let user: CurrentUser = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id.as_str(), "675a123456789012345678ab");
        assert_eq!(user.token.expose(), "jwt");

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["id"], "675a123456789012345678ab");
        assert_eq!(value["token"], "jwt");
    }

    #[test]
    fn test_display_name_fallback() {
        let user = CurrentUser {
            id: UserId::new("u1"),
            name: "  ".to_string(),
            email: Email::parse("a@b.co").unwrap(),
            token: AuthToken::new("t"),
        };
        assert_eq!(user.display_name(), "Guest");
    }
}
