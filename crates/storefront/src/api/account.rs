//! Login and signup.
//!
//! Both endpoints answer with a `success` flag; a 2xx without
//! `success: true` is still a rejection.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use tabletop_core::{Email, UserId};

use super::{ApiClient, ApiError};
use crate::models::{AuthToken, CurrentUser};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    /// The signed-in user, token attached.
    pub user: CurrentUser,
    /// Greeting or status text from the backend, if any.
    pub message: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthEnvelope {
    #[serde(default)]
    success: bool,
    token: Option<String>,
    user: Option<UserPayload>,
    message: Option<String>,
    error: Option<String>,
}

impl AuthEnvelope {
    /// Turn `success: false` into a rejection carrying the backend's reason.
    fn ensure_success(self, fallback: &str) -> Result<Self, ApiError> {
        if self.success {
            return Ok(self);
        }
        let message = self
            .message
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Err(ApiError::Rejected {
            status: 200,
            message,
        })
    }
}

#[derive(Deserialize)]
struct UserPayload {
    #[serde(alias = "_id")]
    id: UserId,
    #[serde(default)]
    name: String,
    email: Option<Email>,
}

impl ApiClient {
    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] (or another status error) if the
    /// backend refuses the credentials, [`ApiError::MissingField`] if a
    /// success response lacks the token or user, or any other error if the
    /// request fails.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<LoginSuccess, ApiError> {
        let body = LoginRequest {
            email: email.as_str(),
            password,
        };
        let envelope: AuthEnvelope = self.post_json(&["login"], &body).await?;
        let envelope = envelope.ensure_success("Login failed. Please try again.")?;

        let token = envelope
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingField("token"))?;
        let payload = envelope.user.ok_or(ApiError::MissingField("user"))?;

        let user = CurrentUser {
            id: payload.id,
            name: payload.name,
            email: payload.email.unwrap_or_else(|| email.clone()),
            token: AuthToken::new(token),
        };

        tracing::info!(user_id = %user.id, "Logged in");

        Ok(LoginSuccess {
            user,
            message: envelope.message,
        })
    }

    /// Create an account. The user still has to log in afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] (or another status error) if the
    /// backend refuses the signup, or any other error if the request fails.
    #[instrument(skip(self, name, email, password))]
    pub async fn signup(&self, name: &str, email: &Email, password: &str) -> Result<(), ApiError> {
        let body = SignupRequest {
            name,
            email: email.as_str(),
            password,
        };
        let envelope: AuthEnvelope = self.post_json(&["signup"], &body).await?;
        envelope.ensure_success("Signup failed. Please try again.")?;

        tracing::info!("Account created");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_failure_uses_backend_message() {
        let envelope: AuthEnvelope =
            serde_json::from_str(r#"{"success":false,"error":"Invalid credentials"}"#).unwrap();
        let err = envelope.ensure_success("Login failed.").err().unwrap();
        assert_eq!(err.to_string(), "Invalid credentials (status 200)");
    }

    #[test]
    fn test_envelope_without_success_flag_is_rejected() {
        let envelope: AuthEnvelope = serde_json::from_str(r#"{"token":"t"}"#).unwrap();
        let err = envelope.ensure_success("Login failed.").err().unwrap();
        assert!(matches!(err, ApiError::Rejected { message, .. } if message == "Login failed."));
    }

    #[test]
    fn test_envelope_success() {
        let envelope: AuthEnvelope = serde_json::from_str(
            r#"{"success":true,"token":"t","user":{"_id":"u1","name":"Ali","email":"ali@example.com"}}"#,
        )
        .unwrap();
        let envelope = envelope.ensure_success("x").unwrap();
        let user = envelope.user.unwrap();
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.email.unwrap().as_str(), "ali@example.com");
    }
}
