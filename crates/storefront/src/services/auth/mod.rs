//! Authentication service.
//!
//! Accounts live on the backend; this service validates forms before
//! sending them and keeps the signed-in user in the local store.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use tracing::instrument;

use tabletop_core::Email;

use crate::api::ApiClient;
use crate::models::{AuthToken, CurrentUser};
use crate::storage::{self, LocalStore, keys};

/// Minimum password length the backend accepts.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Signup form as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Check the form the way the backend will, returning the parsed email.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: blank fields, then email format,
    /// then password length, then confirmation mismatch.
    pub fn validate(&self) -> Result<Email, AuthError> {
        let fields = [
            &self.name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(AuthError::MissingFields);
        }

        let email = Email::parse(&self.email).map_err(AuthError::InvalidEmail)?;

        validate_password(&self.password)?;

        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        Ok(email)
    }
}

/// Authentication service.
///
/// Handles signup, login, logout, and restoring the signed-in user.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    store: Arc<dyn LocalStore>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn LocalStore>) -> Self {
        Self { api, store }
    }

    /// Validate and submit a signup form. Does not sign the user in.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request is made, or
    /// `AuthError::Api` if the backend refuses the account.
    #[instrument(skip(self, form))]
    pub async fn signup(&self, form: &SignupForm) -> Result<(), AuthError> {
        let email = form.validate()?;
        self.api.signup(&form.name, &email, &form.password).await?;
        Ok(())
    }

    /// Log in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank,
    /// `AuthError::Api` if the backend refuses the credentials, or
    /// `AuthError::Storage` if the session cannot be saved.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let email = Email::parse(email).map_err(AuthError::InvalidEmail)?;

        let success = self.api.login(&email, password).await?;
        let user = success.user;

        storage::save_json(self.store.as_ref(), keys::CURRENT_USER, &user)?;
        storage::save_json(self.store.as_ref(), keys::TOKEN, &user.token)?;

        tracing::info!(user_id = %user.id, "Session saved");
        Ok(user)
    }

    /// Forget the signed-in user. The cart is left alone.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session cannot be removed.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(keys::CURRENT_USER)?;
        self.store.remove(keys::TOKEN)?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// The signed-in user, if any.
    ///
    /// The separately stored token wins over the one embedded in the user
    /// record, so a refreshed token is picked up.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store cannot be read.
    pub fn current_user(&self) -> Result<Option<CurrentUser>, AuthError> {
        let Some(mut user) =
            storage::load_json::<CurrentUser>(self.store.as_ref(), keys::CURRENT_USER)?
        else {
            return Ok(None);
        };
        if let Some(token) = storage::load_json::<AuthToken>(self.store.as_ref(), keys::TOKEN)? {
            user.token = token;
        }
        Ok(Some(user))
    }
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tabletop_core::UserId;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStore;

    fn form() -> SignupForm {
        SignupForm {
            name: "Ayesha".to_string(),
            email: "ayesha@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    fn service(store: &MemoryStore) -> AuthService {
        let config = StorefrontConfig::new("http://localhost:3000/api", "/tmp").unwrap();
        let api = ApiClient::new(&config).unwrap();
        AuthService::new(api, Arc::new(store.clone()))
    }

    #[test]
    fn test_signup_form_valid() {
        let email = form().validate().unwrap();
        assert_eq!(email.as_str(), "ayesha@example.com");
    }

    #[test]
    fn test_signup_form_missing_field() {
        let mut f = form();
        f.confirm_password.clear();
        let err = f.validate().unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
        assert_eq!(err.to_string(), "Please fill in all fields.");
    }

    #[test]
    fn test_signup_form_invalid_email() {
        let mut f = form();
        f.email = "ayesha@example".to_string();
        assert!(matches!(f.validate(), Err(AuthError::InvalidEmail(_))));
    }

    #[test]
    fn test_signup_form_short_password() {
        let mut f = form();
        f.password = "abc12".to_string();
        f.confirm_password = "abc12".to_string();
        let err = f.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must be at least 6 characters long."
        );
    }

    #[test]
    fn test_signup_form_mismatch() {
        let mut f = form();
        f.confirm_password = "secret2".to_string();
        assert!(matches!(f.validate(), Err(AuthError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let store = MemoryStore::new();
        let err = service(&store).login("", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
    }

    #[test]
    fn test_current_user_and_logout() {
        let store = MemoryStore::new();
        let auth = service(&store);
        assert!(auth.current_user().unwrap().is_none());

        let user = CurrentUser {
            id: UserId::new("u1"),
            name: "Ayesha".to_string(),
            email: Email::parse("ayesha@example.com").unwrap(),
            token: AuthToken::new("old"),
        };
        storage::save_json(&store, keys::CURRENT_USER, &user).unwrap();
        storage::save_json(&store, keys::TOKEN, &AuthToken::new("fresh")).unwrap();

        let restored = auth.current_user().unwrap().unwrap();
        assert_eq!(restored.id.as_str(), "u1");
        assert_eq!(restored.token.expose(), "fresh");

        auth.logout().unwrap();
        assert!(auth.current_user().unwrap().is_none());
        assert!(!store.contains(keys::TOKEN));
    }
}
