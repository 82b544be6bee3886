//! Integration tests for signup, login, and session persistence.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use tabletop_integration_tests::{MockBackend, USER_EMAIL, USER_ID, USER_PASSWORD, USER_TOKEN};
use tabletop_storefront::api::ApiError;
use tabletop_storefront::models::CartItem;
use tabletop_storefront::services::{AuthError, SignupForm};

fn form(email: &str) -> SignupForm {
    SignupForm {
        name: "Bilal".to_string(),
        email: email.to_string(),
        password: "hunter22".to_string(),
        confirm_password: "hunter22".to_string(),
    }
}

#[tokio::test]
async fn test_login_persists_session_across_restarts() {
    let backend = MockBackend::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    let storefront = backend.storefront(dir.path()).unwrap();
    let user = storefront
        .auth()
        .login(USER_EMAIL, USER_PASSWORD)
        .await
        .unwrap();
    assert_eq!(user.id.as_str(), USER_ID);
    assert_eq!(user.display_name(), "Ayesha");

    let restarted = backend.storefront(dir.path()).unwrap();
    let restored = restarted.auth().current_user().unwrap().unwrap();
    assert_eq!(restored.id.as_str(), USER_ID);
    assert_eq!(restored.token.expose(), USER_TOKEN);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let backend = MockBackend::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let storefront = backend.storefront(dir.path()).unwrap();

    let err = storefront
        .auth()
        .login(USER_EMAIL, "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        AuthError::Api(ApiError::Rejected { status: 401, message }) if message == "Invalid email or password"
    ));
    assert!(storefront.auth().current_user().unwrap().is_none());
}

#[tokio::test]
async fn test_signup_then_login() {
    let backend = MockBackend::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let storefront = backend.storefront(dir.path()).unwrap();

    storefront
        .auth()
        .signup(&form("bilal@example.com"))
        .await
        .unwrap();

    // Signup does not sign the user in.
    assert!(storefront.auth().current_user().unwrap().is_none());

    let user = storefront
        .auth()
        .login("bilal@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(user.display_name(), "Bilal");
}

#[tokio::test]
async fn test_duplicate_signup_surfaces_backend_error() {
    let backend = MockBackend::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let storefront = backend.storefront(dir.path()).unwrap();

    let err = storefront
        .auth()
        .signup(&form(USER_EMAIL))
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        AuthError::Api(ApiError::BadRequest(message)) if message == "User already exists"
    ));
}

#[tokio::test]
async fn test_invalid_signup_never_reaches_backend() {
    let backend = MockBackend::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let storefront = backend.storefront(dir.path()).unwrap();

    let mut bad = form("carol@example.com");
    bad.confirm_password = "different".to_string();
    let err = storefront.auth().signup(&bad).await.unwrap_err();
    assert!(matches!(err, AuthError::PasswordMismatch));

    // The account was not created.
    let err = storefront
        .auth()
        .login("carol@example.com", "hunter22")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Api(_)));
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let backend = MockBackend::start().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let storefront = backend.storefront(dir.path()).unwrap();

    storefront
        .auth()
        .login(USER_EMAIL, USER_PASSWORD)
        .await
        .unwrap();
    let mut cart = storefront.cart().unwrap();
    cart.add(CartItem::new("p2", "Garlic Naan", Decimal::new(80, 0)))
        .unwrap();

    storefront.auth().logout().unwrap();

    assert!(storefront.auth().current_user().unwrap().is_none());
    assert_eq!(storefront.cart().unwrap().item_count(), 1);
}
