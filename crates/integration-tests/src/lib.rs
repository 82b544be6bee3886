//! Integration tests for Tabletop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tabletop-integration-tests
//! ```
//!
//! Tests run the storefront against [`MockBackend`], an in-process `axum`
//! server that speaks the backend's REST API and records what it receives.
//! No external services are needed.
//!
//! # Test Categories
//!
//! - `catalog` - Restaurant and menu reads, error mapping
//! - `account` - Signup, login, session persistence
//! - `checkout` - Payment sequencing and order submission

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use tabletop_storefront::Storefront;
use tabletop_storefront::config::StorefrontConfig;

/// Seeded user's ID.
pub const USER_ID: &str = "675a123456789012345678ab";
/// Seeded user's email.
pub const USER_EMAIL: &str = "ayesha@example.com";
/// Seeded user's password.
pub const USER_PASSWORD: &str = "secret1";
/// Token issued to the seeded user.
pub const USER_TOKEN: &str = "jwt-ayesha";

/// Restaurant with a menu.
pub const GRILL_ID: &str = "r1";
/// Restaurant the backend has no menu for.
pub const CAFE_ID: &str = "r2";
/// Restaurant ID the backend rejects as malformed.
pub const MALFORMED_ID: &str = "bad-id";

// =============================================================================
// Recorded state
// =============================================================================

#[derive(Default)]
struct MockData {
    users: HashMap<String, (String, Value)>,
    intents: HashMap<String, String>,
    intent_requests: Vec<Value>,
    orders: Vec<Value>,
    order_auth: Vec<Option<String>>,
    fail_orders: bool,
    omit_order_ids: bool,
}

#[derive(Clone, Default)]
struct MockState(Arc<Mutex<MockData>>);

impl MockState {
    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// MockBackend
// =============================================================================

/// In-process stand-in for the storefront backend.
///
/// Stops when dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend on an ephemeral port with one seeded user.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = MockState::default();
        state.lock().users.insert(
            USER_EMAIL.to_string(),
            (
                USER_PASSWORD.to_string(),
                json!({"_id": USER_ID, "name": "Ayesha", "email": USER_EMAIL}),
            ),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(state.clone());

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    /// API base URL, e.g. `http://127.0.0.1:41234/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Storefront pointed at this backend, keeping local data in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storefront cannot be built.
    pub fn storefront(&self, data_dir: &Path) -> tabletop_storefront::Result<Storefront> {
        let config = StorefrontConfig::new(&self.base_url(), data_dir)?;
        Storefront::new(config)
    }

    /// Move a payment intent to `status`, as the card form would.
    pub fn set_intent_status(&self, payment_intent_id: &str, status: &str) {
        self.state
            .lock()
            .intents
            .insert(payment_intent_id.to_string(), status.to_string());
    }

    /// Make order submission fail with a 500 until turned off.
    pub fn fail_orders(&self, fail: bool) {
        self.state.lock().fail_orders = fail;
    }

    /// Accept orders without returning their ID.
    pub fn omit_order_ids(&self, omit: bool) {
        self.state.lock().omit_order_ids = omit;
    }

    /// Bodies of every create-payment-intent request, oldest first.
    #[must_use]
    pub fn intent_requests(&self) -> Vec<Value> {
        self.state.lock().intent_requests.clone()
    }

    /// Bodies of every recorded order, oldest first.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.state.lock().orders.clone()
    }

    /// `Authorization` headers sent with recorded orders.
    #[must_use]
    pub fn order_auth_headers(&self) -> Vec<Option<String>> {
        self.state.lock().order_auth.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(state: MockState) -> Router {
    Router::new()
        .route("/api/restaurants", get(restaurants))
        .route("/api/restaurants/{id}", get(restaurant))
        .route("/api/restaurants/{id}/products", get(restaurant_products))
        .route("/api/products", get(products))
        .route("/api/products/{id}", get(product))
        .route("/api/login", post(login))
        .route("/api/signup", post(signup))
        .route("/api/stripe/config", get(stripe_config))
        .route("/api/stripe/create-payment-intent", post(create_payment_intent))
        .route("/api/stripe/payment-status/{id}", get(payment_status))
        .route("/api/orders", post(create_order))
        .with_state(state)
}

fn restaurant_fixtures() -> Vec<Value> {
    vec![
        json!({"_id": GRILL_ID, "title": "Karachi Grill", "description": "BBQ and karahi"}),
        json!({"_id": CAFE_ID, "title": "Chai Dhaba"}),
    ]
}

fn product_fixtures() -> Vec<Value> {
    vec![
        json!({"_id": "p1", "name": "Chicken Karahi", "price": 1200, "category": "Curries",
               "description": "Tomato and green chilli", "restaurantId": GRILL_ID}),
        json!({"_id": "p2", "name": "Garlic Naan", "price": "80", "category": "Breads",
               "restaurantId": GRILL_ID}),
        json!({"_id": "p3", "name": "Mint Raita", "price": 50, "category": "Sides",
               "description": "Yoghurt with fresh mint", "restaurantId": GRILL_ID}),
    ]
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

fn field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

async fn restaurants() -> Json<Vec<Value>> {
    Json(restaurant_fixtures())
}

async fn restaurant(UrlPath(id): UrlPath<String>) -> Response {
    if id == MALFORMED_ID {
        return error(StatusCode::BAD_REQUEST, "Invalid restaurant ID");
    }
    restaurant_fixtures()
        .into_iter()
        .find(|r| r["_id"] == id.as_str())
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Restaurant not found"),
            |r| Json(r).into_response(),
        )
}

async fn restaurant_products(UrlPath(id): UrlPath<String>) -> Response {
    let menu: Vec<Value> = product_fixtures()
        .into_iter()
        .filter(|p| p["restaurantId"] == id.as_str())
        .collect();
    if menu.is_empty() {
        return error(StatusCode::NOT_FOUND, "No products for restaurant");
    }
    Json(menu).into_response()
}

async fn products() -> Json<Vec<Value>> {
    Json(product_fixtures())
}

async fn product(UrlPath(id): UrlPath<String>) -> Json<Value> {
    // Unknown IDs get an empty object rather than a 404.
    Json(
        product_fixtures()
            .into_iter()
            .find(|p| p["_id"] == id.as_str())
            .unwrap_or_else(|| json!({})),
    )
}

async fn login(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    let data = state.lock();
    match data.users.get(field(&body, "email")) {
        Some((password, user)) if password == field(&body, "password") => Json(json!({
            "success": true,
            "token": USER_TOKEN,
            "user": user,
        }))
        .into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn signup(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    let email = field(&body, "email").to_string();
    let mut data = state.lock();
    if data.users.contains_key(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "User already exists"})),
        )
            .into_response();
    }
    let user = json!({
        "_id": format!("user-{}", data.users.len() + 1),
        "name": field(&body, "name"),
        "email": email,
    });
    data.users
        .insert(email, (field(&body, "password").to_string(), user));
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "User created"})),
    )
        .into_response()
}

async fn stripe_config() -> Json<Value> {
    Json(json!({"publishableKey": "pk_test_mock"}))
}

async fn create_payment_intent(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    let amount = body.get("amount").and_then(Value::as_f64).unwrap_or_default();
    if amount < 185.0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Minimum payment amount is PKR 185"})),
        )
            .into_response();
    }

    let mut data = state.lock();
    data.intent_requests.push(body);
    let id = format!("pi_mock{}", data.intent_requests.len());
    data.intents
        .insert(id.clone(), "requires_payment_method".to_string());

    // Only the client secret; the client derives the intent ID from it.
    Json(json!({"clientSecret": format!("{id}_secret_abc")})).into_response()
}

async fn payment_status(State(state): State<MockState>, UrlPath(id): UrlPath<String>) -> Response {
    let data = state.lock();
    data.intents.get(&id).map_or_else(
        || error(StatusCode::NOT_FOUND, "Payment intent not found"),
        |status| Json(json!({"id": id, "status": status})).into_response(),
    )
}

async fn create_order(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = state.lock();
    if data.fail_orders {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create order");
    }

    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    data.order_auth.push(auth);
    data.orders.push(body.clone());

    if data.omit_order_ids {
        return (StatusCode::CREATED, Json(json!({"success": true}))).into_response();
    }

    let id = format!("order_{}", data.orders.len());
    let mut record = body;
    record["_id"] = Value::String(id);
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "data": record})),
    )
        .into_response()
}
