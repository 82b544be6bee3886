//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart state, mirrored to the local store
//! - `auth` - Signup, login, and the persisted session
//! - `checkout` - Payment intent, confirmation, and order submission

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::{AuthError, AuthService, SignupForm};
pub use cart::CartService;
pub use checkout::{CheckoutError, CheckoutPhase, CheckoutService, PendingPayment};
