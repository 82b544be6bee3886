//! Tabletop storefront library.
//!
//! Restaurant browsing, a persisted shopping cart, account sessions, and a
//! checkout flow that only places orders for payments the payment service
//! reports as succeeded.
//!
//! Front ends build a [`state::Storefront`] from configuration and drive
//! the services it hands out.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use error::{AppError, Result};
pub use state::Storefront;
