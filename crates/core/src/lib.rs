//! Tabletop Core - Shared types library.
//!
//! This crate provides common types used across all Tabletop components:
//! - `storefront` - Cart, account, and checkout logic plus the backend API client
//! - `cli` - Command-line ordering client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no local
//! storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for backend IDs, prices, emails, and payment statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
