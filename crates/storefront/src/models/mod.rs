//! Domain types shared by the services.

pub mod cart;
pub mod catalog;
pub mod lenient;
pub mod order;
pub mod user;

pub use cart::{Cart, CartItem, CartLine, QuantityChange};
pub use catalog::{Product, ProductFilter, Restaurant, categories};
pub use order::{NewOrder, OrderConfirmation, OrderLine};
pub use user::{AuthToken, CurrentUser};
