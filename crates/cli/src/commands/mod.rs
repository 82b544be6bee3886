//! Subcommand implementations. Output goes to stdout; logs go to stderr.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;

use rust_decimal::Decimal;

use tabletop_core::Price;
use tabletop_storefront::Storefront;

/// Format `amount` in the storefront's checkout currency.
fn money(storefront: &Storefront, amount: Decimal) -> Price {
    Price::new(amount, storefront.config().currency)
}
