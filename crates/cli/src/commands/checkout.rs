//! Checkout commands.
//!
//! Each step is a separate invocation; progress is kept in the data
//! directory between them.

use tabletop_storefront::Storefront;
use tabletop_storefront::models::{CurrentUser, OrderConfirmation};
use tabletop_storefront::services::{CheckoutError, CheckoutPhase};

use super::money;

/// Create (or reuse) a payment intent for the cart.
#[allow(clippy::print_stdout)]
pub async fn start(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    let user = storefront.auth().current_user()?;
    let cart = storefront.cart()?;
    let pending = storefront
        .checkout()
        .begin(user.as_ref(), cart.cart())
        .await?;
    let publishable_key = storefront.api().publishable_key().await?;

    println!("Payment created for {}.", money(storefront, pending.amount));
    println!("Reference:       {}", pending.reference);
    println!("Payment intent:  {}", pending.intent.id);
    println!("Client secret:   {}", pending.intent.client_secret);
    println!("Publishable key: {publishable_key}");
    println!();
    println!("Pay with the card form, then run `tabletop checkout complete`.");
    Ok(())
}

/// Check whether the payment went through.
#[allow(clippy::print_stdout)]
pub async fn confirm(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    let payment_intent_id = storefront.checkout().confirm().await?;
    println!("Payment {payment_intent_id} confirmed.");
    println!("Run `tabletop checkout submit` to place the order.");
    Ok(())
}

/// Place the order for a confirmed payment.
pub async fn submit(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    let user = signed_in(storefront)?;
    let mut cart = storefront.cart()?;
    let confirmation = storefront
        .checkout()
        .submit_order(&user, &mut cart)
        .await?;
    print_confirmation(storefront, &confirmation);
    Ok(())
}

/// Confirm the payment and place the order.
pub async fn complete(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    let user = signed_in(storefront)?;
    let mut cart = storefront.cart()?;
    let confirmation = storefront.checkout().complete(&user, &mut cart).await?;
    print_confirmation(storefront, &confirmation);
    Ok(())
}

/// Show where the checkout stands.
#[allow(clippy::print_stdout)]
pub fn status(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    match storefront.checkout().phase()? {
        CheckoutPhase::Idle => println!("No checkout in progress."),
        CheckoutPhase::AwaitingPayment(pending) => {
            println!(
                "Awaiting payment of {} (intent {}, reference {}).",
                money(storefront, pending.amount),
                pending.intent.id,
                pending.reference
            );
        }
        CheckoutPhase::Confirmed {
            payment_intent_id,
            amount,
            ..
        } => {
            println!(
                "Payment {payment_intent_id} of {} confirmed; order not placed yet.",
                money(storefront, amount)
            );
        }
    }
    Ok(())
}

/// Abandon the checkout.
#[allow(clippy::print_stdout)]
pub async fn cancel(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    storefront.checkout().cancel().await?;
    println!("Checkout cancelled.");
    Ok(())
}

fn signed_in(storefront: &Storefront) -> tabletop_storefront::Result<CurrentUser> {
    Ok(storefront
        .auth()
        .current_user()?
        .ok_or(CheckoutError::NotLoggedIn)?)
}

#[allow(clippy::print_stdout)]
fn print_confirmation(storefront: &Storefront, confirmation: &OrderConfirmation) {
    println!("Order placed!");
    match &confirmation.order_id {
        Some(order_id) => println!("Order ID: {order_id}"),
        None => println!("Order ID: not returned by the server"),
    }
    println!("Payment:  {}", confirmation.payment_intent_id);
    for line in &confirmation.items {
        println!("  {} x{}", line.item.name, line.quantity);
    }
    println!("Total:    {}", money(storefront, confirmation.total));
}
