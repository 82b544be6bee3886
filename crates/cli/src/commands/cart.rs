//! Cart management.

use tabletop_core::ProductId;
use tabletop_storefront::Storefront;
use tabletop_storefront::models::QuantityChange;

use super::money;

/// Print cart lines and totals.
#[allow(clippy::print_stdout)]
pub fn show(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    let cart = storefront.cart()?;

    if cart.is_empty() {
        println!("Your cart is empty.");
        return Ok(());
    }

    for line in cart.lines() {
        println!(
            "{}  {:<32} {} x{} = {}",
            line.id(),
            line.item.name,
            money(storefront, line.item.price),
            line.quantity,
            money(storefront, line.line_total())
        );
    }
    println!();
    println!("Items: {}", cart.item_count());
    println!("Total: {}", money(storefront, cart.total()));
    Ok(())
}

/// Look up a menu item and add it to the cart.
#[allow(clippy::print_stdout)]
pub async fn add(
    storefront: &Storefront,
    product_id: &str,
    quantity: u32,
) -> tabletop_storefront::Result<()> {
    let product = storefront.api().product(&ProductId::new(product_id)).await?;
    let mut cart = storefront.cart()?;
    cart.add_product(&product, quantity)?;

    println!("Added {quantity} x {} to your cart.", product.name);
    println!(
        "Cart: {} items, {}",
        cart.item_count(),
        money(storefront, cart.total())
    );
    Ok(())
}

/// Remove a line.
#[allow(clippy::print_stdout)]
pub fn remove(storefront: &Storefront, product_id: &str) -> tabletop_storefront::Result<()> {
    let mut cart = storefront.cart()?;
    if cart.remove(&ProductId::new(product_id))? {
        println!("Removed {product_id} from your cart.");
    } else {
        println!("{product_id} is not in your cart.");
    }
    Ok(())
}

/// Set a line's quantity.
#[allow(clippy::print_stdout)]
pub fn set(
    storefront: &Storefront,
    product_id: &str,
    quantity: i64,
) -> tabletop_storefront::Result<()> {
    let mut cart = storefront.cart()?;
    match cart.update_quantity(&ProductId::new(product_id), quantity)? {
        QuantityChange::Updated => println!("Set {product_id} to {quantity}."),
        QuantityChange::Removed => println!("Removed {product_id} from your cart."),
        QuantityChange::Missing => println!("{product_id} is not in your cart."),
    }
    Ok(())
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub fn clear(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    storefront.cart()?.clear()?;
    println!("Cart cleared.");
    Ok(())
}
