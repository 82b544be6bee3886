//! Restaurant and menu browsing.

use tabletop_core::{ProductId, RestaurantId};
use tabletop_storefront::Storefront;
use tabletop_storefront::models::{Product, ProductFilter, categories};

use super::money;

/// List every restaurant.
#[allow(clippy::print_stdout)]
pub async fn restaurants(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    let restaurants = storefront.api().restaurants().await?;

    if restaurants.is_empty() {
        println!("No restaurants found.");
        return Ok(());
    }

    for restaurant in &restaurants {
        println!("{}  {}", restaurant.id, restaurant.title);
        if let Some(description) = restaurant.description.as_deref() {
            println!("    {description}");
        }
    }
    Ok(())
}

/// Show a restaurant and its (filtered) menu.
#[allow(clippy::print_stdout)]
pub async fn menu(
    storefront: &Storefront,
    restaurant_id: &str,
    filter: &ProductFilter,
) -> tabletop_storefront::Result<()> {
    let id = RestaurantId::new(restaurant_id);
    let api = storefront.api();
    let (restaurant, products) =
        tokio::try_join!(api.restaurant(&id), api.restaurant_products(&id))?;

    println!("{}", restaurant.title);
    if let Some(description) = restaurant.description.as_deref() {
        println!("{description}");
    }

    let categories = categories(&products);
    if !categories.is_empty() {
        println!("Categories: all, {}", categories.join(", "));
    }
    println!();

    let shown = filter.apply(&products);
    if shown.is_empty() {
        println!("No menu items match.");
        return Ok(());
    }
    for product in shown {
        print_product_line(storefront, product);
    }
    Ok(())
}

/// Show a single menu item.
#[allow(clippy::print_stdout)]
pub async fn product(storefront: &Storefront, product_id: &str) -> tabletop_storefront::Result<()> {
    let product = storefront.api().product(&ProductId::new(product_id)).await?;

    println!("{}", product.name);
    println!("Price: {}", money(storefront, product.price));
    if let Some(category) = product.category.as_deref() {
        println!("Category: {category}");
    }
    if let Some(description) = product.description.as_deref() {
        println!("{description}");
    }
    println!("ID: {}", product.id);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_product_line(storefront: &Storefront, product: &Product) {
    println!(
        "{}  {:<32} {}",
        product.id,
        product.name,
        money(storefront, product.price)
    );
}
