//! Tabletop CLI - browse restaurants, manage the cart, and check out.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! tabletop restaurants
//! tabletop menu 675a123456789012345678cd --category Burgers --search zinger
//!
//! # Cart
//! tabletop cart add 675b00000000000000000001 --quantity 2
//! tabletop cart set 675b00000000000000000001 0
//! tabletop cart show
//!
//! # Account
//! tabletop login -e ayesha@example.com -p secret1
//!
//! # Checkout: create the payment, pay in the card form, then place the order
//! tabletop checkout start
//! tabletop checkout complete
//! ```
//!
//! # Environment Variables
//!
//! - `TABLETOP_API_BASE_URL` - Backend base URL
//! - `TABLETOP_DATA_DIR` - Where the cart and session are kept
//! - `TABLETOP_CURRENCY` - Checkout currency
//! - `RUST_LOG` - Log filter (default `tabletop_storefront=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tabletop_storefront::models::ProductFilter;
use tabletop_storefront::{Storefront, config::StorefrontConfig};

mod commands;

#[derive(Parser)]
#[command(name = "tabletop")]
#[command(author, version, about = "Order food from Tabletop restaurants")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List restaurants
    Restaurants,
    /// Show a restaurant's menu
    Menu {
        /// Restaurant ID
        restaurant_id: String,

        /// Only show this category (`all` for every category)
        #[arg(short, long)]
        category: Option<String>,

        /// Only show items whose name or description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a single menu item
    Product {
        /// Product ID
        product_id: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Create an account
    Signup {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long, env = "TABLETOP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Password again
        #[arg(long, env = "TABLETOP_PASSWORD_CONFIRM", hide_env_values = true)]
        confirm_password: String,
    },
    /// Log in
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long, env = "TABLETOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out (the cart is kept)
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Pay for the cart and place the order
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a menu item
    Add {
        /// Product ID
        product_id: String,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Set a line's quantity (0 or less removes it)
    Set {
        /// Product ID
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Create a payment for the cart
    Start,
    /// Check whether the payment went through
    Confirm,
    /// Place the order for a confirmed payment
    Submit,
    /// Confirm the payment and place the order
    Complete,
    /// Show where the checkout stands
    Status,
    /// Abandon an unpaid checkout
    Cancel,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tabletop_storefront=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{}", e.user_message());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> tabletop_storefront::Result<()> {
    let config = StorefrontConfig::from_env()?;
    let storefront = Storefront::new(config)?;

    match cli.command {
        Commands::Restaurants => commands::catalog::restaurants(&storefront).await?,
        Commands::Menu {
            restaurant_id,
            category,
            search,
        } => {
            let filter = ProductFilter { category, search };
            commands::catalog::menu(&storefront, &restaurant_id, &filter).await?;
        }
        Commands::Product { product_id } => {
            commands::catalog::product(&storefront, &product_id).await?;
        }
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&storefront)?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&storefront, &product_id, quantity).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&storefront, &product_id)?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&storefront, &product_id, quantity)?,
            CartAction::Clear => commands::cart::clear(&storefront)?,
        },
        Commands::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            let form = tabletop_storefront::services::SignupForm {
                name,
                email,
                password,
                confirm_password,
            };
            commands::account::signup(&storefront, &form).await?;
        }
        Commands::Login { email, password } => {
            commands::account::login(&storefront, &email, &password).await?;
        }
        Commands::Logout => commands::account::logout(&storefront)?,
        Commands::Whoami => commands::account::whoami(&storefront)?,
        Commands::Checkout { action } => match action {
            CheckoutAction::Start => commands::checkout::start(&storefront).await?,
            CheckoutAction::Confirm => commands::checkout::confirm(&storefront).await?,
            CheckoutAction::Submit => commands::checkout::submit(&storefront).await?,
            CheckoutAction::Complete => commands::checkout::complete(&storefront).await?,
            CheckoutAction::Status => commands::checkout::status(&storefront)?,
            CheckoutAction::Cancel => commands::checkout::cancel(&storefront).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cart_set_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["tabletop", "cart", "set", "p1", "-1"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: Some(CartAction::Set { quantity: -1, .. })
            })
        ));
    }
}
