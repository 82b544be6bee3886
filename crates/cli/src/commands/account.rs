//! Signup, login, and logout.

use tabletop_storefront::Storefront;
use tabletop_storefront::services::SignupForm;

/// Create an account.
#[allow(clippy::print_stdout)]
pub async fn signup(storefront: &Storefront, form: &SignupForm) -> tabletop_storefront::Result<()> {
    storefront.auth().signup(form).await?;
    println!("Account created successfully! Please log in.");
    Ok(())
}

/// Log in and remember the session.
#[allow(clippy::print_stdout)]
pub async fn login(
    storefront: &Storefront,
    email: &str,
    password: &str,
) -> tabletop_storefront::Result<()> {
    let user = storefront.auth().login(email, password).await?;
    println!("Welcome back, {}!", user.display_name());
    Ok(())
}

/// Forget the session.
#[allow(clippy::print_stdout)]
pub fn logout(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    storefront.auth().logout()?;
    println!("Logged out.");
    Ok(())
}

/// Show the signed-in user.
#[allow(clippy::print_stdout)]
pub fn whoami(storefront: &Storefront) -> tabletop_storefront::Result<()> {
    match storefront.auth().current_user()? {
        Some(user) => println!("{} <{}>", user.display_name(), user.email),
        None => println!("Not logged in."),
    }
    Ok(())
}
