//! Cart inspection commands.

use secrecy::SecretString;

use shopfront_storefront::services::cart::{CartController, CartFetch, CartView};

use super::{CommandError, load_state, sign_in};

/// Sign in and list that account's cart, most recent first.
///
/// # Errors
///
/// Returns an error if sign-in fails or the cart cannot be read.
pub async fn list(email: &str, password: SecretString) -> Result<(), CommandError> {
    let state = load_state()?;
    let session = sign_in(&state, email, &password).await?;

    let Some(backend) = state.backend() else {
        return Err(CommandError::BackendUnavailable(String::new()));
    };

    let items = match CartController::new(backend)
        .get_cart_items(Some(&session))
        .await
    {
        CartFetch::Items(items) => items,
        CartFetch::Unavailable(e) => return Err(e.into()),
        CartFetch::Unauthenticated => Vec::new(),
    };

    let view = CartView::build(&items, true);
    if view.is_empty() {
        tracing::info!("Your cart is empty");
        return Ok(());
    }

    for line in &view.lines {
        tracing::info!(
            "{} {} x {} = {} [{}]",
            line.name,
            line.price,
            line.quantity,
            line.line_total,
            line.id
        );
    }
    tracing::info!("{} items, subtotal {}", view.count, view.subtotal);

    Ok(())
}
