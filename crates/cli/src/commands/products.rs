//! Product catalog commands.

use super::{CommandError, load_state};

/// List every product from the configured catalog source.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub async fn list() -> Result<(), CommandError> {
    let state = load_state()?;
    let products = state.catalog().products().await?;

    if products.is_empty() {
        tracing::info!("No products found");
        return Ok(());
    }

    for product in products.iter() {
        let sale = product
            .sale_percent()
            .map(|percent| format!(" (-{percent}%)"))
            .unwrap_or_default();
        tracing::info!("#{} {} {}{}", product.id, product.name, product.price, sale);
    }
    tracing::info!("{} products", products.len());

    Ok(())
}
