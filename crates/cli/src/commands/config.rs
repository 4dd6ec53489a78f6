//! Configuration check command.

use shopfront_storefront::config::StorefrontConfig;

use super::CommandError;

/// Validate the environment configuration and report what was found.
///
/// A bad backend configuration is reported but is not an error: the server
/// starts in degraded mode in that case.
///
/// # Errors
///
/// Returns an error if the server settings themselves are invalid.
pub fn check() -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Listen address: {}", config.socket_addr());
    tracing::info!("Base URL: {}", config.base_url);

    match &config.backend {
        Ok(backend) => {
            tracing::info!(
                url = %backend.url,
                timeout_secs = backend.timeout.as_secs(),
                "Backend configured"
            );
        }
        Err(issue) => {
            tracing::warn!("Backend not configured: {}", issue.0);
            tracing::warn!("The storefront will start with auth and cart disabled");
        }
    }

    match &config.admin_email {
        Some(email) => tracing::info!("Admin email: {email}"),
        None => tracing::info!("No admin email set; admin access comes from profile roles only"),
    }

    match &config.products.file {
        Some(path) => tracing::info!("Products file: {}", path.display()),
        None => tracing::info!("Products read from the products table"),
    }
    tracing::info!("Product cache TTL: {}s", config.products.cache_ttl.as_secs());

    if config.sentry_dsn.is_some() {
        tracing::info!("Sentry enabled");
    }

    Ok(())
}
