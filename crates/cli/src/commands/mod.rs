//! CLI command implementations.

pub mod admin;
pub mod cart;
pub mod config;
pub mod products;

use secrecy::SecretString;
use thiserror::Error;

use shopfront_storefront::config::{ConfigError, StorefrontConfig};
use shopfront_storefront::db::RepositoryError;
use shopfront_storefront::models::Session;
use shopfront_storefront::services::auth::{AuthError, AuthService};
use shopfront_storefront::services::catalog::CatalogError;
use shopfront_storefront::state::AppState;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The backend is not configured.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Signing in failed.
    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),

    /// The catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A data store read failed.
    #[error("Data store error: {0}")]
    Repository(#[from] RepositoryError),

    /// The account is not an admin.
    #[error("{0} is not an admin")]
    NotAdmin(String),
}

/// Load configuration and build the same state the server uses.
fn load_state() -> Result<AppState, CommandError> {
    let config = StorefrontConfig::from_env()?;
    Ok(AppState::new(config))
}

/// Sign in with the given credentials.
async fn sign_in(
    state: &AppState,
    email: &str,
    password: &SecretString,
) -> Result<Session, CommandError> {
    let backend = state.backend().ok_or_else(|| {
        CommandError::BackendUnavailable(state.config_error().unwrap_or_default().to_string())
    })?;
    let session = AuthService::new(backend, state.admin_email())
        .sign_in(email, password)
        .await?;
    tracing::info!(user_id = %session.user.id, "Signed in as {}", session.user.email);
    Ok(session)
}
