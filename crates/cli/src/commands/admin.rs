//! Admin panel commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront admin users -e owner@example.com -p secret1
//! shopfront admin deactivate 0b5d2f3e-8f0a-4c55-9d1a-3a7c2b1e9f00 -e owner@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` / `SUPABASE_ANON_KEY` - Backend connection
//! - `STOREFRONT_ADMIN_EMAIL` - Address treated as admin regardless of profile role

use secrecy::SecretString;

use shopfront_core::UserId;
use shopfront_storefront::backend::Backend;
use shopfront_storefront::models::Session;
use shopfront_storefront::services::admin::{AdminService, UserListing};
use shopfront_storefront::services::auth::AuthService;
use shopfront_storefront::state::AppState;

use super::{CommandError, load_state, sign_in};

/// Sign in as an admin and list every user profile, newest first.
///
/// # Errors
///
/// Returns an error if sign-in fails, the account is not an admin, or the
/// profiles cannot be read.
pub async fn users(email: &str, password: SecretString) -> Result<(), CommandError> {
    let state = load_state()?;
    let (backend, session) = admin_session(&state, email, &password).await?;

    let listing = AdminService::new(backend)
        .users(&session.access_token)
        .await;
    if let Some(notice) = listing.notice() {
        tracing::info!("{notice}");
    }
    if let UserListing::Users(rows) = listing {
        for row in &rows {
            tracing::info!(
                "{} <{}> role={} created={} last_login={} active={}",
                row.full_name,
                row.email,
                row.role,
                row.created,
                row.last_login,
                row.active
            );
        }
        tracing::info!("{} users", rows.len());
    }

    Ok(())
}

/// Sign in as an admin and set a profile's active flag.
///
/// # Errors
///
/// Returns an error if sign-in fails, the account is not an admin, or no
/// profile has that id.
pub async fn set_active(
    email: &str,
    password: SecretString,
    user_id: UserId,
    active: bool,
) -> Result<(), CommandError> {
    let state = load_state()?;
    let (backend, session) = admin_session(&state, email, &password).await?;

    let profile = AdminService::new(backend)
        .set_active(&session.access_token, user_id, active)
        .await?;
    tracing::info!("{} <{}> active={}", profile.full_name, profile.email, active);
    Ok(())
}

/// Sign in as an admin and delete a profile row.
///
/// # Errors
///
/// Returns an error if sign-in fails, the account is not an admin, or no
/// profile has that id.
pub async fn delete_user(
    email: &str,
    password: SecretString,
    user_id: UserId,
) -> Result<(), CommandError> {
    let state = load_state()?;
    let (backend, session) = admin_session(&state, email, &password).await?;

    AdminService::new(backend)
        .delete_user(&session.access_token, user_id)
        .await?;
    tracing::info!("Deleted profile {user_id}");
    Ok(())
}

/// Sign in and require the account to be an admin.
async fn admin_session<'a>(
    state: &'a AppState,
    email: &str,
    password: &SecretString,
) -> Result<(&'a Backend, Session), CommandError> {
    let session = sign_in(state, email, password).await?;

    let Some(backend) = state.backend() else {
        return Err(CommandError::BackendUnavailable(String::new()));
    };

    let auth = AuthService::new(backend, state.admin_email())
        .resolve_state(Some(&session))
        .await;
    if !auth.is_admin() {
        return Err(CommandError::NotAdmin(session.user.email.to_string()));
    }
    Ok((backend, session))
}
