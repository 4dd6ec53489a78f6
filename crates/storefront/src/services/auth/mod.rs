//! Authentication service.
//!
//! Email and password authentication against the hosted auth provider. The
//! provider owns credentials and sessions; this service validates form input,
//! keeps the `users` profile table in step, and resolves the UI auth state.

mod error;
mod gate;

pub use error::AuthError;
pub use gate::AuthState;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use shopfront_core::{Email, MIN_PASSWORD_LENGTH, Role};

use crate::backend::Backend;
use crate::db::UserRepository;
use crate::models::{AccessToken, AuthUser, NewUserProfile, Session, UserMetadata};

/// Shown after a successful sign-in.
pub const SIGN_IN_SUCCESS: &str = "Login successful! Welcome back!";
/// Shown after a successful sign-up.
pub const SIGN_UP_SUCCESS: &str =
    "Account created successfully! Please check your email for verification.";
/// Shown after a successful sign-out.
pub const SIGN_OUT_SUCCESS: &str = "Logged out successfully!";

/// Sign-up form input.
#[derive(Debug)]
pub struct SignUpRequest {
    pub full_name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// What a successful sign-up produced.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    /// The new identity, when the provider returned one.
    pub user: Option<AuthUser>,
    /// Present only when the provider signs users in without email confirmation.
    pub session: Option<Session>,
    /// Whether the `users` profile row was written.
    pub profile_created: bool,
}

/// Authentication service.
pub struct AuthService<'a> {
    backend: &'a Backend,
    admin_email: Option<&'a Email>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a Backend, admin_email: Option<&'a Email>) -> Self {
        Self {
            backend,
            admin_email,
        }
    }

    fn users(&self) -> UserRepository<'a> {
        UserRepository::new(self.backend.store.as_ref())
    }

    /// Sign in with email and password.
    ///
    /// A successful sign-in refreshes the profile's `last_login`; failing to
    /// do so is logged and does not fail the sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email does not parse.
    /// Returns `AuthError::SignInRejected` if the provider refuses.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        let email = Email::parse(email)?;

        let session = self
            .backend
            .auth
            .sign_in_with_password(&email, password)
            .await
            .map_err(|e| {
                tracing::info!(error = %e, "Sign-in rejected");
                AuthError::SignInRejected(e)
            })?;

        if let Err(e) = self
            .users()
            .touch_last_login(&session.access_token, session.user.id, Utc::now())
            .await
        {
            tracing::warn!(error = %e, user_id = %session.user.id, "Failed to update last login");
        }

        tracing::info!(user_id = %session.user.id, "User signed in");
        Ok(session)
    }

    /// Register a new account.
    ///
    /// Password confirmation and length are checked before the provider is
    /// contacted. When the provider returns a user, a profile row is created;
    /// failing to do so is logged and does not fail the sign-up.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordMismatch` or `AuthError::PasswordTooShort`
    /// for local validation failures, `AuthError::InvalidEmail` if the email
    /// does not parse, and `AuthError::SignUpRejected` if the provider refuses.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError> {
        validate_new_password(&request.password, &request.confirm_password)?;
        let email = Email::parse(&request.email)?;

        let full_name = request.full_name.trim();
        let metadata = UserMetadata {
            full_name: (!full_name.is_empty()).then(|| full_name.to_string()),
        };

        let result = self
            .backend
            .auth
            .sign_up(&email, &request.password, &metadata)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Sign-up rejected");
                AuthError::SignUpRejected(e)
            })?;

        let mut profile_created = false;
        if let Some(user) = &result.user {
            let profile = NewUserProfile::for_sign_up(
                user.id,
                &user.email,
                metadata.full_name.as_deref(),
                self.admin_email,
                Utc::now(),
            );
            let token = result.session.as_ref().map(|s| &s.access_token);
            match self.users().create(token, &profile).await {
                Ok(_) => profile_created = true,
                Err(e) => {
                    tracing::warn!(error = %e, user_id = %user.id, "Auth account created but profile insert failed");
                }
            }
        }

        tracing::info!(
            confirmed = result.session.is_some(),
            profile_created,
            "User signed up"
        );
        Ok(SignUpOutcome {
            user: result.user,
            session: result.session,
            profile_created,
        })
    }

    /// End the provider session behind `token`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignOutFailed` if the provider reports an error.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        self.backend
            .auth
            .sign_out(token)
            .await
            .map_err(AuthError::SignOutFailed)
    }

    /// Resolve what the holder of `session` may see.
    ///
    /// Admin is granted for the configured admin address or a stored profile
    /// role of `admin`. A failed profile lookup falls back to the email check.
    pub async fn resolve_state(&self, session: Option<&Session>) -> AuthState {
        let Some(session) = session else {
            return AuthState::Unauthenticated;
        };

        let mut role = Role::for_email(&session.user.email, self.admin_email);
        if !role.is_admin() {
            match self
                .users()
                .get(&session.access_token, session.user.id)
                .await
            {
                Ok(Some(profile)) => role = profile.role,
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "Profile lookup failed; using email role"),
            }
        }

        AuthState::for_user(session.user.clone(), role)
    }
}

/// Check a new password against its confirmation and the minimum length.
///
/// # Errors
///
/// Returns `AuthError::PasswordMismatch` first, then `AuthError::PasswordTooShort`.
pub fn validate_new_password(
    password: &SecretString,
    confirm: &SecretString,
) -> Result<(), AuthError> {
    if password.expose_secret() != confirm.expose_secret() {
        return Err(AuthError::PasswordMismatch);
    }
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}
