//! Authentication error types.

use thiserror::Error;

use shopfront_core::{EmailError, MIN_PASSWORD_LENGTH};

use crate::backend::BackendError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable backend is configured.
    #[error("authentication service not available")]
    Unavailable,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Sign-up password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Sign-up password is shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("password too short")]
    PasswordTooShort,

    /// The provider refused the credentials.
    #[error("sign-in rejected: {0}")]
    SignInRejected(#[source] BackendError),

    /// The provider refused the registration.
    #[error("sign-up rejected: {0}")]
    SignUpRejected(#[source] BackendError),

    /// The provider failed to end the session.
    #[error("sign-out failed: {0}")]
    SignOutFailed(#[source] BackendError),
}

impl AuthError {
    /// The message shown to the user for this error.
    ///
    /// Sign-in errors show the provider's message unchanged. Sign-up errors
    /// are matched against known provider phrases (case-insensitively) and
    /// fall back to the provider's message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unavailable => {
                "Authentication service not available. Please check your configuration."
                    .to_string()
            }
            Self::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
            Self::PasswordMismatch => "Passwords do not match!".to_string(),
            Self::PasswordTooShort => {
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long!")
            }
            Self::SignInRejected(err) => err.message(),
            Self::SignUpRejected(err) => sign_up_message(err),
            Self::SignOutFailed(err) => format!("Error logging out: {}", err.message()),
        }
    }

    /// Whether the failure was the backend's fault rather than the user's.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Unavailable => true,
            Self::SignInRejected(err) | Self::SignUpRejected(err) | Self::SignOutFailed(err) => {
                err.is_connection() || matches!(err, BackendError::Api { status, .. } if *status >= 500)
            }
            _ => false,
        }
    }
}

fn sign_up_message(err: &BackendError) -> String {
    let message = err.message();
    let lower = message.to_lowercase();

    if lower.contains("already registered") {
        "This email is already registered. Please try logging in instead.".to_string()
    } else if lower.contains("invalid email") {
        "Please enter a valid email address.".to_string()
    } else if lower.contains("weak password") {
        "Password is too weak. Please choose a stronger password.".to_string()
    } else if err.is_connection() || lower.contains("connection failed") {
        "Unable to connect to authentication service. Please check your internet connection and try again."
            .to_string()
    } else if lower.contains("not configured") {
        "Authentication service not properly configured. Please contact support.".to_string()
    } else {
        message
    }
}
