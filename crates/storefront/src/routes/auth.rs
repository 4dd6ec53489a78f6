//! Authentication route handlers.
//!
//! The forms live in the home page's auth dialogs and post here via HTMX.
//! Every outcome is answered with a message fragment; successful actions also
//! send `HX-Refresh` so the page re-renders with the new auth state.

use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalToken, clear_access_token, set_access_token};
use crate::routes::MessageTemplate;
use crate::services::auth::{
    AuthError, AuthService, SIGN_IN_SUCCESS, SIGN_OUT_SUCCESS, SIGN_UP_SUCCESS, SignUpRequest,
};
use crate::state::AppState;

/// Sign-in form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl From<SignUpForm> for SignUpRequest {
    fn from(form: SignUpForm) -> Self {
        Self {
            full_name: form.name,
            email: form.email,
            password: SecretString::from(form.password),
            confirm_password: SecretString::from(form.confirm_password),
        }
    }
}

fn refresh(message: &str) -> Response {
    (
        AppendHeaders([("HX-Refresh", "true")]),
        MessageTemplate::success(message),
    )
        .into_response()
}

fn failure(error: &AuthError) -> Response {
    MessageTemplate::error(error.user_message()).into_response()
}

/// Handle sign-in form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let Some(backend) = state.backend() else {
        return Ok(failure(&AuthError::Unavailable));
    };

    let auth = AuthService::new(backend, state.admin_email());
    let password = SecretString::from(form.password);
    match auth.sign_in(&form.email, &password).await {
        Ok(signed_in) => {
            set_access_token(&session, &signed_in.access_token).await?;
            set_sentry_user(&signed_in.user.id, Some(signed_in.user.email.as_str()));
            add_breadcrumb("auth", "Signed in", None);
            Ok(refresh(SIGN_IN_SUCCESS))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-in failed");
            Ok(failure(&e))
        }
    }
}

/// Handle sign-up form submission.
///
/// When the provider signs the new user straight in, the session is stored
/// and the page refreshes; otherwise the user is told to confirm their email.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Result<Response, AppError> {
    let Some(backend) = state.backend() else {
        return Ok(failure(&AuthError::Unavailable));
    };

    let auth = AuthService::new(backend, state.admin_email());
    match auth.sign_up(&form.into()).await {
        Ok(outcome) => {
            add_breadcrumb("auth", "Signed up", None);
            if let Some(signed_in) = outcome.session {
                set_access_token(&session, &signed_in.access_token).await?;
                set_sentry_user(&signed_in.user.id, Some(signed_in.user.email.as_str()));
                return Ok(refresh(SIGN_UP_SUCCESS));
            }
            Ok(MessageTemplate::success(SIGN_UP_SUCCESS).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            Ok(failure(&e))
        }
    }
}

/// Handle sign-out.
///
/// The stored token is kept if the provider refuses the sign-out.
#[instrument(skip(state, session, token))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalToken(token): OptionalToken,
) -> Result<Response, AppError> {
    let Some(backend) = state.backend() else {
        return Ok(failure(&AuthError::Unavailable));
    };

    if let Some(token) = token {
        let auth = AuthService::new(backend, state.admin_email());
        if let Err(e) = auth.sign_out(&token).await {
            tracing::warn!(error = %e, "Sign-out failed");
            return Ok(failure(&e));
        }
    }

    clear_access_token(&session).await?;
    clear_sentry_user();
    add_breadcrumb("auth", "Signed out", None);
    Ok(refresh(SIGN_OUT_SUCCESS))
}
