//! Access-token extractor and session helpers.
//!
//! The browser session stores only the backend access token. Handlers must
//! not treat its presence as proof of identity; the cart controller and auth
//! service re-validate it with the auth provider.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::models::{AccessToken, session_keys};

/// Extractor that optionally gets the stored access token.
///
/// Never rejects the request; a missing session layer or token yields `None`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalToken(token): OptionalToken) -> impl IntoResponse {
///     let session = cart.get_session(token.as_ref()).await;
/// }
/// ```
pub struct OptionalToken(pub Option<AccessToken>);

impl<S> FromRequestParts<S> for OptionalToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<AccessToken>(session_keys::ACCESS_TOKEN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(token))
    }
}

/// Store the access token after a successful sign-in.
///
/// The session id is cycled first so a pre-login session id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_access_token(
    session: &Session,
    token: &AccessToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::ACCESS_TOKEN, token).await
}

/// Remove the access token (sign-out or rejected token).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_access_token(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<AccessToken>(session_keys::ACCESS_TOKEN)
        .await?;
    Ok(())
}
