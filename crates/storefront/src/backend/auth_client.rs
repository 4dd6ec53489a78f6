//! GoTrue authentication client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use url::Url;

use shopfront_core::{Email, UserId};

use super::{AuthProvider, BackendError, SignUpResult};
use crate::config::BackendConfig;
use crate::models::{AccessToken, AuthUser, Session, UserMetadata};

/// Client for the `/auth/v1` endpoints.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base: Url,
}

/// User object as GoTrue returns it.
#[derive(Debug, Deserialize)]
struct RawUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl TryFrom<RawUser> for AuthUser {
    type Error = BackendError;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let email = raw
            .email
            .ok_or_else(|| BackendError::Malformed(format!("user {} has no email", raw.id)))?;
        let email = Email::parse(&email)
            .map_err(|e| BackendError::Malformed(format!("user {}: {e}", raw.id)))?;

        Ok(Self {
            id: raw.id,
            email,
            full_name: raw.user_metadata.full_name,
        })
    }
}

/// Token grant response; also the sign-up response when no confirmation is needed.
#[derive(Debug, Deserialize)]
struct RawSession {
    access_token: String,
    user: RawUser,
}

impl TryFrom<RawSession> for Session {
    type Error = BackendError;

    fn try_from(raw: RawSession) -> Result<Self, Self::Error> {
        Ok(Self {
            access_token: AccessToken::new(raw.access_token),
            user: raw.user.try_into()?,
        })
    }
}

impl AuthClient {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = build_http_client(config)?;
        let base = config
            .url
            .join("auth/v1/")
            .map_err(|e| BackendError::Malformed(format!("invalid auth URL: {e}")))?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Malformed(format!("invalid auth endpoint {path}: {e}")))
    }

    /// Read a JSON body, turning error statuses into [`BackendError::Api`].
    async fn read_json(response: reqwest::Response) -> Result<Value, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::from_response(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AuthProvider for AuthClient {
    #[instrument(skip_all)]
    async fn get_user(&self, token: &AccessToken) -> Result<Option<AuthUser>, BackendError> {
        let response = self
            .client
            .get(self.endpoint("user")?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            tracing::debug!(status = status.as_u16(), "Access token rejected");
            return Ok(None);
        }

        let raw: RawUser = serde_json::from_value(Self::read_json(response).await?)?;
        Ok(Some(raw.try_into()?))
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, BackendError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url)
            .json(&json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        let raw: RawSession = serde_json::from_value(Self::read_json(response).await?)?;
        raw.try_into()
    }

    #[instrument(skip(self, password, metadata), fields(email = %email))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        metadata: &UserMetadata,
    ) -> Result<SignUpResult, BackendError> {
        let response = self
            .client
            .post(self.endpoint("signup")?)
            .json(&json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
                "data": metadata,
            }))
            .send()
            .await?;

        let body = Self::read_json(response).await?;

        // With autoconfirm the provider returns a full session; otherwise the
        // bare user awaiting email confirmation.
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value::<RawSession>(body)?.try_into()?;
            return Ok(SignUpResult {
                user: Some(session.user.clone()),
                session: Some(session),
            });
        }

        let user = match body.get("user") {
            Some(user) if !user.is_null() => Some(user.clone()),
            _ if body.get("id").is_some() => Some(body),
            _ => None,
        };
        let user = user
            .map(|value| serde_json::from_value::<RawUser>(value)?.try_into())
            .transpose()?;

        Ok(SignUpResult {
            user,
            session: None,
        })
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint("logout")?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_response(status.as_u16(), &body));
        }

        Ok(())
    }
}

/// HTTP client carrying the project's `apikey` header.
pub(super) fn build_http_client(config: &BackendConfig) -> Result<reqwest::Client, BackendError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "apikey",
        HeaderValue::from_str(config.anon_key.expose_secret())
            .map_err(|e| BackendError::Malformed(format!("Invalid API key format: {e}")))?,
    );

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .build()?)
}
