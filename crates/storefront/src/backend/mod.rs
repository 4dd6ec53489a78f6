//! Hosted backend clients: authentication and the row-oriented data store.
//!
//! # Architecture
//!
//! - The backend is the source of truth - the storefront keeps NO local copy
//!   of carts or profiles, every read goes to the data store
//! - [`AuthProvider`] and [`DataStore`] are the seams; the HTTP clients
//!   ([`AuthClient`], [`RestClient`]) talk to GoTrue and PostgREST, and
//!   [`FakeBackend`] implements both in memory for tests
//! - Every call resolves to a result with an explicit error; there is no
//!   retry or backoff at this layer
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::backend::{AuthClient, DataStore, Query, RestClient};
//!
//! let auth = AuthClient::new(&config.backend)?;
//! let store = RestClient::new(&config.backend)?;
//!
//! let session = auth.sign_in_with_password(&email, &password).await?;
//! let rows = store
//!     .select(
//!         Some(&session.access_token),
//!         &Query::table("cart_items")
//!             .eq("user_id", session.user.id)
//!             .order("created_at", false),
//!     )
//!     .await?;
//! ```

mod auth_client;
pub mod fake;
mod query;
mod rest_client;

use std::sync::Arc;

pub use auth_client::AuthClient;
pub use fake::{FakeBackend, FakeFailure, FakeOp};
pub use query::{Filter, Order, Query};
pub use rest_client::RestClient;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use thiserror::Error;

use shopfront_core::Email;

use crate::config::BackendConfig;
use crate::models::{AccessToken, AuthUser, Session, UserMetadata};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service could not be reached.
    #[error("Connection failed: {0}")]
    Unreachable(String),

    /// The service answered with an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but lacked required data.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Whether the failure happened before the service could answer.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Unreachable(_) => true,
            _ => false,
        }
    }

    /// The message the service reported, or this error's display text.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Build an API error from a status and response body.
    ///
    /// GoTrue and PostgREST use different error shapes; the first of `msg`,
    /// `message`, `error_description` and `error` that is present wins.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
            })
            .unwrap_or_else(|| body.chars().take(200).collect());

        Self::Api { status, message }
    }
}

/// Result of a sign-up request.
///
/// `session` is `None` when the provider requires email confirmation first.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
}

/// The remote authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the user behind an access token.
    ///
    /// Returns `Ok(None)` when the provider rejects the token (expired,
    /// revoked, or malformed).
    async fn get_user(&self, token: &AccessToken) -> Result<Option<AuthUser>, BackendError>;

    /// Exchange email and password for a session.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, BackendError>;

    /// Register a new identity.
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        metadata: &UserMetadata,
    ) -> Result<SignUpResult, BackendError>;

    /// Revoke the session behind `token`.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError>;
}

/// The remote row store, addressed by table with `eq` filters and ordering.
///
/// `token` is the signed-in user's access token; `None` means the request
/// runs with the anonymous key. Mutations return the affected rows.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn select(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError>;

    async fn insert(
        &self,
        token: Option<&AccessToken>,
        table: &str,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, BackendError>;

    async fn update(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError>;

    async fn delete(
        &self,
        token: Option<&AccessToken>,
        query: &Query,
    ) -> Result<Vec<Value>, BackendError>;
}

/// Both halves of the backend, shareable across handlers.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn DataStore>,
}

impl Backend {
    /// Connect the HTTP clients for a configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn connect(config: &BackendConfig) -> Result<Self, BackendError> {
        Ok(Self {
            auth: Arc::new(AuthClient::new(config)?),
            store: Arc::new(RestClient::new(config)?),
        })
    }

    /// Use one fake for both halves.
    #[must_use]
    pub fn fake(fake: Arc<FakeBackend>) -> Self {
        Self {
            auth: fake.clone(),
            store: fake,
        }
    }
}
