//! Session-related types.
//!
//! The browser session stores only the backend access token. Identity is
//! never read from the session directly: the token is re-validated with the
//! auth provider whenever a handler needs to know who the user is.

use serde::{Deserialize, Serialize};

use shopfront_core::{Email, UserId};

/// Bearer token issued by the auth provider.
///
/// Implements `Debug` manually so tokens never land in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for use in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Identity of an authenticated user, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
    /// Display name supplied at sign-up, if any.
    pub full_name: Option<String>,
}

/// A validated session: the token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: AccessToken,
    pub user: AuthUser,
}

/// Extra profile data sent along with a sign-up request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the backend access token.
    pub const ACCESS_TOKEN: &str = "access_token";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_access_token_serializes_as_plain_string() {
        let token = AccessToken::new("abc");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
    }

    #[test]
    fn test_metadata_omits_missing_name() {
        let json = serde_json::to_value(UserMetadata::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
