//! User profile rows.
//!
//! A profile mirrors an auth identity in the `users` table. It is created once
//! right after sign-up and carries the role hint and last-login time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{Email, Role, UserId};

use super::null_as_default;

/// Table holding user profiles.
pub const TABLE: &str = "users";

/// One row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Insert payload for `users`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUserProfile {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl NewUserProfile {
    /// Profile for a freshly signed-up user.
    ///
    /// The name falls back to the local part of the email when none was
    /// given; the role is `admin` only for the configured admin address.
    #[must_use]
    pub fn for_sign_up(
        id: UserId,
        email: &Email,
        full_name: Option<&str>,
        admin_email: Option<&Email>,
        now: DateTime<Utc>,
    ) -> Self {
        let full_name = full_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| email.local_part().to_string(), str::to_string);

        Self {
            id,
            email: email.clone(),
            full_name,
            role: Role::for_email(email, admin_email),
            created_at: now,
            last_login: now,
        }
    }
}

/// Partial update for `users`; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserProfileUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
            && self.last_login.is_none()
    }
}
