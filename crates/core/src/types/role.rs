//! Storefront user roles.

use serde::{Deserialize, Serialize};

use crate::Email;

/// Role stored on a user profile.
///
/// The role is a display hint for the storefront. Access to admin data is
/// decided by the data store's own row-level rules, not by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Role assigned to a new profile: `Admin` when the email is the
    /// configured admin address (compared case-insensitively).
    #[must_use]
    pub fn for_email(email: &Email, admin_email: Option<&Email>) -> Self {
        match admin_email {
            Some(admin) if admin.matches(email) => Self::Admin,
            _ => Self::User,
        }
    }

    /// Returns the role name as stored in the `users.role` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}
