//! Auth state that decides which parts of the page render.

use shopfront_core::Role;

use crate::models::AuthUser;

/// What the current visitor may see.
///
/// The admin variant is a UI hint only: admin pages still read data with the
/// visitor's own token, so the data store's access rules stay authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Sign-in and sign-up controls; cart and admin hidden.
    #[default]
    Unauthenticated,
    /// Cart, profile email and sign-out shown.
    Authenticated(AuthUser),
    /// Everything above plus the admin navigation and dashboard.
    Admin(AuthUser),
}

impl AuthState {
    /// State for a signed-in user with the given role.
    #[must_use]
    pub fn for_user(user: AuthUser, role: Role) -> Self {
        if role.is_admin() {
            Self::Admin(user)
        } else {
            Self::Authenticated(user)
        }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticated(user) | Self::Admin(user) => Some(user),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Whether the sign-in and sign-up controls are offered.
    #[must_use]
    pub const fn shows_auth_controls(&self) -> bool {
        !self.is_authenticated()
    }

    /// Email shown in the header, if signed in.
    #[must_use]
    pub fn display_email(&self) -> Option<&str> {
        self.user().map(|user| user.email.as_str())
    }
}
