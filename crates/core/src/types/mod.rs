//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use role::{Role, RoleParseError};

/// Shortest password the sign-up form accepts.
pub const MIN_PASSWORD_LENGTH: usize = 6;
