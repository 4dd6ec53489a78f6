//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in, sign-up and sign-out against the hosted auth provider,
//!   plus the auth state that gates the UI
//! - `cart` - Session-gated cart controller
//! - `catalog` - Product loading, caching and carousel configuration
//! - `admin` - Admin panel pages and dashboard aggregates

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
