//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (new hub per request, HTTP request context)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)

pub mod auth;
pub mod session;

pub use auth::{OptionalToken, clear_access_token, set_access_token};
pub use session::create_session_layer;
