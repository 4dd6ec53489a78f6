//! Repositories over the hosted data store.
//!
//! # Tables
//!
//! The storefront keeps no local database. Every repository reads and writes
//! a remote table through a [`DataStore`], authorized with the caller's
//! access token (or the anonymous key when none is given):
//!
//! - `cart_items` - One row per item added to a cart
//! - `users` - Profiles mirroring auth identities, with a role hint
//! - `products` - The catalog (read-only)
//! - `orders` - Orders (read-only, admin aggregates)
//!
//! Row-level access rules on the remote side decide what a token may see;
//! repositories only shape queries and decode rows.

pub mod cart_items;
pub mod orders;
pub mod products;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use cart_items::CartItemRepository;
pub use orders::{OrderRepository, OrderSummary};
pub use products::ProductRepository;
pub use users::UserRepository;

use crate::backend::BackendError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The data store call failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A returned row did not match the expected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate profile).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Whether the data store could not be reached at all.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Backend(e) if e.is_connection())
    }
}

/// Decode rows returned by the data store.
fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Result<Vec<T>, RepositoryError> {
    rows.into_iter()
        .map(|row| decode_row(table, row))
        .collect()
}

fn decode_row<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, RepositoryError> {
    serde_json::from_value(row)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {table} row: {e}")))
}

/// Serialize an insert or update payload.
fn encode<T: serde::Serialize>(table: &str, value: &T) -> Result<Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode {table} row: {e}")))
}

/// Map a unique-violation from the data store to [`RepositoryError::Conflict`].
fn conflict_or_backend(err: BackendError) -> RepositoryError {
    match &err {
        BackendError::Api { status: 409, message } => RepositoryError::Conflict(message.clone()),
        _ => RepositoryError::Backend(err),
    }
}
