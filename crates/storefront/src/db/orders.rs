//! Order repository, used for admin aggregates.

use tracing::instrument;

use shopfront_core::Price;

use super::{RepositoryError, decode_rows};
use crate::backend::{DataStore, Query};
use crate::models::order::TABLE;
use crate::models::{AccessToken, Order};

/// Totals across every order visible to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderSummary {
    pub count: usize,
    pub revenue: Price,
}

/// Read-only repository for `orders` rows.
pub struct OrderRepository<'a> {
    store: &'a dyn DataStore,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// Orders visible to `token`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    #[instrument(skip_all)]
    pub async fn list(&self, token: &AccessToken) -> Result<Vec<Order>, RepositoryError> {
        let rows = self
            .store
            .select(Some(token), &Query::table(TABLE).order("created_at", false))
            .await?;
        decode_rows(TABLE, rows)
    }

    /// Count and revenue across the orders visible to `token`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    pub async fn summary(&self, token: &AccessToken) -> Result<OrderSummary, RepositoryError> {
        let orders = self.list(token).await?;
        Ok(OrderSummary {
            count: orders.len(),
            revenue: orders.iter().map(|order| order.total).sum(),
        })
    }
}
