//! Product catalog repository.

use tracing::instrument;

use shopfront_core::ProductId;

use super::{RepositoryError, decode_row, decode_rows};
use crate::backend::{DataStore, Query};
use crate::models::product::TABLE;
use crate::models::{AccessToken, Product};

/// Read-only repository for `products` rows.
pub struct ProductRepository<'a> {
    store: &'a dyn DataStore,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// The whole catalog, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    #[instrument(skip_all)]
    pub async fn list(&self, token: Option<&AccessToken>) -> Result<Vec<Product>, RepositoryError> {
        let rows = self
            .store
            .select(token, &Query::table(TABLE).order("id", true))
            .await?;
        decode_rows(TABLE, rows)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn get(
        &self,
        token: Option<&AccessToken>,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let rows = self
            .store
            .select(token, &Query::table(TABLE).eq("id", id))
            .await?;
        rows.into_iter().next().map(|row| decode_row(TABLE, row)).transpose()
    }

    /// Number of products visible to `token`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    #[instrument(skip_all)]
    pub async fn count(&self, token: Option<&AccessToken>) -> Result<usize, RepositoryError> {
        let rows = self
            .store
            .select(token, &Query::table(TABLE).columns("id"))
            .await?;
        Ok(rows.len())
    }
}
