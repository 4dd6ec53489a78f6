//! Cart item repository.

use tracing::instrument;

use shopfront_core::{CartItemId, UserId};

use super::{RepositoryError, decode_row, decode_rows, encode};
use crate::backend::{DataStore, Query};
use crate::models::cart::TABLE;
use crate::models::{AccessToken, CartItem, NewCartItem};

/// Repository for `cart_items` rows.
pub struct CartItemRepository<'a> {
    store: &'a dyn DataStore,
}

impl<'a> CartItemRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// All items belonging to `user_id`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn list_for_user(
        &self,
        token: &AccessToken,
        user_id: UserId,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let query = Query::table(TABLE)
            .eq("user_id", user_id)
            .order("created_at", false);
        let rows = self.store.select(Some(token), &query).await?;
        decode_rows(TABLE, rows)
    }

    /// Insert one item and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the insert fails, or
    /// `RepositoryError::DataCorruption` if no row comes back.
    #[instrument(skip(self, token, item), fields(user_id = %item.user_id, product = %item.product_name))]
    pub async fn add(
        &self,
        token: &AccessToken,
        item: &NewCartItem,
    ) -> Result<CartItem, RepositoryError> {
        let rows = self
            .store
            .insert(Some(token), TABLE, vec![encode(TABLE, item)?])
            .await?;
        let row = rows.into_iter().next().ok_or_else(|| {
            RepositoryError::DataCorruption("insert returned no cart item".to_string())
        })?;
        decode_row(TABLE, row)
    }

    /// Delete one item, matching on both its id and its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched (including rows
    /// owned by another user), or `RepositoryError::Backend` if the delete fails.
    #[instrument(skip(self, token), fields(item_id = %item_id, user_id = %user_id))]
    pub async fn remove(
        &self,
        token: &AccessToken,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let query = Query::table(TABLE)
            .eq("id", item_id)
            .eq("user_id", user_id);
        let removed = self.store.delete(Some(token), &query).await?;
        if removed.is_empty() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shopfront_core::{Email, Price};

    use super::*;
    use crate::backend::FakeBackend;
    use crate::models::ProductSnapshot;

    fn shoe() -> ProductSnapshot {
        ProductSnapshot {
            name: "Shoe".to_string(),
            price: Price::new(Decimal::from(40)),
            image: "/img/shoe.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let fake = FakeBackend::new();
        let user = fake.add_user(&Email::parse("a@b.co").unwrap(), "secret1", None);
        let token = fake.session_for(&user).access_token;
        let repo = CartItemRepository::new(&fake);

        let first = repo.add(&token, &NewCartItem::single(user.id, &shoe())).await.unwrap();
        let second = repo.add(&token, &NewCartItem::single(user.id, &shoe())).await.unwrap();

        let items = repo.list_for_user(&token, user.id).await.unwrap();
        let ids: Vec<CartItemId> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_remove_ignores_other_users_rows() {
        let fake = FakeBackend::new();
        let owner = fake.add_user(&Email::parse("owner@b.co").unwrap(), "secret1", None);
        let other = fake.add_user(&Email::parse("other@b.co").unwrap(), "secret1", None);
        let owner_token = fake.session_for(&owner).access_token;
        let other_token = fake.session_for(&other).access_token;
        let repo = CartItemRepository::new(&fake);

        let item = repo
            .add(&owner_token, &NewCartItem::single(owner.id, &shoe()))
            .await
            .unwrap();

        let result = repo.remove(&other_token, other.id, item.id).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert_eq!(fake.rows(TABLE).len(), 1);

        repo.remove(&owner_token, owner.id, item.id).await.unwrap();
        assert!(fake.rows(TABLE).is_empty());
    }
}
