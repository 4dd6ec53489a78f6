//! User profile repository.
//!
//! Profiles live in the `users` table and mirror auth identities. The
//! storefront creates one right after sign-up and refreshes `last_login` on
//! sign-in; the remaining operations back the admin tooling.

use chrono::{DateTime, Utc};
use tracing::instrument;

use shopfront_core::UserId;

use super::{RepositoryError, conflict_or_backend, decode_row, decode_rows, encode};
use crate::backend::{DataStore, Query};
use crate::models::user::TABLE;
use crate::models::{AccessToken, NewUserProfile, UserProfile, UserProfileUpdate};

/// Repository for `users` rows.
pub struct UserRepository<'a> {
    store: &'a dyn DataStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// Insert the profile for a freshly registered user.
    ///
    /// `token` is `None` when the provider withheld a session pending email
    /// confirmation; the insert then runs with the anonymous key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a profile with this id exists.
    /// Returns `RepositoryError::Backend` for other failures.
    #[instrument(skip(self, token, profile), fields(user_id = %profile.id))]
    pub async fn create(
        &self,
        token: Option<&AccessToken>,
        profile: &NewUserProfile,
    ) -> Result<UserProfile, RepositoryError> {
        let rows = self
            .store
            .insert(token, TABLE, vec![encode(TABLE, profile)?])
            .await
            .map_err(conflict_or_backend)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            RepositoryError::DataCorruption("insert returned no profile".to_string())
        })?;
        decode_row(TABLE, row)
    }

    /// Record a successful sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile row.
    /// Returns `RepositoryError::Backend` if the update fails.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn touch_last_login(
        &self,
        token: &AccessToken,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let update = UserProfileUpdate {
            last_login: Some(at),
            ..UserProfileUpdate::default()
        };
        self.update(token, id, &update).await.map(|_| ())
    }

    /// Get a profile by user id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn get(
        &self,
        token: &AccessToken,
        id: UserId,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let rows = self
            .store
            .select(Some(token), &Query::table(TABLE).eq("id", id))
            .await?;
        rows.into_iter().next().map(|row| decode_row(TABLE, row)).transpose()
    }

    /// Every profile visible to `token`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    #[instrument(skip_all)]
    pub async fn list_all(&self, token: &AccessToken) -> Result<Vec<UserProfile>, RepositoryError> {
        let rows = self
            .store
            .select(Some(token), &Query::table(TABLE).order("created_at", false))
            .await?;
        decode_rows(TABLE, rows)
    }

    /// Apply a partial update and return the stored row.
    ///
    /// An empty update writes nothing and returns the current row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched.
    /// Returns `RepositoryError::Backend` if the update fails.
    #[instrument(skip(self, token, update), fields(user_id = %id))]
    pub async fn update(
        &self,
        token: &AccessToken,
        id: UserId,
        update: &UserProfileUpdate,
    ) -> Result<UserProfile, RepositoryError> {
        if update.is_empty() {
            return self.get(token, id).await?.ok_or(RepositoryError::NotFound);
        }

        let rows = self
            .store
            .update(Some(token), &Query::table(TABLE).eq("id", id), encode(TABLE, update)?)
            .await?;
        let row = rows.into_iter().next().ok_or(RepositoryError::NotFound)?;
        decode_row(TABLE, row)
    }

    /// Delete a profile. The auth identity is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched.
    /// Returns `RepositoryError::Backend` if the delete fails.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete(&self, token: &AccessToken, id: UserId) -> Result<(), RepositoryError> {
        let removed = self
            .store
            .delete(Some(token), &Query::table(TABLE).eq("id", id))
            .await?;
        if removed.is_empty() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Number of profiles visible to `token`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the query fails.
    #[instrument(skip_all)]
    pub async fn count(&self, token: &AccessToken) -> Result<usize, RepositoryError> {
        let rows = self
            .store
            .select(Some(token), &Query::table(TABLE).columns("id"))
            .await?;
        Ok(rows.len())
    }
}
