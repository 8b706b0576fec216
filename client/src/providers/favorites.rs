//! Remote favorites list.

use crate::error::ServiceError;
use crate::favorites::{FavoriteRecord, ItemId};

/// Favorites of the bearer, as stored by the backend.
///
/// The bearer identifies the user; none of these calls take a user id.
pub trait FavoritesService: Send + Sync {
    /// List the bearer's favorites.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<FavoriteRecord>, ServiceError>> + Send;

    /// Add `item` to the favorites.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Conflict`] if `item` is already a favorite,
    /// or another [`ServiceError`] if the request fails.
    fn add(
        &self,
        item: &ItemId,
    ) -> impl std::future::Future<Output = Result<(), ServiceError>> + Send;

    /// Remove `item` from the favorites.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the request fails.
    fn remove(
        &self,
        item: &ItemId,
    ) -> impl std::future::Future<Output = Result<(), ServiceError>> + Send;
}
