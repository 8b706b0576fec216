//! Favorites of the signed-in user, kept optimistic and reconciled with
//! the backend.

mod reducer;
mod types;

pub use reducer::{FavoritesEnvironment, FavoritesReducer};
pub use types::{
    BookSummary, FavoriteRecord, FavoritesAction, FavoritesState, ItemId, MutationPhase,
    PendingToggle,
};
