//! Types for the favorites reconciler.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Catalog item (book) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Book fields embedded in a favorite record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    /// Book identifier
    pub id: Option<ItemId>,
    /// Title
    #[serde(rename = "titulo", default)]
    pub title: String,
    /// ISBN
    #[serde(default)]
    pub isbn: Option<String>,
    /// Genre
    #[serde(rename = "genero", default)]
    pub genre: Option<String>,
}

/// One entry of the remote favorites list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    /// Identifier of the favorite record itself
    pub id: String,
    /// The favorited book
    #[serde(rename = "livro")]
    pub book: BookSummary,
}

/// Lifecycle of an optimistic toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Applied locally, remote call in flight.
    Applying,
    /// The backend accepted the change.
    Confirmed,
    /// The backend refused; local state was restored.
    RolledBack,
}

/// The newest toggle issued for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    /// Supersession token; only the newest toggle for an item may resolve.
    pub token: u64,
    /// Membership before the toggle
    pub previous: bool,
    /// Membership the toggle asks for
    pub desired: bool,
    /// Current phase
    pub phase: MutationPhase,
}

/// Favorites of the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesState {
    /// Favorited item identifiers
    pub ids: BTreeSet<ItemId>,
    /// Whether a refetch is in flight
    pub is_loading: bool,
    /// User whose favorites `ids` holds
    pub scope: Option<String>,
    /// Latest toggle per item
    pub pending: HashMap<ItemId, PendingToggle>,
    /// Message of the most recent failure
    pub last_error: Option<String>,
    /// Last `(is_authenticated, user_id)` pair seen from the session
    pub last_session: Option<(bool, Option<String>)>,
    /// Refetch generation; results of older generations are discarded
    pub generation: u64,
    /// Next supersession token
    pub next_token: u64,
}

impl FavoritesState {
    /// Initial state: loading until the session has resolved.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: BTreeSet::new(),
            is_loading: true,
            scope: None,
            pending: HashMap::new(),
            last_error: None,
            last_session: None,
            generation: 0,
            next_token: 0,
        }
    }

    /// Whether `item` is currently favorited.
    #[must_use]
    pub fn contains(&self, item: &ItemId) -> bool {
        self.ids.contains(item)
    }

    /// Number of favorites.
    #[must_use]
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Toggles whose remote call has not resolved.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.values().filter(|p| p.phase == MutationPhase::Applying).count()
    }

    /// Drop everything tied to a user.
    pub(crate) fn clear(&mut self) {
        self.ids.clear();
        self.pending.clear();
        self.scope = None;
        self.is_loading = false;
    }
}

impl Default for FavoritesState {
    fn default() -> Self {
        Self::new()
    }
}

/// Inputs of the favorites reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoritesAction {
    // Commands
    /// The session's authentication status or user changed.
    SessionChanged {
        /// Whether the session is authenticated
        is_authenticated: bool,
        /// Authenticated user
        user_id: Option<String>,
    },
    /// Reload the favorites of the current user.
    Refetch,
    /// Favorite or unfavorite an item.
    Toggle {
        /// Item to change
        item_id: ItemId,
        /// `true` to add, `false` to remove
        make_favorite: bool,
    },

    // Service results
    /// A refetch returned.
    Loaded {
        /// Generation the refetch was issued in
        generation: u64,
        /// User the refetch was issued for
        scope: String,
        /// Returned identifiers, possibly with duplicates
        ids: Vec<ItemId>,
    },
    /// A refetch failed.
    LoadFailed {
        /// Generation the refetch was issued in
        generation: u64,
        /// Failure
        error: ServiceError,
    },
    /// A toggle's remote call succeeded.
    ToggleConfirmed {
        /// Item
        item_id: ItemId,
        /// Supersession token of the toggle
        token: u64,
        /// Membership on the server after the call
        is_favorite: bool,
    },
    /// A toggle's remote call failed.
    ToggleFailed {
        /// Item
        item_id: ItemId,
        /// Supersession token of the toggle
        token: u64,
        /// Failure
        error: ServiceError,
    },
}
