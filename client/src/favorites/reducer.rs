//! Favorites reducer.
//!
//! Keeps a client-side cache of the current user's favorites consistent
//! with the backend.
//!
//! # Toggles
//!
//! A toggle is applied to the local set immediately, then the remote add
//! or remove runs as an effect. Every toggle gets a fresh supersession
//! token recorded in [`FavoritesState::pending`]; only the result carrying
//! the newest token for an item may confirm or roll back, so a slow failure
//! of an earlier toggle cannot undo a later one. A rollback restores the
//! membership the server last confirmed, not an earlier optimistic guess.
//!
//! A conflict while adding means the item is already a favorite on the
//! server. The local set already says so, so it counts as confirmed.
//!
//! # Refetches
//!
//! Each refetch bumps [`FavoritesState::generation`]. Results tagged with an
//! older generation, or for a user other than the current one, are dropped.

use std::marker::PhantomData;
use std::sync::Arc;

use libris_core::effect::Effect;
use libris_core::reducer::Reducer;
use libris_core::{smallvec, SmallVec};

use crate::error::ServiceError;
use crate::providers::{FavoritesService, Notice, Notifier};

use super::types::{FavoritesAction, FavoritesState, ItemId, MutationPhase, PendingToggle};

const ADDED: &str = "Added to favorites";
const REMOVED: &str = "Removed from favorites";
const ALREADY_FAVORITE: &str = "This book is already in your favorites";
const TOGGLE_FAILED: &str = "Could not update favorites. Please try again.";

/// Dependencies of the favorites reducer.
#[derive(Clone)]
pub struct FavoritesEnvironment<F>
where
    F: FavoritesService + Clone,
{
    /// Remote favorites list
    pub service: F,
    /// User-facing notices
    pub notifier: Arc<dyn Notifier>,
}

impl<F> FavoritesEnvironment<F>
where
    F: FavoritesService + Clone,
{
    /// Create a favorites environment.
    #[must_use]
    pub fn new(service: F, notifier: Arc<dyn Notifier>) -> Self {
        Self { service, notifier }
    }
}

/// Reducer owning [`FavoritesState`].
#[derive(Clone)]
pub struct FavoritesReducer<F> {
    _phantom: PhantomData<F>,
}

impl<F> FavoritesReducer<F> {
    /// Create a favorites reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

impl<F> Default for FavoritesReducer<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> FavoritesReducer<F>
where
    F: FavoritesService + Clone + 'static,
{
    fn notify(env: &FavoritesEnvironment<F>, notice: Notice) -> Effect<FavoritesAction> {
        let notifier = Arc::clone(&env.notifier);
        Effect::future(async move {
            notifier.notify(notice);
            None
        })
    }

    fn refetch(
        state: &mut FavoritesState,
        env: &FavoritesEnvironment<F>,
    ) -> SmallVec<[Effect<FavoritesAction>; 4]> {
        // Invalidates any refetch still in flight
        state.generation += 1;

        let user_id = match &state.last_session {
            Some((true, Some(user_id))) => user_id.clone(),
            _ => {
                state.clear();
                return SmallVec::new();
            },
        };

        if state.scope.as_deref() != Some(user_id.as_str()) {
            // Never show one user's favorites to another
            state.ids.clear();
            state.pending.clear();
            state.scope = Some(user_id.clone());
        }
        state.is_loading = true;

        let service = env.service.clone();
        let generation = state.generation;
        tracing::debug!(generation, user_id = %user_id, "Refetching favorites");

        smallvec![Effect::future(async move {
            match service.list().await {
                Ok(records) => Some(FavoritesAction::Loaded {
                    generation,
                    scope: user_id,
                    ids: records.into_iter().filter_map(|record| record.book.id).collect(),
                }),
                Err(error) => Some(FavoritesAction::LoadFailed { generation, error }),
            }
        })]
    }

    fn toggle(
        state: &mut FavoritesState,
        item_id: ItemId,
        make_favorite: bool,
        env: &FavoritesEnvironment<F>,
    ) -> SmallVec<[Effect<FavoritesAction>; 4]> {
        if state.scope.is_none() {
            tracing::warn!(item_id = %item_id, "Toggle rejected: not authenticated");
            return SmallVec::new();
        }

        // A superseded toggle never resolves, so its rollback target carries over
        let in_flight = state.pending.get(&item_id).filter(|p| p.phase == MutationPhase::Applying);
        let previous = match in_flight {
            Some(superseded) => {
                tracing::debug!(item_id = %item_id, token = superseded.token, "Toggle superseded");
                superseded.previous
            },
            None => state.ids.contains(&item_id),
        };

        if make_favorite {
            state.ids.insert(item_id.clone());
        } else {
            state.ids.remove(&item_id);
        }

        let token = state.next_token;
        state.next_token += 1;
        state.pending.insert(
            item_id.clone(),
            PendingToggle {
                token,
                previous,
                desired: make_favorite,
                phase: MutationPhase::Applying,
            },
        );

        let service = env.service.clone();
        smallvec![Effect::future(async move {
            let result = if make_favorite {
                service.add(&item_id).await
            } else {
                service.remove(&item_id).await
            };
            Some(match result {
                Ok(()) => FavoritesAction::ToggleConfirmed {
                    item_id,
                    token,
                    is_favorite: make_favorite,
                },
                Err(error) => FavoritesAction::ToggleFailed { item_id, token, error },
            })
        })]
    }

    /// The pending toggle for `item_id` if `token` is still the newest one.
    fn current_toggle<'s>(
        state: &'s mut FavoritesState,
        item_id: &ItemId,
        token: u64,
    ) -> Option<&'s mut PendingToggle> {
        match state.pending.get_mut(item_id) {
            Some(pending) if pending.token == token && pending.phase == MutationPhase::Applying => {
                Some(pending)
            },
            _ => {
                tracing::debug!(item_id = %item_id, token, "Ignoring result of superseded toggle");
                None
            },
        }
    }

    fn toggle_failed(
        state: &mut FavoritesState,
        item_id: &ItemId,
        token: u64,
        error: &ServiceError,
        env: &FavoritesEnvironment<F>,
    ) -> SmallVec<[Effect<FavoritesAction>; 4]> {
        let Some(pending) = Self::current_toggle(state, item_id, token) else {
            return SmallVec::new();
        };

        if pending.desired && error.is_conflict() {
            pending.phase = MutationPhase::Confirmed;
            tracing::debug!(item_id = %item_id, "Already a favorite on the server");
            return smallvec![Self::notify(env, Notice::success(ALREADY_FAVORITE))];
        }

        pending.phase = MutationPhase::RolledBack;
        let previous = pending.previous;
        if previous {
            state.ids.insert(item_id.clone());
        } else {
            state.ids.remove(item_id);
        }
        state.last_error = Some(error.to_string());
        tracing::warn!(item_id = %item_id, %error, "Toggle failed, rolled back");

        smallvec![Self::notify(env, Notice::error(TOGGLE_FAILED))]
    }
}

impl<F> Reducer for FavoritesReducer<F>
where
    F: FavoritesService + Clone + 'static,
{
    type State = FavoritesState;
    type Action = FavoritesAction;
    type Environment = FavoritesEnvironment<F>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FavoritesAction::SessionChanged { is_authenticated, user_id } => {
                let seen = Some((is_authenticated, user_id));
                if state.last_session == seen {
                    return SmallVec::new();
                }
                state.last_session = seen;
                Self::refetch(state, env)
            },

            FavoritesAction::Refetch => Self::refetch(state, env),

            FavoritesAction::Loaded { generation, scope, ids } => {
                let stale = generation != state.generation
                    || state.scope.as_deref() != Some(scope.as_str());
                if stale {
                    tracing::debug!(
                        generation,
                        current = state.generation,
                        "Discarding stale favorites"
                    );
                    return SmallVec::new();
                }
                state.ids = ids.into_iter().collect();
                state.is_loading = false;
                state.last_error = None;
                tracing::debug!(count = state.ids.len(), "Favorites loaded");
                SmallVec::new()
            },

            FavoritesAction::LoadFailed { generation, error } => {
                if generation != state.generation {
                    return SmallVec::new();
                }
                tracing::warn!(%error, "Failed to load favorites");
                state.ids.clear();
                state.is_loading = false;
                state.last_error = Some(error.to_string());
                SmallVec::new()
            },

            FavoritesAction::Toggle { item_id, make_favorite } => {
                Self::toggle(state, item_id, make_favorite, env)
            },

            FavoritesAction::ToggleConfirmed { item_id, token, is_favorite } => {
                let Some(pending) = Self::current_toggle(state, &item_id, token) else {
                    // The server moved; a newer toggle that fails must roll back to this
                    let newer = state.pending.get_mut(&item_id).filter(|p| {
                        p.phase == MutationPhase::Applying && p.token > token
                    });
                    if let Some(newer) = newer {
                        newer.previous = is_favorite;
                    }
                    return SmallVec::new();
                };
                pending.phase = MutationPhase::Confirmed;
                let message = if pending.desired { ADDED } else { REMOVED };
                smallvec![Self::notify(env, Notice::success(message))]
            },

            FavoritesAction::ToggleFailed { item_id, token, error } => {
                Self::toggle_failed(state, &item_id, token, &error, env)
            },
        }
    }
}
