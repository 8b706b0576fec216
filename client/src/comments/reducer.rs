//! Comments reducer.
//!
//! Holds the comment tree of one book. Vote counters are never changed
//! locally: every successful post or vote triggers a reload, so the
//! displayed counts are always the backend's.

use std::marker::PhantomData;
use std::sync::Arc;

use libris_core::effect::Effect;
use libris_core::reducer::Reducer;
use libris_core::{smallvec, SmallVec};

use crate::providers::{CommentService, Notice, Notifier};

use super::types::{CommentsAction, CommentsState, MutationKind, NewComment};

/// Dependencies of the comments reducer.
#[derive(Clone)]
pub struct CommentsEnvironment<C>
where
    C: CommentService + Clone,
{
    /// Remote comments
    pub service: C,
    /// User-facing notices
    pub notifier: Arc<dyn Notifier>,
}

impl<C> CommentsEnvironment<C>
where
    C: CommentService + Clone,
{
    /// Create a comments environment.
    #[must_use]
    pub fn new(service: C, notifier: Arc<dyn Notifier>) -> Self {
        Self { service, notifier }
    }
}

/// Reducer owning [`CommentsState`].
#[derive(Clone)]
pub struct CommentsReducer<C> {
    _phantom: PhantomData<C>,
}

impl<C> CommentsReducer<C> {
    /// Create a comments reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self { _phantom: PhantomData }
    }
}

impl<C> Default for CommentsReducer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CommentsReducer<C>
where
    C: CommentService + Clone + 'static,
{
    fn notify(env: &CommentsEnvironment<C>, notice: Notice) -> Effect<CommentsAction> {
        let notifier = Arc::clone(&env.notifier);
        Effect::future(async move {
            notifier.notify(notice);
            None
        })
    }

    fn load(
        state: &mut CommentsState,
        book_id: String,
        env: &CommentsEnvironment<C>,
    ) -> Effect<CommentsAction> {
        if state.book_id.as_deref() != Some(book_id.as_str()) {
            state.comments.clear();
            state.book_id = Some(book_id.clone());
        }
        state.generation += 1;
        state.is_loading = true;

        let service = env.service.clone();
        let generation = state.generation;
        Effect::future(async move {
            match service.list(&book_id).await {
                Ok(comments) => Some(CommentsAction::Loaded { book_id, generation, comments }),
                Err(error) => Some(CommentsAction::LoadFailed { book_id, generation, error }),
            }
        })
    }

    fn is_current(state: &CommentsState, book_id: &str) -> bool {
        state.book_id.as_deref() == Some(book_id)
    }
}

impl<C> Reducer for CommentsReducer<C>
where
    C: CommentService + Clone + 'static,
{
    type State = CommentsState;
    type Action = CommentsAction;
    type Environment = CommentsEnvironment<C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CommentsAction::Load { book_id } => smallvec![Self::load(state, book_id, env)],

            CommentsAction::SetPolicy(policy) => {
                state.policy = policy;
                SmallVec::new()
            },

            CommentsAction::Post { content, parent } => {
                let content = content.trim().to_owned();
                let Some(book_id) = state.book_id.clone() else {
                    tracing::warn!("Post rejected: no book loaded");
                    return SmallVec::new();
                };
                if content.is_empty() {
                    tracing::debug!("Ignoring blank comment");
                    return SmallVec::new();
                }

                let service = env.service.clone();
                let comment = NewComment { content, parent_comment_id: parent };
                smallvec![Effect::future(async move {
                    Some(match service.create(&book_id, &comment).await {
                        Ok(_) => {
                            CommentsAction::MutationSucceeded { book_id, kind: MutationKind::Post }
                        },
                        Err(error) => CommentsAction::MutationFailed {
                            book_id,
                            kind: MutationKind::Post,
                            error,
                        },
                    })
                })]
            },

            CommentsAction::Vote { comment_id, helpful } => {
                let Some(book_id) = state.book_id.clone() else {
                    tracing::warn!("Vote rejected: no book loaded");
                    return SmallVec::new();
                };

                let service = env.service.clone();
                smallvec![Effect::future(async move {
                    Some(match service.vote(&book_id, &comment_id, helpful).await {
                        Ok(()) => {
                            CommentsAction::MutationSucceeded { book_id, kind: MutationKind::Vote }
                        },
                        Err(error) => CommentsAction::MutationFailed {
                            book_id,
                            kind: MutationKind::Vote,
                            error,
                        },
                    })
                })]
            },

            CommentsAction::Loaded { book_id, generation, comments } => {
                if !Self::is_current(state, &book_id) || generation != state.generation {
                    tracing::debug!(book_id = %book_id, "Discarding stale comments");
                    return SmallVec::new();
                }
                state.comments = comments;
                state.is_loading = false;
                state.last_error = None;
                SmallVec::new()
            },

            CommentsAction::LoadFailed { book_id, generation, error } => {
                if !Self::is_current(state, &book_id) || generation != state.generation {
                    return SmallVec::new();
                }
                tracing::warn!(book_id = %book_id, %error, "Failed to load comments");
                state.is_loading = false;
                state.last_error = Some(error.to_string());
                smallvec![Self::notify(env, Notice::error("Could not load comments."))]
            },

            CommentsAction::MutationSucceeded { book_id, kind } => {
                if !Self::is_current(state, &book_id) {
                    return SmallVec::new();
                }
                let mut effects: SmallVec<[Effect<CommentsAction>; 4]> =
                    smallvec![Self::load(state, book_id, env)];
                if kind == MutationKind::Post {
                    effects.push(Self::notify(env, Notice::success("Comment posted!")));
                }
                effects
            },

            CommentsAction::MutationFailed { book_id, kind, error } => {
                tracing::warn!(book_id = %book_id, ?kind, %error, "Comment mutation failed");
                if !Self::is_current(state, &book_id) {
                    return SmallVec::new();
                }
                state.last_error = Some(error.to_string());
                let message = match kind {
                    MutationKind::Post => "Could not post comment.",
                    MutationKind::Vote => "Could not register vote.",
                };
                smallvec![Self::notify(env, Notice::error(message))]
            },
        }
    }
}
