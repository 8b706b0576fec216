//! Application facade.
//!
//! [`App`] owns one session store and one favorites store and is the only
//! place that moves information between them: after every session change
//! it forwards the `(is_authenticated, user_id)` pair to the favorites
//! store and waits for the resulting refetch to settle. Neither store is
//! reachable for sending from outside, so no session change can skip that
//! step.

use std::sync::Arc;
use std::time::Duration;

use libris_core::environment::Clock;
use libris_runtime::Store;
use tokio::sync::{broadcast, watch};

use crate::comments::{CommentsAction, CommentsEnvironment, CommentsReducer, CommentsState};
use crate::error::{Result, ServiceError};
use crate::favorites::{
    FavoritesAction, FavoritesEnvironment, FavoritesReducer, FavoritesState, ItemId,
};
use crate::guard::{Access, GuardWatch};
use crate::providers::{
    AuthService, CommentService, CredentialStore, FavoritesService, Navigator, Notice, Notifier,
};
use crate::session::{Session, SessionAction, SessionEnvironment, SessionReducer};
use crate::validation::{LoginCredentials, Registration};

/// Store holding the process-wide [`Session`].
pub type SessionStore = Store<Session, SessionAction, SessionEnvironment, SessionReducer>;

/// Store holding the signed-in user's favorites.
pub type FavoritesStore<F> =
    Store<FavoritesState, FavoritesAction, FavoritesEnvironment<F>, FavoritesReducer<F>>;

/// Store holding one book's comment thread.
pub type CommentsStore<C> =
    Store<CommentsState, CommentsAction, CommentsEnvironment<C>, CommentsReducer<C>>;

/// Synchronous providers shared by every store.
#[derive(Clone)]
pub struct AppContext {
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Durable credential slot
    pub credentials: Arc<dyn CredentialStore>,
    /// Screen navigation
    pub navigator: Arc<dyn Navigator>,
    /// User-facing notices
    pub notifier: Arc<dyn Notifier>,
}

/// The client application.
pub struct App<A, F, C>
where
    A: AuthService + Clone + 'static,
    F: FavoritesService + Clone + 'static,
    C: CommentService + Clone + 'static,
{
    context: AppContext,
    auth: A,
    comment_service: C,
    session: Arc<SessionStore>,
    favorites: Arc<FavoritesStore<F>>,
}

impl<A, F, C> App<A, F, C>
where
    A: AuthService + Clone + 'static,
    F: FavoritesService + Clone + 'static,
    C: CommentService + Clone + 'static,
{
    /// Wire the stores. Call [`start`](Self::start) before anything else.
    #[must_use]
    pub fn new(context: AppContext, auth: A, favorites: F, comments: C) -> Self {
        let session = Store::new(
            Session::loading(),
            SessionReducer::new(),
            SessionEnvironment::new(
                Arc::clone(&context.clock),
                Arc::clone(&context.credentials),
                Arc::clone(&context.navigator),
            ),
        );

        let favorites = Store::new(
            FavoritesState::new(),
            FavoritesReducer::new(),
            FavoritesEnvironment::new(favorites, Arc::clone(&context.notifier)),
        );

        Self {
            context,
            auth,
            comment_service: comments,
            session: Arc::new(session),
            favorites: Arc::new(favorites),
        }
    }

    /// Examine the stored credential and load the favorites it implies.
    ///
    /// # Errors
    ///
    /// Returns an error if a store is shutting down.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        self.session.send(SessionAction::Initialize).await?.wait().await;
        self.sync_favorites().await
    }

    /// Validate `credentials`, exchange them for a token and sign in.
    ///
    /// Returns the resulting session; a token the backend issued but that
    /// cannot be decoded leaves it unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`](crate::error::ClientError::Validation)
    /// for malformed input, or
    /// [`ClientError::Service`](crate::error::ClientError::Service) if the
    /// backend rejects the login.
    #[tracing::instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session> {
        credentials.validate()?;

        let token = match self.auth.login(credentials).await {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(%error, "Login rejected");
                self.context.notifier.notify(Notice::error("Invalid email or password."));
                return Err(error.into());
            },
        };

        self.session.send(SessionAction::Login { token }).await?.wait().await;
        self.sync_favorites().await?;

        let session = self.session().await;
        if session.is_authenticated {
            self.context.notifier.notify(Notice::success("Welcome back!"));
        }
        Ok(session)
    }

    /// Validate `registration` and create the account.
    ///
    /// Registration does not sign in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, or a service error
    /// (a [`ServiceError::Conflict`] for a taken email).
    #[tracing::instrument(skip(self, registration))]
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        registration.validate()?;

        match self.auth.register(registration).await {
            Ok(()) => {
                self.context
                    .notifier
                    .notify(Notice::success("Account created. Please log in."));
                Ok(())
            },
            Err(error) => {
                let message = if error.is_conflict() {
                    "This email is already registered."
                } else {
                    "Could not create account."
                };
                self.context.notifier.notify(Notice::error(message));
                Err(error.into())
            },
        }
    }

    /// Sign out. The server-side logout is best effort; the local session
    /// always ends.
    ///
    /// # Errors
    ///
    /// Returns an error if a store is shutting down.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        if self.session().await.is_authenticated {
            if let Err(error) = self.auth.logout().await {
                tracing::warn!(%error, "Server-side logout failed");
            }
        }
        self.end_session().await
    }

    /// Favorite (`make_favorite = true`) or unfavorite `item_id` and wait
    /// for the backend to answer.
    ///
    /// # Errors
    ///
    /// Returns an error if a store is shutting down. Service failures are
    /// rolled back and reported through the notifier.
    #[tracing::instrument(skip(self), fields(item = %item_id))]
    pub async fn toggle_favorite(&self, item_id: ItemId, make_favorite: bool) -> Result<()> {
        self.settle_favorites(FavoritesAction::Toggle { item_id, make_favorite }).await
    }

    /// Reload the favorites of the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if a store is shutting down.
    pub async fn refetch_favorites(&self) -> Result<()> {
        self.settle_favorites(FavoritesAction::Refetch).await
    }

    /// React to a failed call. A rejected credential ends the session.
    ///
    /// Returns `true` if the session was ended.
    ///
    /// # Errors
    ///
    /// Returns an error if a store is shutting down.
    pub async fn handle_service_error(&self, error: &ServiceError) -> Result<bool> {
        if *error != ServiceError::Unauthorized || !self.session().await.is_authenticated {
            return Ok(false);
        }
        tracing::warn!("Credential rejected by backend; signing out");
        self.end_session().await?;
        Ok(true)
    }

    /// Guard for a screen requiring `access`, following the session.
    #[must_use]
    pub fn guard(&self, access: Access) -> GuardWatch {
        GuardWatch::new(access, self.session.subscribe_state())
    }

    /// Fresh comments store for one book screen.
    #[must_use]
    pub fn comments(&self) -> CommentsStore<C> {
        Store::new(
            CommentsState::default(),
            CommentsReducer::new(),
            CommentsEnvironment::new(
                self.comment_service.clone(),
                Arc::clone(&self.context.notifier),
            ),
        )
    }

    /// Current session.
    pub async fn session(&self) -> Session {
        self.session.state(Clone::clone).await
    }

    /// Current favorites.
    pub async fn favorites(&self) -> FavoritesState {
        self.favorites.state(Clone::clone).await
    }

    /// Whether `item` is favorited.
    pub async fn is_favorite(&self, item: &ItemId) -> bool {
        self.favorites.state(|s| s.contains(item)).await
    }

    /// Session snapshots, updated after every session change.
    ///
    /// Sign-in and sign-out go through [`login`](Self::login) and
    /// [`logout`](Self::logout) so favorites follow the session.
    #[must_use]
    pub fn watch_session(&self) -> watch::Receiver<Session> {
        self.session.subscribe_state()
    }

    /// Favorites snapshots, updated after every favorites change.
    #[must_use]
    pub fn watch_favorites(&self) -> watch::Receiver<FavoritesState> {
        self.favorites.subscribe_state()
    }

    /// Stop both stores, waiting up to `timeout` each for running effects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`](libris_runtime::StoreError)
    /// if effects are still running.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        self.favorites.shutdown(timeout).await?;
        self.session.shutdown(timeout).await?;
        Ok(())
    }

    async fn end_session(&self) -> Result<()> {
        self.session.send(SessionAction::Logout).await?.wait().await;
        self.observe_favorites(self.session_changed().await).await?;
        Ok(())
    }

    async fn sync_favorites(&self) -> Result<()> {
        let action = self.session_changed().await;
        self.settle_favorites(action).await
    }

    async fn session_changed(&self) -> FavoritesAction {
        let (is_authenticated, user_id) = self
            .session
            .state(|s| (s.is_authenticated, s.user_id.clone()))
            .await;
        FavoritesAction::SessionChanged { is_authenticated, user_id }
    }

    /// Send `action` to the favorites store, wait for its effects and sign
    /// out if any of them reported a rejected credential.
    async fn settle_favorites(&self, action: FavoritesAction) -> Result<()> {
        if let Some(error) = self.observe_favorites(action).await? {
            self.handle_service_error(&error).await?;
        }
        Ok(())
    }

    /// Send `action`, wait for its effects and return the first
    /// [`ServiceError::Unauthorized`] they produced.
    async fn observe_favorites(&self, action: FavoritesAction) -> Result<Option<ServiceError>> {
        let mut results = self.favorites.subscribe_actions();
        self.favorites.send(action).await?.wait().await;

        loop {
            match results.try_recv() {
                Ok(
                    FavoritesAction::LoadFailed { error, .. }
                    | FavoritesAction::ToggleFailed { error, .. },
                ) if error == ServiceError::Unauthorized => return Ok(Some(error)),
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {},
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return Ok(None),
            }
        }
    }
}
