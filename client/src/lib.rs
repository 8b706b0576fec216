//! # Libris Client
//!
//! Client-side state for the Libris library catalog, built on the
//! `libris-core` reducer architecture:
//!
//! - **Session**: authentication derived from the stored bearer token, with
//!   a loading phase that lasts until the token has been examined
//! - **Guards**: route decisions (allow, redirect, pending) by role
//! - **Favorites**: optimistic add/remove reconciled with the backend,
//!   scoped to the signed-in user
//! - **Comments**: ranked, threaded book comments
//!
//! Every side effect goes through a provider trait in [`providers`]; the
//! [`http`] module implements the REST services and [`mocks`] the in-memory
//! ones used in tests.
//!
//! ## Example
//!
//! ```ignore
//! let app = App::new(context, auth, favorites, comments);
//! app.start().await?;
//! app.login(&LoginCredentials::new("ana@example.org", "secret")).await?;
//! app.toggle_favorite(ItemId::new("42"), true).await?;
//! ```

pub mod app;
pub mod comments;
pub mod config;
pub mod error;
pub mod favorites;
pub mod guard;
pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod providers;
pub mod routes;
pub mod session;
pub mod token;
pub mod validation;

pub use app::{App, AppContext, CommentsStore, FavoritesStore, SessionStore};
pub use config::ClientConfig;
pub use error::{ClientError, Result, ServiceError};
pub use favorites::ItemId;
pub use guard::{Access, GuardOutcome, GuardWatch};
pub use routes::Route;
pub use session::Session;
pub use validation::{LoginCredentials, Registration};
