//! Dependencies injected into the reducers.
//!
//! Providers are interfaces: reducers depend on these traits and the
//! [`App`](crate::app::App) wires in concrete implementations (HTTP
//! services, the file-backed credential slot) or the in-memory mocks.
//!
//! Synchronous providers are held as `Arc<dyn Trait>`; async services are
//! generic parameters of the environments that use them.

pub mod auth;
pub mod comments;
pub mod credentials;
pub mod favorites;
pub mod navigator;
pub mod notifier;

pub use auth::AuthService;
pub use comments::CommentService;
pub use credentials::{CREDENTIAL_KEY, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use favorites::FavoritesService;
pub use navigator::{Navigator, TracingNavigator};
pub use notifier::{Notice, NoticeLevel, Notifier, TracingNotifier};
