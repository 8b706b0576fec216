//! In-memory providers for tests and demos.
//!
//! Every mock is cheaply cloneable; clones share state, so a test keeps one
//! handle for assertions and gives another to the environment.

mod auth;
mod comments;
mod credentials;
mod favorites;
mod navigator;
mod notifier;

use std::collections::BTreeSet;

pub use auth::MockAuthService;
pub use comments::MockCommentService;
pub use credentials::MockCredentialStore;
pub use favorites::MockFavoritesService;
pub use navigator::RecordingNavigator;
pub use notifier::RecordingNotifier;

use crate::token::{self, Claims};

/// Unsigned token for `subject` with `roles`, expiring at `expires_at`
/// (epoch seconds).
#[must_use]
pub fn token_for(subject: &str, roles: &[&str], expires_at: i64) -> String {
    token::encode_unsigned(&claims_for(subject, roles, expires_at))
}

/// Claims for `subject` with `roles`, expiring at `expires_at`.
#[must_use]
pub fn claims_for(subject: &str, roles: &[&str], expires_at: i64) -> Claims {
    Claims {
        subject: subject.to_owned(),
        name: None,
        roles: roles.iter().map(|r| (*r).to_owned()).collect::<BTreeSet<_>>(),
        expires_at,
    }
}
