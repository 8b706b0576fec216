//! Route guards.
//!
//! A guard decides whether a screen may render for the current session.
//! While the session is still loading no decision is made, which keeps a
//! protected screen from flashing a redirect before the stored credential
//! has been examined.

use std::collections::BTreeSet;

use tokio::sync::watch;

use crate::routes::Route;
use crate::session::Session;

/// Role name of administrators.
pub const ROLE_ADMIN: &str = "ADMIN";
/// Role name of librarians.
pub const ROLE_LIBRARIAN: &str = "BIBLIOTECARIO";

/// What a screen requires of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Anyone.
    Public,
    /// Any authenticated user.
    Authenticated,
    /// An authenticated user holding at least one of these roles.
    AnyRole(BTreeSet<String>),
}

impl Access {
    /// Administrators only.
    #[must_use]
    pub fn admin() -> Self {
        Self::any_role([ROLE_ADMIN])
    }

    /// Librarians and administrators.
    #[must_use]
    pub fn librarian() -> Self {
        Self::any_role([ROLE_LIBRARIAN, ROLE_ADMIN])
    }

    /// Users holding any of `roles`.
    #[must_use]
    pub fn any_role<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self::AnyRole(roles.into_iter().map(Into::into).collect())
    }
}

/// Decision of a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The session is still loading; show a loading indicator.
    Pending,
    /// Render the screen.
    Allow,
    /// Go elsewhere.
    Redirect(Route),
}

/// Decide whether `session` satisfies `access`.
#[must_use]
pub fn evaluate(access: &Access, session: &Session) -> GuardOutcome {
    if session.is_loading {
        return GuardOutcome::Pending;
    }

    match access {
        Access::Public => GuardOutcome::Allow,
        _ if !session.is_authenticated => GuardOutcome::Redirect(Route::Login),
        Access::Authenticated => GuardOutcome::Allow,
        Access::AnyRole(roles) => {
            if roles.iter().any(|role| session.has_role(role)) {
                GuardOutcome::Allow
            } else {
                GuardOutcome::Redirect(Route::Forbidden)
            }
        },
    }
}

/// A guard that follows the session as it changes.
#[derive(Debug)]
pub struct GuardWatch {
    access: Access,
    session: watch::Receiver<Session>,
    last: GuardOutcome,
}

impl GuardWatch {
    /// Follow `session` snapshots, usually from
    /// [`Store::subscribe_state`](libris_runtime::Store::subscribe_state).
    #[must_use]
    pub fn new(access: Access, mut session: watch::Receiver<Session>) -> Self {
        let last = evaluate(&access, &session.borrow_and_update());
        Self { access, session, last }
    }

    /// Required access.
    #[must_use]
    pub const fn access(&self) -> &Access {
        &self.access
    }

    /// Outcome for the latest session snapshot.
    #[must_use]
    pub fn current(&self) -> GuardOutcome {
        evaluate(&self.access, &self.session.borrow())
    }

    /// Wait until the outcome differs from the last one observed and
    /// return it.
    ///
    /// Returns `None` once the session store is gone.
    pub async fn next_change(&mut self) -> Option<GuardOutcome> {
        loop {
            self.session.changed().await.ok()?;
            let outcome = evaluate(&self.access, &self.session.borrow_and_update());
            if outcome != self.last {
                self.last = outcome.clone();
                return Some(outcome);
            }
        }
    }

    /// Wait for the first decision that is not [`GuardOutcome::Pending`].
    ///
    /// Returns `None` once the session store is gone.
    pub async fn resolved(&mut self) -> Option<GuardOutcome> {
        loop {
            let outcome = evaluate(&self.access, &self.session.borrow_and_update());
            self.last = outcome.clone();
            if outcome != GuardOutcome::Pending {
                return Some(outcome);
            }
            self.session.changed().await.ok()?;
        }
    }
}
