//! Session state and actions.

use std::collections::BTreeSet;
use std::fmt;

use crate::token::Claims;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The stored credential has not been examined yet.
    Loading,
    /// No valid credential.
    Unauthenticated,
    /// A valid, unexpired credential is in effect.
    Authenticated,
}

/// Authentication state of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Whether a valid credential is in effect
    pub is_authenticated: bool,
    /// Subject of the credential
    pub user_id: Option<String>,
    /// Display name from the credential
    pub user_name: Option<String>,
    /// Roles from the credential
    pub roles: BTreeSet<String>,
    /// Whether initialization is still pending
    pub is_loading: bool,
}

impl Session {
    /// Process-start state.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            is_authenticated: false,
            user_id: None,
            user_name: None,
            roles: BTreeSet::new(),
            is_loading: true,
        }
    }

    /// Signed-out state.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            user_id: None,
            user_name: None,
            roles: BTreeSet::new(),
            is_loading: false,
        }
    }

    /// Signed-in state populated from `claims`.
    #[must_use]
    pub fn authenticated(claims: &Claims) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(claims.subject.clone()),
            user_name: claims.name.clone(),
            roles: claims.roles.clone(),
            is_loading: false,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Loading
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        }
    }

    /// Whether the session holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}

/// Inputs of the session reducer.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Resolve the session from the stored credential. Effective once.
    Initialize,
    /// A new credential was issued.
    Login {
        /// Raw bearer token
        token: String,
    },
    /// Sign out.
    Logout,
}

// Tokens never reach the logs
impl fmt::Debug for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialize => f.write_str("Initialize"),
            Self::Login { .. } => f.debug_struct("Login").field("token", &"<redacted>").finish(),
            Self::Logout => f.write_str("Logout"),
        }
    }
}
