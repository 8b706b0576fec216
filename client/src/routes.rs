//! Screens the client can navigate to.

use std::fmt;

/// A navigation destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Landing screen after login.
    Home,
    /// Login screen.
    Login,
    /// Shown when the user lacks a required role.
    Forbidden,
    /// Shown when the backend answers 500-504.
    ServerError,
}

impl Route {
    /// Path of the screen.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Home => "/home",
            Self::Login => "/login",
            Self::Forbidden => "/forbidden",
            Self::ServerError => "/server-error",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
