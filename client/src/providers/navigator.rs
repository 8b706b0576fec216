//! Navigation side effect.

use std::sync::{Mutex, PoisonError};

use crate::routes::Route;

/// Moves the user to another screen.
pub trait Navigator: Send + Sync {
    /// Navigate to `route`.
    fn navigate(&self, route: Route);
}

/// Navigator for headless use: logs each move and remembers the last one.
#[derive(Debug, Default)]
pub struct TracingNavigator {
    current: Mutex<Option<Route>>,
}

impl TracingNavigator {
    /// Navigator with no route visited yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent destination.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for TracingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(route = %route, "Navigating");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(route);
    }
}
