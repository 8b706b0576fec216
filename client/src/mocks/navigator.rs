use std::sync::{Arc, Mutex, PoisonError};

use crate::providers::Navigator;
use crate::routes::Route;

/// Navigator that records every destination.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    /// Navigator with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every destination, oldest first.
    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Most recent destination.
    #[must_use]
    pub fn last(&self) -> Option<Route> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner).push(route);
    }
}
