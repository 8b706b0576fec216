use std::sync::{Arc, Mutex, PoisonError};

use crate::providers::{Notice, Notifier};

/// Notifier that records every notice.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    /// Notifier with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).push(notice);
    }
}
